/*!
 * cdh-client - talk to the Confidential Data Hub over its ttrpc socket
 */

use anyhow::{Context, Result};
use cdh_connect::{CallContext, CdhClient};
use cdh_ttrpc::{
    commands::{self, MountArgs},
    config::ClientConfig,
    error::{exit_code_for, render_chain, CliError, EXIT_SUCCESS},
    logging,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "cdh-client")]
#[command(version, about = "Client for the Confidential Data Hub ttrpc API", long_about = None)]
struct Cli {
    /// CDH socket path (overrides the config file)
    #[arg(short, long, env = "CDH_SOCKET", global = true, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "CDH_CLIENT_CONFIG", global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Per-call deadline in seconds
    #[arg(short, long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Unseal a sealed secret and print the plaintext
    Unseal {
        /// Sealed secret, normally starting with `sealed.`
        secret: String,
    },

    /// Mount a secure volume and print the resulting mount path
    Mount {
        /// Storage driver on the CDH side
        #[arg(long, value_name = "TYPE")]
        volume_type: String,

        /// Driver option as KEY=VALUE (repeatable)
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
        options: Vec<(String, String)>,

        /// Mount flag (repeatable)
        #[arg(short = 'f', long = "flag", value_name = "FLAG")]
        flags: Vec<String>,

        /// Target directory
        #[arg(short = 'm', long, value_name = "PATH")]
        mountpoint: String,
    },

    /// Fetch a confidential resource, e.g. kbs:///default/key/1
    GetResource {
        resource_path: String,

        /// Write the resource to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn parse_option(s: &str) -> std::result::Result<(String, String), CliError> {
    commands::parse_option(s)
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(ref socket) = cli.socket {
        config.socket_path = socket.clone();
    }
    if cli.timeout.is_some() {
        config.timeout_secs = cli.timeout;
    }
    config.verbose |= cli.debug;
    config.log_json |= cli.log_json;

    Ok(config)
}

/// Check arguments that can be rejected without talking to the CDH
fn validate(command: &Command) -> Result<()> {
    if let Command::Mount { mountpoint, .. } = command {
        commands::validate_mountpoint(mountpoint)?;
    }
    Ok(())
}

async fn run(cli: Cli, config: ClientConfig) -> Result<()> {
    validate(&cli.command)?;

    let ctx = config.call_context();
    let mut client = CdhClient::connect(&config.socket_path).await?;

    let result = dispatch(&mut client, &ctx, cli.command).await;

    if let Err(e) = client.close().await {
        debug!("Error while closing CDH connection: {}", e);
    }

    result
}

async fn dispatch(client: &mut CdhClient, ctx: &CallContext, command: Command) -> Result<()> {
    match command {
        Command::Unseal { secret } => {
            let plaintext = commands::unseal(client, ctx, &secret).await?;
            println!("{}", plaintext);
        }
        Command::Mount {
            volume_type,
            options,
            flags,
            mountpoint,
        } => {
            let args = MountArgs {
                volume_type,
                options,
                flags,
                mountpoint,
            };
            let mount_path = commands::mount(client, ctx, args).await?;
            println!("{}", mount_path);
        }
        Command::GetResource {
            resource_path,
            output,
        } => {
            let resource = commands::get_resource(client, ctx, &resource_path).await?;
            let target = commands::output_target(output);
            let mut stdout = tokio::io::stdout();
            commands::write_output(&resource, target.as_deref(), &mut stdout)
                .await
                .with_context(|| match target {
                    Some(ref path) => format!("Failed to write resource to {}", path.display()),
                    None => "Failed to write resource to stdout".to_string(),
                })?;
        }
    }
    Ok(())
}

async fn execute(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;

    if let Err(e) = logging::init_logging(&config).context("Continuing without logging") {
        eprintln!("Warning: {}", render_chain(&e));
    }

    run(cli, config).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match execute(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", render_chain(&e));
            exit_code_for(&e)
        }
    };

    std::process::exit(code);
}
