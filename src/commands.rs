/*!
 * Subcommand implementations for `cdh-client`
 */

use cdh_connect::{is_sealed_secret, CallContext, CdhClient};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::error::{CliError, Result};

/// Arguments of a secure mount request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountArgs {
    pub volume_type: String,
    pub options: Vec<(String, String)>,
    pub flags: Vec<String>,
    pub mountpoint: String,
}

/// Parse a `KEY=VALUE` mount option
pub fn parse_option(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| CliError::InvalidArgument(format!("expected KEY=VALUE, got `{}`", s)))?;

    if key.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "option key is empty in `{}`",
            s
        )));
    }

    Ok((key.to_string(), value.to_string()))
}

/// Collapse repeated options into a map; the last occurrence of a key wins
pub fn collect_options(options: &[(String, String)]) -> HashMap<String, String> {
    options.iter().cloned().collect()
}

pub async fn unseal(client: &mut CdhClient, ctx: &CallContext, secret: &str) -> Result<String> {
    if !is_sealed_secret(secret) {
        warn!("Secret does not carry the sealed-secret prefix; the CDH will likely reject it");
    }

    Ok(client.unseal_secret(ctx, secret).await?)
}

/// Reject a mount target the CDH could never use
pub fn validate_mountpoint(mountpoint: &str) -> Result<()> {
    if mountpoint.is_empty() {
        return Err(CliError::InvalidArgument(
            "mountpoint must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub async fn mount(client: &mut CdhClient, ctx: &CallContext, args: MountArgs) -> Result<String> {
    validate_mountpoint(&args.mountpoint)?;

    let options = collect_options(&args.options);
    let mount_path = client
        .secure_mount(
            ctx,
            &args.volume_type,
            options,
            args.flags,
            &args.mountpoint,
        )
        .await?;

    info!("Secure volume mounted at {}", mount_path);
    Ok(mount_path)
}

pub async fn get_resource(
    client: &mut CdhClient,
    ctx: &CallContext,
    resource_path: &str,
) -> Result<Vec<u8>> {
    let resource = client.get_resource(ctx, resource_path).await?;
    info!("Fetched {} ({} bytes)", resource_path, resource.len());
    Ok(resource)
}

/// Write `bytes` to `path`, or to `out` when no path is given
pub async fn write_output<W>(bytes: &[u8], path: Option<&Path>, out: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    match path {
        Some(path) => tokio::fs::write(path, bytes).await?,
        None => {
            out.write_all(bytes).await?;
            out.flush().await?;
        }
    }
    Ok(())
}

/// Where `get-resource` output should go, treating `-` as stdout
pub fn output_target(output: Option<PathBuf>) -> Option<PathBuf> {
    output.filter(|p| p.as_os_str() != "-")
}
