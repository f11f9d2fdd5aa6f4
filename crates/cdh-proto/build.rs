fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto");

    let mut config = prost_build::Config::new();

    // Prefer a system protoc when one is configured
    if std::env::var_os("PROTOC").is_none() {
        config.protoc_executable(protoc_bin_vendored::protoc_bin_path()?);
    }

    config.compile_protos(&["proto/api.proto", "proto/ttrpc.proto"], &["proto"])?;
    Ok(())
}
