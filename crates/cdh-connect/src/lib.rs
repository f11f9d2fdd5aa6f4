//! CDH Connect: client-side ttrpc connectivity to the Confidential Data Hub
//!
//! The Confidential Data Hub (CDH) listens on a local Unix socket and speaks
//! ttrpc. This crate dials that socket and exposes the CDH services as plain
//! async methods.
//!
//! # Architecture
//!
//! - **codec**: ttrpc frame encoding on top of `tokio_util::codec`
//! - **transport**: `TtrpcConnection`, one unary call in flight at a time
//! - **services**: typed stubs per CDH service
//! - **CdhClient**: the facade most callers want
//!
//! # Example
//!
//! ```rust,no_run
//! use cdh_connect::{CallContext, CdhClient};
//! use std::collections::HashMap;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let mut client = CdhClient::connect("/run/confidential-containers/cdh.sock").await?;
//!
//!     let mount_path = client
//!         .secure_mount(
//!             &CallContext::new(),
//!             "BlockDevice",
//!             HashMap::from([("deviceId".to_string(), "/dev/vdb".to_string())]),
//!             vec![],
//!             "/mnt/secure",
//!         )
//!         .await?;
//!     println!("mounted at {mount_path}");
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod services;
pub mod transport;

pub use client::CdhClient;
pub use error::{ConnectError, RpcError};
pub use transport::{CallContext, TtrpcConnection};

/// Well-known path of the CDH ttrpc socket inside the guest
pub const CDH_TTRPC_SOCKET: &str = "/run/confidential-containers/cdh.sock";

/// Prefix tagging sealed-secret identifiers
pub const SEALED_SECRET_PREFIX: &str = "sealed.";

/// Whether `value` looks like a sealed secret that the CDH can unseal
pub fn is_sealed_secret(value: &str) -> bool {
    value.starts_with(SEALED_SECRET_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_secret_prefix() {
        assert!(is_sealed_secret("sealed.eyJhbGciOi.payload.sig"));
        assert!(!is_sealed_secret("plain-value"));
        assert!(!is_sealed_secret("Sealed.abc"));
        assert!(!is_sealed_secret(""));
    }
}
