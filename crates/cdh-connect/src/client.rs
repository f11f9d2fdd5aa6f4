//! CdhClient: the Confidential Data Hub client over a Unix socket

use cdh_proto::{GetResourceRequest, SecureMountRequest, UnsealSecretInput};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConnectError;
use crate::services::{
    GetResourceServiceClient, SealedSecretServiceClient, SecureMountServiceClient,
};
use crate::transport::{CallContext, TtrpcConnection};
use crate::CDH_TTRPC_SOCKET;

const OP_UNSEAL_SECRET: &str = "unseal secret";
const OP_SECURE_MOUNT: &str = "secure mount";
const OP_GET_RESOURCE: &str = "get resource";

/// Client for the CDH ttrpc API.
///
/// A value of this type always holds an open connection; it is only produced
/// by a successful dial and [`close`](CdhClient::close) consumes it.
///
/// # Example
///
/// ```rust,no_run
/// use cdh_connect::{CallContext, CdhClient};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), cdh_connect::ConnectError> {
/// let mut client = CdhClient::connect_default().await?;
///
/// let ctx = CallContext::new().with_timeout(Duration::from_secs(10));
/// let plaintext = client.unseal_secret(&ctx, "sealed.eyJ...").await?;
/// println!("{plaintext}");
///
/// client.close().await.ok();
/// # Ok(())
/// # }
/// ```
pub struct CdhClient {
    conn: TtrpcConnection,
    socket_path: PathBuf,
}

impl CdhClient {
    /// Dial the CDH socket at `path`.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, ConnectError> {
        let path = path.as_ref();

        let conn = TtrpcConnection::connect(path)
            .await
            .map_err(|source| ConnectError::Connect {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Connected to CDH at {}", path.display());

        Ok(Self {
            conn,
            socket_path: path.to_path_buf(),
        })
    }

    /// Dial the well-known CDH socket
    pub async fn connect_default() -> Result<Self, ConnectError> {
        Self::connect(CDH_TTRPC_SOCKET).await
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Unseal a sealed secret and return its plaintext as a string.
    ///
    /// Fails with a call error if the plaintext is not valid UTF-8; use
    /// [`unseal_secret_bytes`](CdhClient::unseal_secret_bytes) for binary secrets.
    pub async fn unseal_secret(
        &mut self,
        ctx: &CallContext,
        secret: &str,
    ) -> Result<String, ConnectError> {
        let plaintext = self.unseal_secret_bytes(ctx, secret).await?;
        String::from_utf8(plaintext).map_err(|e| ConnectError::call(OP_UNSEAL_SECRET, e.into()))
    }

    /// Unseal a sealed secret and return the raw plaintext bytes.
    pub async fn unseal_secret_bytes(
        &mut self,
        ctx: &CallContext,
        secret: &str,
    ) -> Result<Vec<u8>, ConnectError> {
        let input = UnsealSecretInput {
            secret: secret.as_bytes().to_vec(),
        };

        let output = SealedSecretServiceClient::new(&mut self.conn)
            .unseal_secret(ctx, &input)
            .await
            .map_err(|e| ConnectError::call(OP_UNSEAL_SECRET, e))?;

        debug!("Unsealed secret ({} bytes)", output.plaintext.len());

        Ok(output.plaintext)
    }

    /// Ask the CDH to mount a secure volume, returning the resulting mount path.
    pub async fn secure_mount(
        &mut self,
        ctx: &CallContext,
        volume_type: &str,
        options: HashMap<String, String>,
        flags: Vec<String>,
        mountpoint: &str,
    ) -> Result<String, ConnectError> {
        let request = SecureMountRequest {
            volume_type: volume_type.to_string(),
            options,
            flags,
            mount_point: mountpoint.to_string(),
        };

        let response = SecureMountServiceClient::new(&mut self.conn)
            .secure_mount(ctx, &request)
            .await
            .map_err(|e| ConnectError::call(OP_SECURE_MOUNT, e))?;

        debug!(
            "Mounted {} volume at {}",
            volume_type, response.mount_path
        );

        Ok(response.mount_path)
    }

    /// Fetch a confidential resource, e.g. `kbs:///default/key/1`.
    pub async fn get_resource(
        &mut self,
        ctx: &CallContext,
        resource_path: &str,
    ) -> Result<Vec<u8>, ConnectError> {
        let request = GetResourceRequest {
            resource_path: resource_path.to_string(),
        };

        let response = GetResourceServiceClient::new(&mut self.conn)
            .get_resource(ctx, &request)
            .await
            .map_err(|e| ConnectError::call(OP_GET_RESOURCE, e))?;

        Ok(response.resource)
    }

    /// Close the connection to the CDH.
    pub async fn close(self) -> io::Result<()> {
        debug!("Closing CDH connection to {}", self.socket_path.display());
        self.conn.shutdown().await
    }
}
