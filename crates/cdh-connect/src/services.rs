//! Typed stubs for the CDH `api` services.
//!
//! Each stub borrows the connection for as long as it lives, translating a
//! method call into one ttrpc round trip on the matching service/method pair.

use cdh_proto::{
    get_resource_service, sealed_secret_service, secure_mount_service, GetResourceRequest,
    GetResourceResponse, SecureMountRequest, SecureMountResponse, UnsealSecretInput,
    UnsealSecretOutput,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;

use crate::error::RpcError;
use crate::transport::{CallContext, TtrpcConnection};

/// Stub for `api.SealedSecretService`
pub struct SealedSecretServiceClient<'a, S = UnixStream> {
    conn: &'a mut TtrpcConnection<S>,
}

impl<'a, S> SealedSecretServiceClient<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(conn: &'a mut TtrpcConnection<S>) -> Self {
        Self { conn }
    }

    pub async fn unseal_secret(
        &mut self,
        ctx: &CallContext,
        request: &UnsealSecretInput,
    ) -> Result<UnsealSecretOutput, RpcError> {
        self.conn
            .unary(
                sealed_secret_service::NAME,
                sealed_secret_service::UNSEAL_SECRET,
                request,
                ctx,
            )
            .await
    }
}

/// Stub for `api.SecureMountService`
pub struct SecureMountServiceClient<'a, S = UnixStream> {
    conn: &'a mut TtrpcConnection<S>,
}

impl<'a, S> SecureMountServiceClient<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(conn: &'a mut TtrpcConnection<S>) -> Self {
        Self { conn }
    }

    pub async fn secure_mount(
        &mut self,
        ctx: &CallContext,
        request: &SecureMountRequest,
    ) -> Result<SecureMountResponse, RpcError> {
        self.conn
            .unary(
                secure_mount_service::NAME,
                secure_mount_service::SECURE_MOUNT,
                request,
                ctx,
            )
            .await
    }
}

/// Stub for `api.GetResourceService`
pub struct GetResourceServiceClient<'a, S = UnixStream> {
    conn: &'a mut TtrpcConnection<S>,
}

impl<'a, S> GetResourceServiceClient<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(conn: &'a mut TtrpcConnection<S>) -> Self {
        Self { conn }
    }

    pub async fn get_resource(
        &mut self,
        ctx: &CallContext,
        request: &GetResourceRequest,
    ) -> Result<GetResourceResponse, RpcError> {
        self.conn
            .unary(
                get_resource_service::NAME,
                get_resource_service::GET_RESOURCE,
                request,
                ctx,
            )
            .await
    }
}
