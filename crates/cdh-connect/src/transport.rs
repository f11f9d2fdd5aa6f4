//! TtrpcConnection: single-flight unary calls over a framed byte stream

use bytes::Bytes;
use cdh_proto::{Code, KeyValue, Request, Response};
use futures::{SinkExt, StreamExt};
use prost::Message;
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::{Frame, MessageType, TtrpcCodec};
use crate::error::RpcError;

/// Per-call options supplied by the caller.
///
/// The timeout is forwarded to the server as the request deadline and is also
/// enforced locally. Metadata travels as ttrpc key/value pairs.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    timeout: Option<Duration>,
    metadata: Vec<(String, String)>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn timeout_nano(&self) -> i64 {
        self.timeout
            .map(|t| i64::try_from(t.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }

    fn key_values(&self) -> Vec<KeyValue> {
        self.metadata
            .iter()
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

/// A ttrpc client connection.
///
/// Owns the underlying stream exclusively. Calls take `&mut self`, so at most
/// one request is in flight at any time.
pub struct TtrpcConnection<S = UnixStream> {
    framed: Framed<S, TtrpcCodec>,

    /// Client-initiated streams use odd ids
    next_stream_id: u32,
}

impl TtrpcConnection<UnixStream> {
    /// Dial a Unix domain socket
    pub async fn connect(path: impl AsRef<Path>) -> io::Result<Self> {
        let stream = UnixStream::connect(path.as_ref()).await?;
        Ok(Self::new(stream))
    }
}

impl<S> TtrpcConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected stream
    pub fn new(io: S) -> Self {
        Self {
            framed: Framed::new(io, TtrpcCodec),
            next_stream_id: 1,
        }
    }

    /// Issue one unary call and decode its reply.
    pub async fn unary<Req, Resp>(
        &mut self,
        service: &str,
        method: &str,
        request: &Req,
        ctx: &CallContext,
    ) -> Result<Resp, RpcError>
    where
        Req: Message,
        Resp: Message + Default,
    {
        // A zero timeout_nano means "no deadline" on the wire
        if let Some(timeout) = ctx.timeout().filter(|t| t.is_zero()) {
            return Err(RpcError::DeadlineExceeded(timeout));
        }

        let envelope = Request {
            service: service.to_string(),
            method: method.to_string(),
            payload: request.encode_to_vec(),
            timeout_nano: ctx.timeout_nano(),
            metadata: ctx.key_values(),
        };

        let payload = match ctx.timeout() {
            Some(timeout) => tokio::time::timeout(timeout, self.round_trip(envelope))
                .await
                .map_err(|_| RpcError::DeadlineExceeded(timeout))??,
            None => self.round_trip(envelope).await?,
        };

        Ok(Resp::decode(payload)?)
    }

    async fn round_trip(&mut self, envelope: Request) -> Result<Bytes, RpcError> {
        let stream_id = self.allocate_stream_id();

        debug!(
            "ttrpc call {}/{} on stream {}",
            envelope.service, envelope.method, stream_id
        );

        self.framed
            .send(Frame::request(stream_id, envelope.encode_to_vec()))
            .await?;

        loop {
            let frame = match self.framed.next().await {
                Some(frame) => frame?,
                None => return Err(RpcError::ConnectionClosed),
            };

            if frame.stream_id != stream_id {
                warn!(
                    "Discarding {:?} message for stream {} while waiting on stream {}",
                    frame.message_type, frame.stream_id, stream_id
                );
                continue;
            }

            if frame.message_type != MessageType::Response {
                return Err(RpcError::UnexpectedMessageType(frame.message_type));
            }

            let response = Response::decode(frame.payload)?;
            let code = response.code();
            if code != Code::Ok {
                let message = response.status.map(|s| s.message).unwrap_or_default();
                debug!("ttrpc stream {} failed: {} ({})", stream_id, message, code);
                return Err(RpcError::Status { code, message });
            }

            return Ok(Bytes::from(response.payload));
        }
    }

    fn allocate_stream_id(&mut self) -> u32 {
        let id = self.next_stream_id;
        // u32::MAX is odd, so wrapping keeps ids odd
        self.next_stream_id = self.next_stream_id.wrapping_add(2);
        id
    }

    /// Shut down the write half and release the stream.
    pub async fn shutdown(self) -> io::Result<()> {
        let mut io = self.framed.into_inner();
        io.shutdown().await
    }
}
