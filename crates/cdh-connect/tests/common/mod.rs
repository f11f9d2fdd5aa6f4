//! In-process ttrpc server standing in for the CDH daemon.

use cdh_connect::codec::{Frame, TtrpcCodec};
use cdh_proto::{Request, Response};
use futures::{SinkExt, StreamExt};
use prost::Message;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::UnixListener;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

/// What the mock does with an incoming request
pub enum Reply {
    Respond(Response),
    /// Never answer, to exercise client-side deadlines
    Silent,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ServerStats {
    pub accepted: usize,
    pub closed: usize,
}

pub struct MockCdh {
    pub path: PathBuf,
    requests: Arc<Mutex<Vec<(u32, Request)>>>,
    handle: JoinHandle<ServerStats>,
    _dir: TempDir,
}

impl MockCdh {
    /// Bind a socket in a fresh temp dir and serve one connection with `handler`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Reply + Send + 'static,
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cdh.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let handle = tokio::spawn(async move {
            let mut stats = ServerStats::default();

            let (stream, _) = listener.accept().await.unwrap();
            stats.accepted += 1;

            let mut framed = Framed::new(stream, TtrpcCodec);
            while let Some(frame) = framed.next().await {
                let Ok(frame) = frame else { break };

                let request = Request::decode(frame.payload).unwrap();
                recorded
                    .lock()
                    .unwrap()
                    .push((frame.stream_id, request.clone()));

                match handler(&request) {
                    Reply::Respond(response) => {
                        framed
                            .send(Frame::response(frame.stream_id, response.encode_to_vec()))
                            .await
                            .unwrap();
                    }
                    Reply::Silent => {}
                }
            }

            stats.closed += 1;
            stats
        });

        Self {
            path,
            requests,
            handle,
            _dir: dir,
        }
    }

    /// Requests seen so far, with the stream id each arrived on
    pub fn requests(&self) -> Vec<(u32, Request)> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait for the client to hang up and return what the server observed
    pub async fn finish(self) -> ServerStats {
        self.handle.await.unwrap()
    }
}

/// Reply OK with `message` encoded as the payload
pub fn ok<M: Message>(message: M) -> Reply {
    Reply::Respond(Response::ok(message.encode_to_vec()))
}
