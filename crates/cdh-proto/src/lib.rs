//! Protocol definitions for the Confidential Data Hub (CDH) ttrpc API.
//!
//! Message types are generated by `prost-build` from `proto/api.proto` (the
//! CDH service surface) and `proto/ttrpc.proto` (the request/response envelope
//! every ttrpc call is wrapped in).

pub mod api;
pub mod ttrpc;

// Re-export commonly used types for convenience
pub use api::*;
pub use ttrpc::{Code, KeyValue, Request, Response, Status};
