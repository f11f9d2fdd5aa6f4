//! The ttrpc envelope: every call is a `Request` frame answered by a `Response` frame.
//!
//! Message types are generated from `proto/ttrpc.proto`; status helpers live here.

use std::fmt;

include!(concat!(env!("OUT_DIR"), "/ttrpc.rs"));

impl Response {
    /// Successful response carrying an encoded message
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            status: Some(Status {
                code: Code::Ok as i32,
                ..Default::default()
            }),
            payload,
        }
    }

    /// Failed response with no payload
    pub fn error(code: Code, message: impl Into<String>) -> Self {
        Self {
            status: Some(Status {
                code: code as i32,
                message: message.into(),
                details: Vec::new(),
            }),
            payload: Vec::new(),
        }
    }

    /// The status code, treating a missing status as OK
    pub fn code(&self) -> Code {
        self.status
            .as_ref()
            .map(|s| Code::from(s.code))
            .unwrap_or(Code::Ok)
    }
}

/// Canonical status codes shared by gRPC and ttrpc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Code {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl From<i32> for Code {
    fn from(value: i32) -> Self {
        match value {
            0 => Code::Ok,
            1 => Code::Cancelled,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => Code::Unknown,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Code::Ok => "ok",
            Code::Cancelled => "cancelled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid argument",
            Code::DeadlineExceeded => "deadline exceeded",
            Code::NotFound => "not found",
            Code::AlreadyExists => "already exists",
            Code::PermissionDenied => "permission denied",
            Code::ResourceExhausted => "resource exhausted",
            Code::FailedPrecondition => "failed precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out of range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data loss",
            Code::Unauthenticated => "unauthenticated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_code_from_i32() {
        assert_eq!(Code::from(0), Code::Ok);
        assert_eq!(Code::from(5), Code::NotFound);
        assert_eq!(Code::from(16), Code::Unauthenticated);
        assert_eq!(Code::from(99), Code::Unknown);
        assert_eq!(Code::from(-1), Code::Unknown);
    }

    #[test]
    fn test_missing_status_is_ok() {
        let response = Response {
            status: None,
            payload: vec![1, 2, 3],
        };
        assert_eq!(response.code(), Code::Ok);
    }

    #[test]
    fn test_error_response_has_no_payload() {
        let response = Response::error(Code::PermissionDenied, "policy rejected");
        assert_eq!(response.code(), Code::PermissionDenied);
        assert!(response.payload.is_empty());
        assert_eq!(response.status.unwrap().message, "policy rejected");
    }

    #[test]
    fn test_request_envelope_decodes() {
        let request = Request {
            service: "api.SealedSecretService".to_string(),
            method: "UnsealSecret".to_string(),
            payload: vec![0x0a, 0x01, b'x'],
            timeout_nano: 1_000_000,
            metadata: vec![KeyValue {
                key: "trace-id".to_string(),
                value: "abc".to_string(),
            }],
        };

        let decoded = Request::decode(request.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_request_envelope_field_tags() {
        let request = Request {
            service: "s".to_string(),
            method: "m".to_string(),
            payload: vec![9],
            timeout_nano: 1,
            metadata: Vec::new(),
        };

        assert_eq!(
            request.encode_to_vec(),
            vec![0x0a, 1, b's', 0x12, 1, b'm', 0x1a, 1, 9, 0x20, 1]
        );
    }

    #[test]
    fn test_code_display() {
        assert_eq!(Code::DeadlineExceeded.to_string(), "deadline exceeded");
        assert_eq!(Code::Internal.to_string(), "internal");
    }
}
