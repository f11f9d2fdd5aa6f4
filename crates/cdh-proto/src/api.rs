//! Messages and service names of the CDH `api` package.
//!
//! The message types are generated from `proto/api.proto` at build time.

include!(concat!(env!("OUT_DIR"), "/api.rs"));

/// `api.SealedSecretService`
pub mod sealed_secret_service {
    pub const NAME: &str = "api.SealedSecretService";
    pub const UNSEAL_SECRET: &str = "UnsealSecret";
}

/// `api.GetResourceService`
pub mod get_resource_service {
    pub const NAME: &str = "api.GetResourceService";
    pub const GET_RESOURCE: &str = "GetResource";
}

/// `api.SecureMountService`
pub mod secure_mount_service {
    pub const NAME: &str = "api.SecureMountService";
    pub const SECURE_MOUNT: &str = "SecureMount";
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use std::collections::HashMap;

    #[test]
    fn test_unseal_input_wire_layout() {
        let input = UnsealSecretInput {
            secret: b"sealed.abc".to_vec(),
        };

        // field 1, wire type 2 (length-delimited), length 10
        let encoded = input.encode_to_vec();
        assert_eq!(&encoded[..2], &[0x0a, 10]);
        assert_eq!(&encoded[2..], b"sealed.abc");
    }

    #[test]
    fn test_secure_mount_request_field_tags() {
        // A real CDH decodes by field number: volume_type=1, flags=3, mount_point=4
        let request = SecureMountRequest {
            volume_type: "B".to_string(),
            flags: vec!["ro".to_string()],
            mount_point: "/m".to_string(),
            ..Default::default()
        };

        assert_eq!(
            request.encode_to_vec(),
            vec![0x0a, 1, b'B', 0x1a, 2, b'r', b'o', 0x22, 2, b'/', b'm']
        );
    }

    #[test]
    fn test_get_resource_request_field_tag() {
        let request = GetResourceRequest {
            resource_path: "k".to_string(),
        };
        assert_eq!(request.encode_to_vec(), vec![0x0a, 1, b'k']);

        let response = SecureMountResponse {
            mount_path: "/p".to_string(),
        };
        assert_eq!(response.encode_to_vec(), vec![0x0a, 2, b'/', b'p']);
    }

    #[test]
    fn test_secure_mount_request_keeps_all_fields() {
        let mut options = HashMap::new();
        options.insert("deviceId".to_string(), "/dev/vdb".to_string());
        options.insert("encryptType".to_string(), "LUKS".to_string());

        let request = SecureMountRequest {
            volume_type: "BlockDevice".to_string(),
            options,
            flags: vec!["ro".to_string(), "noexec".to_string()],
            mount_point: "/mnt/secure".to_string(),
        };

        let decoded = SecureMountRequest::decode(request.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.options.len(), 2);
        assert_eq!(decoded.flags, vec!["ro", "noexec"]);
    }

    #[test]
    fn test_empty_messages_encode_to_nothing() {
        assert!(SecureMountResponse::default().encode_to_vec().is_empty());
        assert!(UnsealSecretOutput::default().encode_to_vec().is_empty());
    }

    #[test]
    fn test_service_names_are_fully_qualified() {
        assert_eq!(sealed_secret_service::NAME, "api.SealedSecretService");
        assert_eq!(secure_mount_service::NAME, "api.SecureMountService");
        assert_eq!(get_resource_service::NAME, "api.GetResourceService");
    }
}
