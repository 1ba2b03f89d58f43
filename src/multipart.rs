//! `multipart/related` body construction for file upload.
//!
//! OneDrive's simple upload takes a two-part body: a JSON metadata part
//! (`Content-ID: <metadata>`) and the raw file content (`Content-ID:
//! <content>`), joined by a boundary token. The token is generated per body
//! so concurrent or repeated uploads never share state.

use serde_json::Value;
use uuid::Uuid;

const CRLF: &str = "\r\n";

/// An ephemeral two-part `multipart/related` body.
pub struct RelatedMultipart {
    boundary: String,
    metadata: Value,
    content_type: String,
    content: Vec<u8>,
}

impl RelatedMultipart {
    /// Build a body from a metadata JSON value and raw content with its
    /// MIME type. A fresh random boundary is generated here, not stored
    /// anywhere else.
    pub fn new(metadata: Value, content_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            boundary: Uuid::new_v4().simple().to_string(),
            metadata,
            content_type: content_type.into(),
            content,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type_header(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    /// Serialize to the wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.content.len() + 512);

        out.extend_from_slice(format!("--{}{}", self.boundary, CRLF).as_bytes());
        out.extend_from_slice(format!("Content-ID: <metadata>{}", CRLF).as_bytes());
        out.extend_from_slice(format!("Content-Type: application/json{}{}", CRLF, CRLF).as_bytes());
        out.extend_from_slice(self.metadata.to_string().as_bytes());
        out.extend_from_slice(CRLF.as_bytes());

        out.extend_from_slice(format!("--{}{}", self.boundary, CRLF).as_bytes());
        out.extend_from_slice(format!("Content-ID: <content>{}", CRLF).as_bytes());
        out.extend_from_slice(format!("Content-Type: {}{}{}", self.content_type, CRLF, CRLF).as_bytes());
        out.extend_from_slice(&self.content);
        out.extend_from_slice(CRLF.as_bytes());

        out.extend_from_slice(format!("--{}--{}", self.boundary, CRLF).as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boundary_is_unique_per_body() {
        let a = RelatedMultipart::new(json!({}), "text/plain", vec![]);
        let b = RelatedMultipart::new(json!({}), "text/plain", vec![]);
        assert_ne!(a.boundary(), b.boundary());
    }

    #[test]
    fn test_content_type_header_carries_boundary() {
        let body = RelatedMultipart::new(json!({}), "text/plain", vec![]);
        assert_eq!(
            body.content_type_header(),
            format!("multipart/related; boundary={}", body.boundary())
        );
    }

    #[test]
    fn test_wire_format_structure() {
        let body = RelatedMultipart::new(
            json!({"name": "hello.txt", "file": {}}),
            "text/plain",
            b"hello world".to_vec(),
        );
        let wire = String::from_utf8(body.to_bytes()).unwrap();
        let delimiter = format!("--{}\r\n", body.boundary());
        let terminator = format!("--{}--\r\n", body.boundary());

        assert_eq!(wire.matches(&delimiter).count(), 2);
        assert!(wire.ends_with(&terminator));
        assert!(wire.contains("Content-ID: <metadata>\r\nContent-Type: application/json\r\n\r\n"));
        assert!(wire.contains("Content-ID: <content>\r\nContent-Type: text/plain\r\n\r\nhello world\r\n"));
        assert!(wire.contains(r#""name":"hello.txt""#));
    }
}
