//! `multipart/related` upload bodies.
//!
//! Drive and BigQuery accept a JSON metadata part followed by a media part
//! in one request (`uploadType=multipart`).

use serde::Serialize;
use sheetbridge_core::BridgeResult;

/// A two-part `multipart/related` body: JSON metadata, then media.
#[derive(Debug, Clone)]
pub struct RelatedBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl RelatedBody {
    /// Assemble the body from metadata and media bytes.
    pub fn new<M: Serialize>(metadata: &M, media_type: &str, media: &[u8]) -> BridgeResult<Self> {
        let boundary = format!("sheetbridge-{}", uuid::Uuid::new_v4().simple());
        let metadata = serde_json::to_vec(metadata)?;

        let mut bytes = Vec::with_capacity(metadata.len() + media.len() + 256);
        bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        bytes.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        bytes.extend_from_slice(&metadata);
        bytes.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
        bytes.extend_from_slice(format!("Content-Type: {media_type}\r\n\r\n").as_bytes());
        bytes.extend_from_slice(media);
        bytes.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Ok(Self { boundary, bytes })
    }

    /// Value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    /// The encoded body.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
