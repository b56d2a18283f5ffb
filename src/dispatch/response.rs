//! Normalized service responses.

use reqwest::header::CONTENT_LENGTH;

use super::body::{content_length, BufferedBody};
use crate::results::{ResponseHeaders, SuccessDetails};

/// A response whose body has been read exactly once.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    /// HTTP status code
    pub status: u16,
    /// Canonical reason phrase (empty for non-standard codes)
    pub status_text: String,
    /// Response headers
    pub headers: ResponseHeaders,
    /// Buffered body
    pub body: BufferedBody,
}

impl ServiceResponse {
    /// Reads `response` to the end.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the body cannot be read (including a
    /// timeout while streaming it).
    pub async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = ResponseHeaders::from_header_map(response.headers());
        let bytes = response.bytes().await?;
        Ok(ServiceResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: BufferedBody::new(bytes),
        })
    }

    /// `Content-Length` header if parseable, else the buffered length.
    pub fn content_length(&self) -> u64 {
        content_length(self.headers.get(CONTENT_LENGTH.as_str()), &self.body)
    }

    /// Converts into the fields of a succeeded attempt.
    pub fn into_success(self, duration_ms: u64) -> SuccessDetails {
        SuccessDetails {
            duration_ms,
            status: self.status,
            status_text: self.status_text.clone(),
            content_length: self.content_length(),
            body: self.body.text(),
            parsed_body: self.body.json(),
            headers: self.headers,
        }
    }
}
