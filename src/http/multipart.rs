//! `multipart/form-data` decoding for single-part uploads.
//!
//! The body is expected to look like
//!
//! ```text
//! --{boundary}\r\n
//! {part headers}\r\n
//! \r\n
//! {content}\r\n
//! --{boundary}--\r\n
//! ```
//!
//! Only the outer delimiters are stripped; a body carrying several parts is
//! decoded as one part whose content contains the rest.

use crate::http::error::{HttpError, Result};
use crate::http::grammar::{Headers, parse_header_line, parse_header_value_parameters};
use crate::http::request::find_header;

const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";

/// One decoded body part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub headers: Headers,
    pub content: Vec<u8>,
}

impl Part {
    pub fn header(&self, key: &str) -> Option<&str> {
        find_header(&self.headers, key)
    }
}

/// Decodes the single part of a form-data body, taking the boundary from the
/// request's `Content-Type` header.
pub fn parse_form_data(body: Option<&[u8]>, headers: &Headers) -> Result<Part> {
    let body = body.ok_or_else(|| HttpError::bad_request("Missing request body"))?;

    let content_type = find_header(headers, "Content-Type")
        .ok_or_else(|| HttpError::bad_request("Missing Content-Type header"))?;
    let content_type = parse_header_value_parameters(content_type)?;
    let boundary = content_type
        .param("boundary")
        .ok_or_else(|| HttpError::bad_request("Missing boundary in Content-Type header"))?;

    let prefix = format!("--{boundary}\r\n");
    let suffix = format!("\r\n--{boundary}--\r\n");

    let body = body.strip_prefix(prefix.as_bytes()).unwrap_or(body);
    let body = body.strip_suffix(suffix.as_bytes()).unwrap_or(body);

    let separator = find_subslice(body, HEADER_SEPARATOR)
        .ok_or_else(|| HttpError::bad_request("Invalid body structure"))?;

    let header_block = std::str::from_utf8(&body[..separator])
        .map_err(|_| HttpError::bad_request("Invalid UTF-8 in body part headers"))?;

    let mut part_headers = Headers::new();
    for line in header_block.split("\r\n") {
        let (name, value) = parse_header_line(line)?;
        part_headers.insert(name, value);
    }

    Ok(Part {
        headers: part_headers,
        content: body[separator + HEADER_SEPARATOR.len()..].to_vec(),
    })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
