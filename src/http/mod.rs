//! HTTP/1.1 message layer.
//!
//! Turns a byte stream into a validated [`request::Request`], hands it to a
//! [`handler::Handler`], and writes the resulting [`response::Response`]
//! back. Every connection carries exactly one exchange.
//!
//! # Architecture
//!
//! - **`grammar`**: header lines, request targets, structured header values
//! - **`reader`**: CRLF line reader and Content-Length body reader with timeouts
//! - **`parser`**: request line, headers and body, in that order
//! - **`multipart`**: single-part `multipart/form-data` decoding
//! - **`request`** / **`response`**: the message types
//! - **`writer`**: response serialization
//! - **`connection`**: the per-client state machine
//! - **`error`**: the failure taxonomy and its mapping to 400/408/500
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Parse request line, headers, body
//!        └──────┬──────┘
//!               │ Request parsed          (400 / 408 / 500 on failure ─┐)
//!               ▼                                                      │
//!        ┌──────────────────┐                                          │
//!        │   Processing     │ ← Handler builds the response            │
//!        └──────┬───────────┘                                          │
//!               │ Response ready                                       │
//!               ▼                                                      │
//!        ┌──────────────────┐                                          │
//!        │    Writing       │ ← Send response to client  ◄─────────────┘
//!        └──────┬───────────┘
//!               │
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ← Stream shut down
//!        └──────────────────┘
//! ```

pub mod connection;
pub mod error;
pub mod grammar;
pub mod handler;
pub mod multipart;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;
