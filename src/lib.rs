//! Webroot - a small HTTP/1.1 file and upload server
//!
//! Core library for the HTTP message layer and the application it serves.

pub mod app;
pub mod config;
pub mod http;
pub mod server;
