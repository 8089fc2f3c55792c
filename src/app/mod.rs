//! The web application served on every connection.
//!
//! A fixed dispatch table keyed by (method, path); anything it doesn't
//! name is looked up as a file under the web root.

pub mod endpoints;
pub mod static_files;

use std::path::PathBuf;

use crate::config::StaticFilesConfig;
use crate::http::error::HttpError;
use crate::http::handler::Handler;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use static_files::{ContentTypes, StaticFiles};

/// Immutable application state, shared between connections behind an `Arc`.
#[derive(Debug, Clone)]
pub struct App {
    files: StaticFiles,
    uploads: PathBuf,
}

impl App {
    pub fn new(cfg: &StaticFilesConfig) -> Self {
        let content_types = ContentTypes::with_overrides(&cfg.content_types);
        Self {
            files: StaticFiles::new(&cfg.root_dir, content_types),
            uploads: cfg.root_dir.join(&cfg.uploads_dir),
        }
    }
}

impl Handler for App {
    async fn handle(&self, request: &Request) -> Result<Response, HttpError> {
        match (&request.method, request.path.as_str()) {
            (Method::GET, "/calculate-next") => endpoints::calculate_next(request),
            (Method::GET, "/calculate-area") => endpoints::calculate_area(request),
            (Method::POST, "/upload") => endpoints::upload(request, &self.uploads).await,
            (Method::GET, "/image") => {
                endpoints::get_image(request, &self.uploads, self.files.content_types()).await
            }
            (_, path) => Ok(self.files.serve(path).await?),
        }
    }
}
