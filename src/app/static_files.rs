//! Files under the web root: path resolution, content types, and the
//! upload directory.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::http::response::Response;

const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Characters that can never appear in an uploaded file name
const FILENAME_FORBIDDEN_CHARACTERS: &str = "/\\?*:|\"<>";
/// Characters a file name may not end with
const FILENAME_FORBIDDEN_LAST_CHARACTERS: &str = ". ";

/// Content type by file extension.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    by_extension: HashMap<String, String>,
}

impl Default for ContentTypes {
    fn default() -> Self {
        let by_extension = [
            ("html", "text/html"),
            ("css", "text/css"),
            ("js", "application/javascript"),
            ("jpg", "image/jpeg"),
            ("gif", "image/gif"),
            ("png", "image/png"),
            ("ico", "image/x-icon"),
        ]
        .into_iter()
        .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
        .collect();

        Self { by_extension }
    }
}

impl ContentTypes {
    /// Built-in table with `extra` layered on top.
    pub fn with_overrides(extra: &HashMap<String, String>) -> Self {
        let mut types = Self::default();
        types
            .by_extension
            .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        types
    }

    /// Looks up the text after the last `.` in `file_name`. No extension or
    /// an unknown one gives `text/plain`.
    ///
    /// # Example
    ///
    /// ```
    /// # use webroot::app::static_files::ContentTypes;
    /// let types = ContentTypes::default();
    /// assert_eq!(types.for_file("logo.png"), "image/png");
    /// assert_eq!(types.for_file("README"), "text/plain");
    /// ```
    pub fn for_file(&self, file_name: &str) -> &str {
        file_name
            .rsplit_once('.')
            .and_then(|(_, ext)| self.by_extension.get(ext))
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Whether `name` can be used as a single file name.
pub fn is_valid_filename(name: &str) -> bool {
    let Some(last) = name.chars().last() else {
        return false;
    };

    !name.chars().any(|c| FILENAME_FORBIDDEN_CHARACTERS.contains(c))
        && !FILENAME_FORBIDDEN_LAST_CHARACTERS.contains(last)
}

/// Serves files from a root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    content_types: ContentTypes,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, content_types: ContentTypes) -> Self {
        Self {
            root: root.into(),
            content_types,
        }
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Maps a request path onto the root. `.` segments are dropped and `..`
    /// pops a segment; `None` means the path climbs out of the root.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut segments: Vec<&std::ffi::OsStr> = Vec::new();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => segments.push(s),
                Component::CurDir => {}
                Component::ParentDir => {
                    segments.pop()?;
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        let mut path = self.root.clone();
        path.extend(segments);
        Some(path)
    }

    /// 200 with the file, 403 outside the root or for a directory, 404 when
    /// nothing is there.
    pub async fn serve(&self, url_path: &str) -> io::Result<Response> {
        let Some(path) = self.map_path(url_path) else {
            return Ok(Response::forbidden());
        };

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Response::not_found()),
            Err(e) => return Err(e),
        };

        if metadata.is_dir() {
            return Ok(Response::forbidden());
        }

        let body = tokio::fs::read(&path).await?;
        Ok(Response::ok(self.content_types.for_file(url_path), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> StaticFiles {
        StaticFiles::new("root", ContentTypes::default())
    }

    #[test]
    fn map_path_prevents_traversal() {
        assert!(files().map_path("/../Cargo.toml").is_none());
        assert!(files().map_path("/a/../../Cargo.toml").is_none());
    }

    #[test]
    fn map_path_resolves_inside_root() {
        assert_eq!(
            files().map_path("/a/./b/../index.html"),
            Some(PathBuf::from("root/a/index.html"))
        );
        assert_eq!(files().map_path("/"), Some(PathBuf::from("root")));
        assert_eq!(files().map_path(""), Some(PathBuf::from("root")));
    }
}
