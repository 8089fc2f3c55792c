//! Header and request-target grammar.
//!
//! Pure string functions shared by the request parser and the multipart
//! decoder. Nothing in here touches a socket.

use indexmap::IndexMap;

use crate::http::error::{HttpError, Result};

/// Header name to value. Names are kept verbatim; a repeated name keeps its
/// first position and takes the last value.
pub type Headers = IndexMap<String, String>;

/// Query parameters. `None` means the key appeared without an `=`.
pub type QueryParams = IndexMap<String, Option<String>>;

/// A structured header value such as
/// `form-data; name="file"; filename="cat.png"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderParams {
    /// The token before the first `;`
    pub value: String,
    /// Parameters in the order they appeared, quoted strings unescaped
    pub params: IndexMap<String, String>,
}

impl HeaderParams {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|v| v.as_str())
    }
}

/// Strips optional whitespace (spaces and horizontal tabs) from both ends.
pub fn trim_ows(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t')
}

/// Splits `Name: value` into its name and value.
///
/// The name is everything before the first colon, untouched. The character
/// right after the colon is skipped and the rest is OWS-trimmed. `Name:` with
/// nothing after the colon yields an empty value.
///
/// # Example
///
/// ```
/// # use webroot::http::grammar::parse_header_line;
/// let (name, value) = parse_header_line("Content-Type: text/html").unwrap();
/// assert_eq!(name, "Content-Type");
/// assert_eq!(value, "text/html");
/// ```
pub fn parse_header_line(line: &str) -> Result<(String, String)> {
    let colon = line
        .find(':')
        .ok_or_else(|| HttpError::bad_request("Missing colon in header"))?;

    let mut rest = line[colon + 1..].chars();
    rest.next();

    Ok((line[..colon].to_string(), trim_ows(rest.as_str()).to_string()))
}

/// Splits a request target into the path and its query parameters.
///
/// Values are not percent-decoded.
pub fn parse_request_target(target: &str) -> (String, QueryParams) {
    let Some((path, query)) = target.split_once('?') else {
        return (target.to_string(), QueryParams::new());
    };

    let mut params = QueryParams::new();
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some((key, value)) => params.insert(key.to_string(), Some(value.to_string())),
            None => params.insert(pair.to_string(), None),
        };
    }

    (path.to_string(), params)
}

/// Parses `main; name=value; name="quoted \"value\""`.
pub fn parse_header_value_parameters(raw: &str) -> Result<HeaderParams> {
    let mut segments = raw.split(';');
    let value = trim_ows(segments.next().unwrap_or_default()).to_string();

    let mut params = IndexMap::new();
    for segment in segments {
        let segment = trim_ows(segment);
        let (name, value) = segment
            .split_once('=')
            .ok_or_else(|| HttpError::bad_request("Invalid header parameter syntax"))?;

        let value = match value.strip_prefix('"') {
            Some(quoted) => unescape_quoted(quoted.strip_suffix('"').unwrap_or(quoted))?,
            None => value.to_string(),
        };
        params.insert(name.to_string(), value);
    }

    Ok(HeaderParams { value, params })
}

/// Replaces every `\<char>` with `<char>`.
fn unescape_quoted(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            let escaped = chars
                .next()
                .ok_or_else(|| HttpError::bad_request("Invalid backslash at the end of string"))?;
            out.push(escaped);
        } else {
            out.push(c);
        }
    }

    Ok(out)
}
