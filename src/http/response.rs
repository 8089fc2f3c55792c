use crate::http::grammar::Headers;

const CONTENT_LENGTH: &str = "Content-Length";
const PLAINTEXT: &str = "text/plain";

/// HTTP status codes the server produces.
///
/// - `Ok` (200): Request successful
/// - `Created` (201): Upload stored
/// - `BadRequest` (400): Malformed request
/// - `Forbidden` (403): Path outside the web root or a directory
/// - `NotFound` (404): Resource not found
/// - `RequestTimeout` (408): Client sent nothing in time
/// - `InternalServerError` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 408 Request Timeout
    RequestTimeout,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::RequestTimeout.as_u16(), 408);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::RequestTimeout => 408,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A complete HTTP response ready to be sent to a client.
///
/// The `Content-Length` header always matches the body. Fields are private so
/// the only ways to change the body or headers go through methods that keep
/// it that way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use webroot::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response.
    ///
    /// Content-Length is always written from the body, replacing any value
    /// set through [`ResponseBuilder::header`].
    pub fn build(self) -> Response {
        let mut response = Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        };
        response.sync_content_length();
        response
    }
}

impl Response {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Adds or replaces a header. Content-Length cannot be overridden.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
        self.sync_content_length();
    }

    /// Replaces the body and updates Content-Length to match.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
        self.sync_content_length();
    }

    fn sync_content_length(&mut self) {
        self.headers
            .retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_LENGTH));
        self.headers
            .insert(CONTENT_LENGTH.to_string(), self.body.len().to_string());
    }

    /// Creates a 200 OK response with the given body and content type.
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::text(StatusCode::Ok, content_type, body)
    }

    /// Creates a response with a Content-Type header.
    pub fn text(status: StatusCode, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", content_type)
            .body(body)
            .build()
    }

    /// Creates a 201 Created response with a plain-text message.
    pub fn created(message: impl Into<Vec<u8>>) -> Self {
        Self::text(StatusCode::Created, PLAINTEXT, message)
    }

    /// Creates a 400 Bad Request response carrying the cause as plain text.
    pub fn bad_request(message: impl Into<Vec<u8>>) -> Self {
        Self::text(StatusCode::BadRequest, PLAINTEXT, message)
    }

    /// Creates an empty 403 Forbidden response.
    pub fn forbidden() -> Self {
        ResponseBuilder::new(StatusCode::Forbidden).build()
    }

    /// Creates an empty 404 Not Found response.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound).build()
    }

    /// Creates a 408 Request Timeout response that tells the client the
    /// connection is closing.
    pub fn request_timeout() -> Self {
        ResponseBuilder::new(StatusCode::RequestTimeout)
            .header("Connection", "close")
            .build()
    }

    /// Creates an empty 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError).build()
    }
}
