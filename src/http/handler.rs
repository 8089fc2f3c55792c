use crate::http::error::HttpError;
use crate::http::request::Request;
use crate::http::response::Response;

/// Turns a parsed request into a response.
///
/// Errors are not the handler's to render: a returned `HttpError` is mapped
/// to a 400/408/500 by the connection, the same way parse failures are.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &Request) -> impl Future<Output = Result<Response, HttpError>> + Send;
}
