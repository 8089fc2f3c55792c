use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::http::error::{HttpError, Result};
use crate::http::handler::Handler;
use crate::http::parser::parse_request;
use crate::http::reader::{LineReader, ReadLimits};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// One accepted client. Handles a single exchange, then closes.
pub struct Connection<S, H> {
    stream: S,
    handler: Arc<H>,
    limits: ReadLimits,
    state: ConnectionState,
}

#[derive(Debug)]
pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(Response),
    Closed,
}

impl<S, H> Connection<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Handler,
{
    pub fn new(stream: S, handler: Arc<H>, limits: ReadLimits) -> Self {
        Self {
            stream,
            handler,
            limits,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection to `Closed`.
    ///
    /// Exactly one response is written and the stream is shut down exactly
    /// once, whatever happened while reading or handling. The returned error,
    /// if any, is the failure to deliver that response.
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut outcome = Ok(());

        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.receive_request().await {
                    Ok(request) => ConnectionState::Processing(request),
                    Err(e) => ConnectionState::Writing(failure_response(e)),
                },

                ConnectionState::Processing(request) => {
                    ConnectionState::Writing(self.dispatch(&request).await)
                }

                ConnectionState::Writing(response) => {
                    outcome = self.send_response(&response).await;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        self.close().await;
        outcome
    }

    /// Reads and parses one request from the stream.
    pub async fn receive_request(&mut self) -> Result<Request> {
        let mut reader = LineReader::new(&mut self.stream, self.limits);
        parse_request(&mut reader).await
    }

    /// Writes a complete response. Each write gets the same deadline as a
    /// read, so a peer that never reads cannot hold the connection open.
    pub async fn send_response(&mut self, response: &Response) -> std::io::Result<()> {
        let mut writer = ResponseWriter::new(response).with_timeout(self.limits.read_timeout);
        let result = writer.write_to_stream(&mut self.stream).await;

        if matches!(&result, Err(e) if e.kind() == std::io::ErrorKind::TimedOut) {
            warn!(written = writer.written(), "Client stopped reading the response");
        }

        result
    }

    /// Shuts the stream down. Failures are only logged; the peer may already
    /// be gone.
    pub async fn close(mut self) {
        match timeout(self.limits.read_timeout, self.stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Shutdown failed"),
            Err(_) => debug!("Shutdown timed out"),
        }
    }

    async fn dispatch(&self, request: &Request) -> Response {
        match self.handler.handle(request).await {
            Ok(response) => {
                info!(
                    method = %request.method,
                    path = %request.path,
                    status = response.status().as_u16(),
                    "Request handled"
                );
                response
            }
            Err(e) => failure_response(e),
        }
    }
}

/// Logs the error at the level it deserves and renders its response.
fn failure_response(err: HttpError) -> Response {
    match &err {
        HttpError::BadRequest(message) => warn!(reason = %message, "Bad request"),
        HttpError::Timeout => warn!("Client timed out"),
        HttpError::Io(e) => error!(error = %e, "Internal error while serving request"),
    }

    err.into_response()
}
