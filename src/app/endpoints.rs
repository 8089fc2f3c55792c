//! Query-parameter endpoints and the upload/image pair.

use std::io;
use std::path::Path;

use tracing::info;

use crate::app::static_files::{ContentTypes, is_valid_filename};
use crate::http::error::{HttpError, Result};
use crate::http::grammar::parse_header_value_parameters;
use crate::http::multipart::parse_form_data;
use crate::http::request::Request;
use crate::http::response::Response;

const PLAINTEXT: &str = "text/plain";

/// `GET /calculate-next?num=N` responds with `N + 1`.
pub fn calculate_next(request: &Request) -> Result<Response> {
    let num = int_param(request, "num")?;
    Ok(Response::ok(PLAINTEXT, (i128::from(num) + 1).to_string()))
}

/// `GET /calculate-area?height=H&width=W` responds with the area of the
/// triangle, always rendered with a fractional part (`6.0`, `7.5`).
pub fn calculate_area(request: &Request) -> Result<Response> {
    let height = int_param(request, "height")?;
    let width = int_param(request, "width")?;

    // The product is exact in i128, so the quotient is rounded only once
    let area = (i128::from(height) * i128::from(width)) as f64 / 2.0;
    Ok(Response::ok(PLAINTEXT, format_float(area)))
}

/// Shortest round-trip rendering with a signed, two-digit exponent once the
/// magnitude leaves `[1e-4, 1e16)`: `7.5`, `1e+16`, `1.5e-05`.
fn format_float(value: f64) -> String {
    let repr = format!("{value:?}");

    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// `POST /upload` stores the single form-data part under its `filename`.
pub async fn upload(request: &Request, uploads: &Path) -> Result<Response> {
    let part = parse_form_data(request.body(), &request.headers)?;

    let disposition = part.header("Content-Disposition").ok_or_else(|| {
        HttpError::bad_request("Missing Content-Disposition header in request body")
    })?;
    let disposition = parse_header_value_parameters(disposition)?;
    let file_name = disposition.param("filename").ok_or_else(|| {
        HttpError::bad_request("Missing filename in Content-Disposition header in request body")
    })?;

    if !is_valid_filename(file_name) {
        return Err(HttpError::bad_request("Invalid filename"));
    }

    tokio::fs::write(uploads.join(file_name), &part.content).await?;
    info!(file = %file_name, bytes = part.content.len(), "Stored upload");

    Ok(Response::created("Upload Successful"))
}

/// `GET /image?image-name=X` returns a previously uploaded file.
pub async fn get_image(
    request: &Request,
    uploads: &Path,
    content_types: &ContentTypes,
) -> Result<Response> {
    let image_name = request
        .query_param("image-name")
        .ok_or_else(|| HttpError::bad_request("Missing image-name parameter"))?
        .filter(|name| is_valid_filename(name))
        .ok_or_else(|| HttpError::bad_request("Invalid image name"))?;

    match tokio::fs::read(uploads.join(image_name)).await {
        Ok(content) => Ok(Response::ok(content_types.for_file(image_name), content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Response::not_found()),
        Err(e) => Err(e.into()),
    }
}

/// Reads a required integer query parameter. A key without a value counts
/// as "not an integer" rather than missing.
fn int_param(request: &Request, name: &str) -> Result<i64> {
    let value = request
        .query_param(name)
        .ok_or_else(|| HttpError::bad_request(format!("Missing {name}")))?;

    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| HttpError::bad_request(format!("{name} isn't integer")))
}
