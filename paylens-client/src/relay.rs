//! Same-origin relay in front of the analysis backend.
//!
//! `POST /api/analyze-statement` takes the browser/TUI multipart upload and
//! forwards the body unchanged to `{backend}/analyze-statement`, passing the
//! backend's status and JSON back. The backend URL never leaves this process.

use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use serde_json::{json, Value};
use std::net::SocketAddr;

pub const RELAY_ROUTE: &str = "/api/analyze-statement";
pub const BACKEND_PATH: &str = "/analyze-statement";

pub const NO_FILE_ERROR: &str = "No file provided";
pub const RELAY_FAILURE_ERROR: &str = "Failed to process statement via backend";

/// Statements are small, but the actix default of 256 KiB is not enough.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub backend_base_url: String,
    pub max_upload_bytes: usize,
}

impl RelayConfig {
    pub fn new(backend_base_url: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            backend_base_url: backend_base_url.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayState {
    http: reqwest::Client,
    backend_url: String,
}

impl RelayState {
    pub fn new(backend_base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            backend_url: format!("{}{}", backend_base_url.trim_end_matches('/'), BACKEND_PATH),
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(analyze_statement);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "message": "Service is running"
    }))
}

#[post("/api/analyze-statement")]
async fn analyze_statement(
    state: web::Data<RelayState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !content_type.starts_with("multipart/form-data") || !has_file_part(content_type, &body) {
        tracing::info!(content_type, size = body.len(), "upload without a file part");
        return HttpResponse::BadRequest().json(json!({ "error": NO_FILE_ERROR }));
    }

    match forward(&state, content_type, body).await {
        Ok((status, payload)) => {
            if !(200..300).contains(&status) {
                tracing::warn!(status, body = %payload, "backend error");
            }
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(payload)
        }
        Err(details) => {
            tracing::error!(error = %details, backend = %state.backend_url, "relay failed");
            HttpResponse::InternalServerError().json(json!({
                "error": RELAY_FAILURE_ERROR,
                "details": details
            }))
        }
    }
}

/// `boundary` parameter of a multipart content type, unquoted.
fn multipart_boundary(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then_some(value)
    })
}

/// True when the multipart body carries a part named `file`. Only the part
/// headers are inspected; the file bytes go to the backend untouched.
fn has_file_part(content_type: &str, body: &[u8]) -> bool {
    let Some(boundary) = multipart_boundary(content_type) else {
        return false;
    };
    let delimiter = format!("--{boundary}");

    split_on(body, delimiter.as_bytes()).skip(1).any(|part| {
        let headers = match find(part, b"\r\n\r\n") {
            Some(end) => &part[..end],
            None => return false,
        };
        String::from_utf8_lossy(headers).lines().any(|line| {
            let Some((name, value)) = line.split_once(':') else {
                return false;
            };
            name.trim().eq_ignore_ascii_case("content-disposition")
                && value.split(';').any(|param| {
                    matches!(
                        param.trim().split_once('='),
                        Some((key, "\"file\"" | "file")) if key.trim().eq_ignore_ascii_case("name")
                    )
                })
        })
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn split_on<'a>(mut body: &'a [u8], delimiter: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        match find(body, delimiter) {
            Some(at) => {
                let part = &body[..at];
                body = &body[at + delimiter.len()..];
                Some(part)
            }
            None => {
                done = true;
                Some(body)
            }
        }
    })
}

/// POST the uploaded bytes to the backend. Any failure, including a body that
/// is not JSON, comes back as a message string.
async fn forward(
    state: &RelayState,
    content_type: &str,
    body: web::Bytes,
) -> Result<(u16, Value), String> {
    tracing::debug!(size = body.len(), backend = %state.backend_url, "forwarding upload");

    let resp = state
        .http
        .post(&state.backend_url)
        .header(reqwest::header::CONTENT_TYPE, content_type)
        .body(body.to_vec())
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = resp.status().as_u16();
    let payload: Value = resp.json().await.map_err(|e| e.to_string())?;
    Ok((status, payload))
}

/// Bind the relay without running it. Port 0 picks a free port; the bound
/// address is returned.
pub fn bind_relay(config: &RelayConfig) -> std::io::Result<(Server, SocketAddr)> {
    let state = web::Data::new(RelayState::new(&config.backend_base_url));
    let limit = config.max_upload_bytes;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(limit))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?;

    let addr = server
        .addrs()
        .first()
        .copied()
        .ok_or_else(|| std::io::Error::other("relay bound to no address"))?;

    Ok((server.run(), addr))
}

pub async fn run_relay(config: RelayConfig) -> std::io::Result<()> {
    let (server, addr) = bind_relay(&config)?;
    tracing::info!(
        "relay listening on http://{}{} -> {}{}",
        addr,
        RELAY_ROUTE,
        config.backend_base_url.trim_end_matches('/'),
        BACKEND_PATH
    );
    server.await
}
