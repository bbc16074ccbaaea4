//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: path and method checks, the
//! calculator endpoint, and access logging.

use crate::config::AppState;
use crate::handler::calculate;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{header, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// The calculator's only route
pub const CALC_PATH: &str = "/";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.access_log_enabled();
    let mut entry = access_log.then(|| access_log_entry(&req, peer_addr));

    let response = if req.uri().path() != CALC_PATH {
        http::build_404_response()
    } else if req.method() != Method::POST {
        http::build_405_response()
    } else {
        let calculation = calculate::calculate(req, &state).await;
        if let Err(ref failure) = calculation.outcome {
            logger::log_request_failure(&peer_addr, failure);
        }
        let response = calculate::build_response(&calculation, &state.config.http.server_name);
        if let Some(entry) = entry.as_mut() {
            entry.result = Some(calculation.response().result_json());
            entry.op = calculation.op;
        }
        response
    };

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Capture request details before the body is consumed
fn access_log_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header_value = |name: header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_string(), ToString::to_string),
    );
    entry.http_version = format_version(req.version()).to_string();
    entry.referer = header_value(header::REFERER);
    entry.user_agent = header_value(header::USER_AGENT);
    entry
}

fn format_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
