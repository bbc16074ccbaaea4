//! Calculator endpoint: `POST /` with form field `query`
//!
//! Every failure, whatever its cause, becomes `{"result": null}` with
//! status 200. The cause is only visible in the debug log.

use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::{header, Request, Response};

use crate::calc::{CalcResponse, OperationTable, Query};
use crate::config::AppState;
use crate::error::{RequestFailure, Result};
use crate::http;

/// Name of the form field carrying the JSON query
pub const QUERY_FIELD: &str = "query";

/// Outcome of one calculation request
#[derive(Debug)]
pub struct Calculation {
    /// Operator, if the query parsed
    pub op: Option<String>,
    pub outcome: Result<f64>,
}

impl Calculation {
    const fn failed(failure: RequestFailure) -> Self {
        Self {
            op: None,
            outcome: Err(failure),
        }
    }

    /// Evaluate a raw JSON query
    pub fn from_raw(table: &OperationTable, raw: &str) -> Self {
        match Query::parse(raw) {
            Ok(query) => Self {
                outcome: query.evaluate(table),
                op: Some(query.op),
            },
            Err(failure) => Self::failed(failure),
        }
    }

    pub fn response(&self) -> CalcResponse {
        CalcResponse::from(&self.outcome)
    }
}

/// Read the body and run the calculation it describes
pub async fn calculate<B>(req: Request<B>, state: &AppState) -> Calculation
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match read_query(req, state.config.http.max_body_size).await {
        Ok(raw) => Calculation::from_raw(&state.operations, &raw),
        Err(failure) => Calculation::failed(failure),
    }
}

/// Build the JSON response for a finished calculation
pub fn build_response(calculation: &Calculation, server_name: &str) -> Response<Full<Bytes>> {
    http::build_json_response(calculation.response().to_json(), server_name)
}

/// Extract the raw `query` form field from the request body
async fn read_query<B>(req: Request<B>, max_body_size: u64) -> Result<String>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // Without a form Content-Type the body carries no arguments at all
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();
    if !http::is_form_content_type(&content_type) {
        return Err(RequestFailure::UnsupportedContentType(content_type));
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map_err(|e| RequestFailure::BodyUnreadable {
            message: e.to_string(),
        })?
        .to_bytes();

    http::body_argument(&body, QUERY_FIELD).ok_or(RequestFailure::MissingQuery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state(max_body_size: u64) -> AppState {
        let mut cfg = Config::load_from("does-not-exist/calc-test-config", false, None).unwrap();
        cfg.http.max_body_size = max_body_size;
        AppState::new(&cfg)
    }

    fn form_request(body: &str) -> Request<Full<Bytes>> {
        Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_query() {
        let state = test_state(1024);
        let calc = calculate(form_request(r#"query={"op":"-","ops":[1,2,3]}"#), &state).await;
        assert_eq!(calc.op.as_deref(), Some("-"));
        assert_eq!(calc.response(), CalcResponse::value(-4.0));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_null() {
        let state = test_state(1024);
        let req = Request::post("/")
            .body(Full::new(Bytes::from(r#"query={"op":"*","ops":[2,3]}"#)))
            .unwrap();
        let calc = calculate(req, &state).await;
        assert!(matches!(
            calc.outcome,
            Err(RequestFailure::UnsupportedContentType(ref ct)) if ct.is_empty()
        ));
        assert_eq!(calc.response(), CalcResponse::NULL);
    }

    #[tokio::test]
    async fn test_multipart_is_null() {
        let state = test_state(1024);
        let req = Request::post("/")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=xyz")
            .body(Full::new(Bytes::from(
                "--xyz\r\nContent-Disposition: form-data; name=\"query\"\r\n\r\n{\"op\":\"*\",\"ops\":[2,3]}\r\n--xyz--\r\n",
            )))
            .unwrap();
        let calc = calculate(req, &state).await;
        assert!(matches!(
            calc.outcome,
            Err(RequestFailure::UnsupportedContentType(_))
        ));
    }

    #[tokio::test]
    async fn test_json_content_type_rejected() {
        let state = test_state(1024);
        let req = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(r#"query={"op":"*","ops":[2,3]}"#)))
            .unwrap();
        let calc = calculate(req, &state).await;
        assert!(matches!(
            calc.outcome,
            Err(RequestFailure::UnsupportedContentType(_))
        ));
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let state = test_state(8);
        let calc = calculate(form_request(r#"query={"op":"+","ops":[1]}"#), &state).await;
        assert!(matches!(
            calc.outcome,
            Err(RequestFailure::BodyUnreadable { .. })
        ));
        assert_eq!(calc.response(), CalcResponse::NULL);
    }

    #[tokio::test]
    async fn test_missing_query() {
        let state = test_state(1024);
        let calc = calculate(form_request("other=1"), &state).await;
        assert!(matches!(calc.outcome, Err(RequestFailure::MissingQuery)));
        assert_eq!(calc.op, None);
    }

    #[tokio::test]
    async fn test_unknown_operator_keeps_op() {
        let state = test_state(1024);
        let calc = calculate(form_request(r#"query={"op":"^","ops":[1,1]}"#), &state).await;
        assert_eq!(calc.op.as_deref(), Some("^"));
        assert!(matches!(calc.outcome, Err(RequestFailure::UnknownOperator(_))));
    }
}
