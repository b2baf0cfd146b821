//! Response translation.
//!
//! # Design
//! All `ApiError`s are built here. A 2xx response is parsed as JSON and, when
//! the operation declares a `ResponseShape`, checked for the field it
//! promises. Anything else becomes an `ApiError` carrying the status code,
//! status text, the best message the body offers, and the raw body.

use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;

/// What a successful body must contain for a given operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Any JSON value.
    Any,
    /// `sections` object of result lists; `result_id` is copied into each item.
    Sections,
    /// `response.results` list; `result_id` is copied into each result.
    Results,
    /// Like `Results`, but a `response.redirect` is also accepted.
    ResultsOrRedirect,
    /// A `response` object; results are tagged when present.
    Response,
    /// `response.<field>` must be a list.
    ResponseList(&'static str),
    /// Top-level `<field>` must be present and non-null.
    Field(&'static str),
}

/// Parse a JSON response or raise `ApiError`.
pub fn translate(response: &HttpResponse) -> Result<Value> {
    ensure_success(response)?;
    parse_body(response)
}

/// Raw body of a successful response, for endpoints that do not return JSON.
pub fn translate_text(response: &HttpResponse) -> Result<String> {
    ensure_success(response)?;
    Ok(response.body.clone())
}

/// `translate`, then validate `shape` for `operation`.
pub fn translate_shape(
    response: &HttpResponse,
    operation: &str,
    shape: ResponseShape,
) -> Result<Value> {
    let mut json = translate(response)?;
    if !conforms(&mut json, shape) {
        return Err(api_error(
            response,
            format!("{operation} response data is malformed"),
        )
        .into());
    }
    Ok(json)
}

fn ensure_success(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(api_error(response, error_message(response)).into())
}

fn parse_body(response: &HttpResponse) -> Result<Value> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|err| {
        api_error(response, format!("failed to parse response body: {err}")).into()
    })
}

fn api_error(response: &HttpResponse, message: String) -> ApiError {
    ApiError {
        status: response.status,
        status_text: response.status_text.clone(),
        message,
        body: response.body.clone(),
    }
}

/// `message`, then `error` (a string or an object with `message`), then the
/// raw body, then the status text.
fn error_message(response: &HttpResponse) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(&response.body) {
        let from_json = json
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| json.get("error").and_then(Value::as_str))
            .or_else(|| {
                json.get("error")
                    .and_then(|error| error.get("message"))
                    .and_then(Value::as_str)
            });
        if let Some(message) = from_json {
            return message.to_string();
        }
    }
    let body = response.body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    if !response.status_text.is_empty() {
        return response.status_text.clone();
    }
    format!("HTTP {}", response.status)
}

fn conforms(json: &mut Value, shape: ResponseShape) -> bool {
    match shape {
        ResponseShape::Any => true,
        ResponseShape::Field(field) => json.get(field).is_some_and(|value| !value.is_null()),
        ResponseShape::ResponseList(field) => json
            .get("response")
            .and_then(|response| response.get(field))
            .is_some_and(Value::is_array),
        ResponseShape::Sections => {
            let result_id = json.get("result_id").cloned();
            match json.get_mut("sections").and_then(Value::as_object_mut) {
                Some(sections) => {
                    if let Some(result_id) = result_id {
                        for items in sections.values_mut() {
                            tag_results(items, &result_id);
                        }
                    }
                    true
                }
                None => false,
            }
        }
        ResponseShape::Results | ResponseShape::ResultsOrRedirect | ResponseShape::Response => {
            let result_id = json.get("result_id").cloned();
            let Some(response) = json.get_mut("response").filter(|response| response.is_object())
            else {
                return false;
            };
            let has_redirect = response.get("redirect").is_some_and(|value| !value.is_null());
            match response.get_mut("results") {
                Some(results) if results.is_array() => {
                    if let Some(result_id) = result_id {
                        tag_results(results, &result_id);
                    }
                    true
                }
                _ => match shape {
                    ResponseShape::ResultsOrRedirect => has_redirect,
                    ResponseShape::Response => true,
                    _ => false,
                },
            }
        }
    }
}

fn tag_results(results: &mut Value, result_id: &Value) {
    if let Some(results) = results.as_array_mut() {
        for result in results.iter_mut().filter_map(Value::as_object_mut) {
            result.insert("result_id".to_string(), result_id.clone());
        }
    }
}
