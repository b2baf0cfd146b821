//! Request assembly.
//!
//! # Design
//! `RequestBuilder` turns an endpoint template, its path parameters, the
//! call's query parameters and an optional body into an `HttpRequest`. The
//! query string order is fixed:
//!
//! 1. the call's normalized parameters, in insertion order
//! 2. auth parameters from the `AuthFragment`
//! 3. `c`, the client identifier, always
//! 4. `_dt`, the cache-busting timestamp, when one was supplied
//!
//! Identifiers in the path (pod, quiz, group ids, browse filters) are escaped
//! as one segment, `/` included. Search and autocomplete terms keep `/`.
//!
//! The builder never performs I/O.

use serde::Serialize;

use crate::auth::AuthFragment;
use crate::error::{Error, Result};
use crate::http::{Body, HttpMethod, HttpRequest, MultipartForm};
use crate::params::{encode_pairs, encode_path_segment, encode_path_text, normalize, QueryParams};

pub const CLIENT_PARAM: &str = "c";
pub const TIMESTAMP_PARAM: &str = "_dt";

/// How a placeholder value is escaped into the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEncoding {
    /// An identifier that must stay one segment; `/` is escaped.
    Segment,
    /// Free text such as a search term; `/` is kept.
    Text,
}

/// One `{name}` substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: &'static str,
    pub value: String,
    pub encoding: PathEncoding,
}

impl PathParam {
    pub fn segment(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            encoding: PathEncoding::Segment,
        }
    }

    pub fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            encoding: PathEncoding::Text,
        }
    }

    fn encoded(&self) -> String {
        match self.encoding {
            PathEncoding::Segment => encode_path_segment(&self.value),
            PathEncoding::Text => encode_path_text(&self.value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: HttpMethod,
    base_url: String,
    template: &'static str,
    path_params: Vec<PathParam>,
    query: QueryParams,
    headers: Vec<(String, String)>,
    body: Option<Body>,
    timestamp: Option<u64>,
}

impl RequestBuilder {
    /// `template` is the path below `base_url`, with `{name}` placeholders.
    pub fn new(method: HttpMethod, base_url: &str, template: &'static str) -> Self {
        Self {
            method,
            base_url: base_url.trim_end_matches('/').to_string(),
            template,
            path_params: Vec::new(),
            query: QueryParams::new(),
            headers: Vec::new(),
            body: None,
            timestamp: None,
        }
    }

    /// Substitute an identifier (`/` is escaped).
    pub fn path_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path_params.push(PathParam::segment(name, value));
        self
    }

    /// Substitute free text, keeping `/` as typed.
    pub fn path_text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path_params.push(PathParam::text(name, value));
        self
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn json_body<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        let body = serde_json::to_string(payload)?;
        self.body = Some(Body::Json(body));
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(Body::Multipart(form));
        self
    }

    pub fn timestamp(mut self, timestamp: Option<u64>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self, auth: &AuthFragment, client_identifier: &str) -> Result<HttpRequest> {
        let path = render_path(self.template, &self.path_params)?;

        let mut pairs = normalize(&self.query).pairs();
        pairs.extend(auth.query.iter().cloned());
        pairs.push((CLIENT_PARAM.to_string(), client_identifier.to_string()));
        if let Some(timestamp) = self.timestamp {
            pairs.push((TIMESTAMP_PARAM.to_string(), timestamp.to_string()));
        }
        let query = encode_pairs(&pairs);

        let mut headers = Vec::new();
        if let Some(body) = &self.body {
            headers.push(("content-type".to_string(), body.content_type()));
        }
        headers.extend(auth.headers.iter().cloned());
        headers.extend(self.headers);

        Ok(HttpRequest {
            method: self.method,
            url: format!("{}{path}?{query}", self.base_url),
            headers,
            body: self.body,
        })
    }
}

/// Substitute `{name}` placeholders in `template`.
///
/// Every placeholder needs a non-blank value and every supplied value needs a
/// placeholder.
pub fn render_path(template: &str, params: &[PathParam]) -> Result<String> {
    let mut path = String::with_capacity(template.len());
    let mut used = vec![false; params.len()];
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|offset| open + offset)
            .ok_or_else(|| Error::Validation(format!("unterminated placeholder in {template}")))?;
        let name = &rest[open + 1..close];
        path.push_str(&rest[..open]);

        let position = params.iter().position(|param| param.name == name);
        let param = position
            .map(|index| &params[index])
            .filter(|param| !param.value.trim().is_empty())
            .ok_or_else(|| Error::Validation(format!("{name} is a required parameter")))?;
        if let Some(index) = position {
            used[index] = true;
        }
        path.push_str(&param.encoded());
        rest = &rest[close + 1..];
    }
    path.push_str(rest);

    if let Some(index) = used.iter().position(|used| !used) {
        return Err(Error::Validation(format!(
            "unknown path parameter {} for {template}",
            params[index].name
        )));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::sign;
    use crate::config::ClientConfig;
    use crate::http::{FormPart, PartSource};
    use pretty_assertions::assert_eq;

    fn auth() -> AuthFragment {
        sign(&ClientConfig::new("k1")).unwrap()
    }

    #[test]
    fn path_placeholders_are_encoded() {
        let path = render_path(
            "/browse/{filter_name}/{filter_value}",
            &[
                PathParam::segment("filter_name", "group_id"),
                PathParam::segment("filter_value", "men's shoes"),
            ],
        )
        .unwrap();
        assert_eq!(path, "/browse/group_id/men%27s%20shoes");
    }

    #[test]
    fn identifiers_stay_one_segment() {
        let path = render_path(
            "/v1/item_groups/{item_group_id}",
            &[PathParam::segment("item_group_id", "tools/drills")],
        )
        .unwrap();
        assert_eq!(path, "/v1/item_groups/tools%2Fdrills");

        let path = render_path("/search/{query}", &[PathParam::text("query", "ac/dc shirt")]).unwrap();
        assert_eq!(path, "/search/ac/dc%20shirt");
    }

    #[test]
    fn missing_or_blank_path_parameter_fails() {
        let err = render_path("/v1/item_groups/{item_group_id}", &[]).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "item_group_id is a required parameter"));

        let err = render_path(
            "/v1/item_groups/{item_group_id}",
            &[PathParam::segment("item_group_id", "  ")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn unknown_path_parameter_fails() {
        let err = render_path("/v1/tasks", &[PathParam::segment("task_id", "1")]).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("task_id")));
    }

    #[test]
    fn query_order_is_params_then_auth_then_markers() {
        let mut query = QueryParams::new();
        query.insert("page", 2u32);
        query.insert("filters[color]", vec!["red", "blue"]);
        query.insert("section", "");

        let req = RequestBuilder::new(HttpMethod::Get, "https://ac.cnstrc.com/", "/search/{query}")
            .path_param("query", "shoes")
            .query(query)
            .timestamp(Some(1700000000000))
            .build(&auth(), "cio-rs-test")
            .unwrap();

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://ac.cnstrc.com/search/shoes?page=2\
             &filters%5Bcolor%5D=red&filters%5Bcolor%5D=blue\
             &key=k1&c=cio-rs-test&_dt=1700000000000"
        );
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn json_body_sets_content_type() {
        let req = RequestBuilder::new(HttpMethod::Put, "http://localhost", "/v2/items")
            .json_body(&serde_json::json!({"items": [{"id": "1"}]}))
            .unwrap()
            .build(&auth(), "c")
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(
            req.body,
            Some(Body::Json(r#"{"items":[{"id":"1"}]}"#.to_string()))
        );
        assert_eq!(req.url, "http://localhost/v2/items?key=k1&c=c");
    }

    #[test]
    fn multipart_body_sets_boundary_content_type() {
        let mut form = MultipartForm::with_boundary("b0");
        form.push(FormPart::csv(
            "items",
            "items.csv",
            PartSource::Bytes(b"id\n1\n".to_vec()),
        ));
        let req = RequestBuilder::new(HttpMethod::Patch, "http://localhost", "/v1/catalog")
            .multipart(form)
            .headers(vec![("User-Agent".to_string(), "test".to_string())])
            .build(&sign(&ClientConfig::new("k1").with_api_token("t")).unwrap(), "c")
            .unwrap();
        assert_eq!(
            req.headers,
            vec![
                (
                    "content-type".to_string(),
                    "multipart/form-data; boundary=b0".to_string()
                ),
                ("Authorization".to_string(), "Basic dDo=".to_string()),
                ("User-Agent".to_string(), "test".to_string()),
            ]
        );
    }
}
