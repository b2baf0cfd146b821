//! Query parameter normalization and encoding.
//!
//! # Design
//! Every operation funnels its arguments into a `QueryParams`: an ordered map
//! from parameter name to `ParamValue`. `normalize` turns that map into the
//! canonical form that is serialized onto the URL:
//!
//! - values that are empty after cleanup are dropped, keys are never repeated
//! - whitespace inside strings becomes a plain space
//! - nested lists are flattened, list order is kept
//!
//! Normalization is pure and idempotent. Encoding is a separate step
//! (`encode_component`) applied once at serialization time, so normalizing an
//! already-normalized map never double-encodes anything.

use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Bytes left as-is in query components. Space is emitted as `+`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Free-text path values (search terms) additionally keep `/`.
const PATH_TEXT: &AsciiSet = &QUERY_COMPONENT.remove(b'/');

/// Percent-encode a query key or value (`application/x-www-form-urlencoded`).
pub fn encode_component(value: &str) -> String {
    // '%' itself is escaped, so "%20" can only come from a space.
    utf8_percent_encode(value, QUERY_COMPONENT)
        .to_string()
        .replace("%20", "+")
}

/// Percent-encode an identifier as exactly one path segment. `/` is escaped
/// and space becomes `%20`.
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}

/// Percent-encode a free-text path value. Unlike `encode_path_segment`, `/`
/// is kept.
pub fn encode_path_text(value: &str) -> String {
    utf8_percent_encode(value, PATH_TEXT).to_string()
}

/// Encoded `k=v&k=v` string for already rendered pairs.
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    fn normalized(&self) -> Option<ParamValue> {
        match self {
            ParamValue::Str(value) => {
                let value: String = value
                    .chars()
                    .map(|c| if c.is_whitespace() { ' ' } else { c })
                    .collect();
                (!value.is_empty()).then_some(ParamValue::Str(value))
            }
            ParamValue::Float(value) if !value.is_finite() => None,
            ParamValue::List(items) => {
                let mut flat = Vec::with_capacity(items.len());
                for item in items {
                    match item.normalized() {
                        Some(ParamValue::List(inner)) => flat.extend(inner),
                        Some(value) => flat.push(value),
                        None => {}
                    }
                }
                (!flat.is_empty()).then_some(ParamValue::List(flat))
            }
            other => Some(other.clone()),
        }
    }

    fn render_into(&self, out: &mut Vec<String>) {
        match self {
            ParamValue::Bool(value) => out.push(value.to_string()),
            ParamValue::Int(value) => out.push(value.to_string()),
            ParamValue::UInt(value) => out.push(value.to_string()),
            ParamValue::Float(value) => out.push(value.to_string()),
            ParamValue::Str(value) => out.push(value.clone()),
            ParamValue::List(items) => items.iter().for_each(|item| item.render_into(out)),
        }
    }

    /// Rendered scalar strings; one entry per list element.
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.render_into(&mut out);
        out
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

macro_rules! int_param_value {
    ($variant:ident, $wide:ty: $($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::$variant(<$wide>::from(value))
            }
        })*
    };
}

int_param_value!(Int, i64: i32, i64);
int_param_value!(UInt, u64: u32, u64);

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        // usize is at most 64 bits on every supported target.
        ParamValue::UInt(value as u64)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue> + Clone> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        ParamValue::List(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Ordered name/value pairs used for filters and format options.
pub type Filters = IndexMap<String, ParamValue>;

/// Ordered query parameters for one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(IndexMap<String, ParamValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn insert_opt<V: Into<ParamValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Insert only when `key` has no non-empty value yet.
    pub fn insert_default(&mut self, key: &str, value: impl Into<ParamValue>) {
        let present = self
            .0
            .get(key)
            .and_then(ParamValue::normalized)
            .is_some();
        if !present {
            self.insert(key, value);
        }
    }

    /// Insert every entry of a map as `prefix[name]`.
    pub fn insert_nested(&mut self, prefix: &str, entries: &Filters) {
        for (name, value) in entries {
            self.insert(format!("{prefix}[{name}]"), value.clone());
        }
    }

    pub fn extend(&mut self, other: QueryParams) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Rendered pairs in order, lists expanded into repeated keys.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            for rendered in value.render() {
                pairs.push((key.clone(), rendered));
            }
        }
        pairs
    }

    /// Encoded `k=v&k=v` string. Expects normalized input.
    pub fn to_query_string(&self) -> String {
        encode_pairs(&self.pairs())
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Canonical form of `params`; see the module docs.
pub fn normalize(params: &QueryParams) -> QueryParams {
    QueryParams(
        params
            .0
            .iter()
            .filter_map(|(key, value)| value.normalized().map(|value| (key.clone(), value)))
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

/// Per-request information about the end user, used for personalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserParameters {
    pub session_id: Option<u64>,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub segments: Vec<String>,
    pub test_cells: IndexMap<String, String>,
    /// Forwarded as `X-Forwarded-For`.
    pub user_ip: Option<String>,
    /// Forwarded as `User-Agent`.
    pub user_agent: Option<String>,
}

impl UserParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(mut self, session_id: u64) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn test_cell(mut self, name: impl Into<String>, variant: impl Into<String>) -> Self {
        self.test_cells.insert(name.into(), variant.into());
        self
    }

    pub fn user_ip(mut self, user_ip: impl Into<String>) -> Self {
        self.user_ip = Some(user_ip.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Flatten into the service's query names: `i`, `s`, `ui`, `us`, `ef-*`.
    pub fn apply_to(&self, params: &mut QueryParams) {
        params.insert_opt("i", self.client_id.as_deref());
        params.insert_opt("s", self.session_id);
        params.insert_opt("ui", self.user_id.as_deref());
        params.insert("us", self.segments.clone());
        for (name, variant) in &self.test_cells {
            params.insert(format!("ef-{name}"), variant.as_str());
        }
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(ip) = self.user_ip.as_deref().filter(|ip| !ip.is_empty()) {
            headers.push(("X-Forwarded-For".to_string(), ip.to_string()));
        }
        if let Some(agent) = self.user_agent.as_deref().filter(|agent| !agent.is_empty()) {
            headers.push(("User-Agent".to_string(), agent.to_string()));
        }
        headers
    }
}

/// Pagination, filtering and sorting shared by search and browse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingParameters {
    pub page: Option<u32>,
    pub results_per_page: Option<u32>,
    pub filters: Filters,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub section: Option<String>,
    pub fmt_options: Filters,
    pub hidden_fields: Vec<String>,
    pub hidden_facets: Vec<String>,
    pub variations_map: Option<serde_json::Value>,
}

impl ListingParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = Some(results_per_page);
        self
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(sort_order);
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn fmt_option(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.fmt_options.insert(name.into(), value.into());
        self
    }

    pub fn hidden_field(mut self, field: impl Into<String>) -> Self {
        self.hidden_fields.push(field.into());
        self
    }

    pub fn apply_to(&self, params: &mut QueryParams) -> crate::Result<()> {
        params.insert_opt("page", self.page);
        params.insert_opt("num_results_per_page", self.results_per_page);
        params.insert_nested("filters", &self.filters);
        params.insert_opt("sort_by", self.sort_by.as_deref());
        params.insert_opt("sort_order", self.sort_order.map(|order| order.as_str()));
        params.insert_opt("section", self.section.as_deref());
        params.insert_nested("fmt_options", &self.fmt_options);
        params.insert("hidden_fields", self.hidden_fields.clone());
        params.insert("hidden_facets", self.hidden_facets.clone());
        insert_json(params, "variations_map", self.variations_map.as_ref())?;
        Ok(())
    }
}

/// Insert a JSON value serialized as a compact string.
pub(crate) fn insert_json(
    params: &mut QueryParams,
    key: &str,
    value: Option<&serde_json::Value>,
) -> crate::Result<()> {
    if let Some(value) = value.filter(|value| !value.is_null()) {
        params.insert(key, serde_json::to_string(value)?);
    }
    Ok(())
}
