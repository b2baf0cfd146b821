//! Autocomplete suggestions (`/autocomplete/{query}`).
//!
//! Results come back grouped under `sections`. Per-section sizes travel as
//! `num_results_<section>` and section filters as `filters[<section>][...]`.
//!
//! # Design
//!
//! The query term is free text, not an identifier, so `/` in it is sent
//! unescaped (`ac/dc` stays `ac/dc`). Spaces still become `%20`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::{insert_json, Filters, ParamValue, QueryParams, UserParameters};
use crate::response::{translate_shape, ResponseShape};
use crate::Client;

const OPERATION: &str = "get_autocomplete_results";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutocompleteParameters {
    /// Total number of results across all sections.
    pub num_results: Option<u32>,
    /// Section name to result count, sent as `num_results_<section>`.
    pub results_per_section: IndexMap<String, u32>,
    pub filters: Filters,
    pub hidden_fields: Vec<String>,
    pub variations_map: Option<Value>,
}

impl AutocompleteParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_results(mut self, num_results: u32) -> Self {
        self.num_results = Some(num_results);
        self
    }

    pub fn results_per_section(mut self, section: impl Into<String>, count: u32) -> Self {
        self.results_per_section.insert(section.into(), count);
        self
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn hidden_field(mut self, field: impl Into<String>) -> Self {
        self.hidden_fields.push(field.into());
        self
    }

    pub fn variations_map(mut self, variations_map: Value) -> Self {
        self.variations_map = Some(variations_map);
        self
    }

    fn apply_to(&self, params: &mut QueryParams) -> Result<()> {
        params.insert_opt("num_results", self.num_results);
        for (section, count) in &self.results_per_section {
            params.insert(format!("num_results_{section}"), *count);
        }
        params.insert_nested("filters", &self.filters);
        params.insert("hidden_fields", self.hidden_fields.clone());
        insert_json(params, "variations_map", self.variations_map.as_ref())
    }
}

/// Suggestions grouped by section for a partially typed query.
pub struct Autocomplete<'a> {
    client: &'a Client,
}

impl<'a> Autocomplete<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn build_autocomplete_results(
        &self,
        query: &str,
        parameters: &AutocompleteParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        parameters.apply_to(&mut params)?;
        user.apply_to(&mut params);

        let builder = self
            .client
            .service_request(HttpMethod::Get, "/autocomplete/{query}")
            .path_text("query", query)
            .query(params)
            .headers(user.headers())
            .timestamp(self.client.cache_buster());
        self.client.finish(builder)
    }

    /// Requires a `sections` object; `result_id` is copied into every item.
    pub fn parse_autocomplete_results(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(response, OPERATION, ResponseShape::Sections)
    }

    pub fn get_autocomplete_results(
        &self,
        query: &str,
        parameters: &AutocompleteParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_autocomplete_results(query, parameters, user)?;
        self.client
            .execute(OPERATION, request, |response| {
                self.parse_autocomplete_results(response)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::operations::testing::{client, config, responding};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn build_maps_sections_and_user_fields() {
        let params = AutocompleteParameters::new()
            .num_results(20)
            .results_per_section("Products", 6)
            .results_per_section("Search Suggestions", 8)
            .filter("group_id", "shoes")
            .hidden_field("price_US");
        let user = UserParameters::new().session_id(4).client_id("c-1").user_agent("ua/2");

        let req = client()
            .autocomplete()
            .build_autocomplete_results("red sh", &params, &user)
            .unwrap();

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://ac.cnstrc.com/autocomplete/red%20sh?num_results=20\
             &num_results_Products=6&num_results_Search+Suggestions=8\
             &filters%5Bgroup_id%5D=shoes&hidden_fields=price_US\
             &i=c-1&s=4&key=k1&c=test&_dt=1700000000000"
        );
        assert_eq!(req.header("user-agent"), Some("ua/2"));
    }

    #[test]
    fn variations_map_is_json_encoded() {
        let params = AutocompleteParameters::new()
            .variations_map(json!({"dtype": "array", "values": {}}));
        let req = client()
            .autocomplete()
            .build_autocomplete_results("shoe", &params, &UserParameters::new())
            .unwrap();
        assert!(req
            .url
            .contains("variations_map=%7B%22dtype%22%3A%22array%22%2C%22values%22%3A%7B%7D%7D"));
    }

    #[test]
    fn empty_query_is_rejected() {
        let err = client()
            .autocomplete()
            .build_autocomplete_results("", &AutocompleteParameters::new(), &UserParameters::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "query is a required parameter"));
    }

    #[test]
    fn results_are_tagged_with_result_id() {
        let client = responding(
            config(),
            200,
            r#"{"result_id":"r-9","sections":{"Products":[{"value":"shoe"}]}}"#,
        );
        let value = client
            .autocomplete()
            .get_autocomplete_results("sho", &AutocompleteParameters::new(), &UserParameters::new())
            .unwrap();
        assert_eq!(value["sections"]["Products"][0]["result_id"], "r-9");
    }

    #[test]
    fn missing_sections_is_malformed() {
        let client = responding(config(), 200, r#"{"result_id":"r-9"}"#);
        let err = client
            .autocomplete()
            .get_autocomplete_results("sho", &AutocompleteParameters::new(), &UserParameters::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP 200: get_autocomplete_results response data is malformed"
        );
    }
}
