//! Recommendation pods (`/recommendations/v1/pods/{pod_id}`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::{Filters, ParamValue, QueryParams, UserParameters};
use crate::response::{translate_shape, ResponseShape};
use crate::Client;

const OPERATION: &str = "get_recommendation_results";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationsParameters {
    pub num_results: Option<u32>,
    /// Seed items, sent as repeated `item_id`.
    pub item_ids: Vec<String>,
    /// Seed search term for query-based pods.
    pub term: Option<String>,
    pub filters: Filters,
    pub section: Option<String>,
}

impl RecommendationsParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_results(mut self, num_results: u32) -> Self {
        self.num_results = Some(num_results);
        self
    }

    pub fn item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_ids.push(item_id.into());
        self
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    fn apply_to(&self, params: &mut QueryParams) {
        params.insert_opt("num_results", self.num_results);
        params.insert("item_id", self.item_ids.clone());
        params.insert_opt("term", self.term.as_deref());
        params.insert_nested("filters", &self.filters);
        params.insert_opt("section", self.section.as_deref());
    }
}

pub struct Recommendations<'a> {
    client: &'a Client,
}

impl<'a> Recommendations<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn build_recommendation_results(
        &self,
        pod_id: &str,
        parameters: &RecommendationsParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        parameters.apply_to(&mut params);
        self.client.default_section(&mut params);
        user.apply_to(&mut params);

        let builder = self
            .client
            .service_request(HttpMethod::Get, "/recommendations/v1/pods/{pod_id}")
            .path_param("pod_id", pod_id)
            .query(params)
            .headers(user.headers())
            .timestamp(self.client.cache_buster());
        self.client.finish(builder)
    }

    pub fn parse_recommendation_results(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(response, OPERATION, ResponseShape::Results)
    }

    pub fn get_recommendation_results(
        &self,
        pod_id: &str,
        parameters: &RecommendationsParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_recommendation_results(pod_id, parameters, user)?;
        self.client.execute(OPERATION, request, |response| {
            self.parse_recommendation_results(response)
        })
    }
}
