//! Browse by filter, by item ids, plus the group and facet listings.
//!
//! Only the results endpoints are cache-busted. Groups, facets and facet
//! options are stable listings and go out without `_dt`.

use serde_json::Value;

use super::{require, require_ids};
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::{ListingParameters, QueryParams, UserParameters};
use crate::request::RequestBuilder;
use crate::response::{translate_shape, ResponseShape};
use crate::Client;

pub type BrowseParameters = ListingParameters;

/// Listing by filter, by item ids, and browse metadata (groups and facets).
///
/// Results listings are cache-busted; the metadata endpoints are not.
pub struct Browse<'a> {
    client: &'a Client,
}

impl<'a> Browse<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn params(&self, parameters: &BrowseParameters) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        parameters.apply_to(&mut params)?;
        self.client.default_results_per_page(&mut params);
        self.client.default_section(&mut params);
        Ok(params)
    }

    fn finish(
        &self,
        builder: RequestBuilder,
        mut params: QueryParams,
        user: &UserParameters,
        cache_busted: bool,
    ) -> Result<HttpRequest> {
        user.apply_to(&mut params);
        let timestamp = if cache_busted {
            self.client.cache_buster()
        } else {
            None
        };
        let builder = builder
            .query(params)
            .headers(user.headers())
            .timestamp(timestamp);
        self.client.finish(builder)
    }

    pub fn build_browse_results(
        &self,
        filter_name: &str,
        filter_value: &str,
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        let builder = self
            .client
            .service_request(HttpMethod::Get, "/browse/{filter_name}/{filter_value}")
            .path_param("filter_name", filter_name)
            .path_param("filter_value", filter_value);
        self.finish(builder, self.params(parameters)?, user, true)
    }

    pub fn parse_browse_results(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(response, "get_browse_results", ResponseShape::Results)
    }

    pub fn get_browse_results(
        &self,
        filter_name: &str,
        filter_value: &str,
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_browse_results(filter_name, filter_value, parameters, user)?;
        self.client.execute("get_browse_results", request, |response| {
            self.parse_browse_results(response)
        })
    }

    pub fn build_browse_results_for_item_ids<S: AsRef<str>>(
        &self,
        item_ids: &[S],
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        let ids = require_ids("item_ids", item_ids)?;
        let mut params = QueryParams::new();
        params.insert("ids", ids);
        params.extend(self.params(parameters)?);

        let builder = self
            .client
            .service_request(HttpMethod::Get, "/browse/items");
        self.finish(builder, params, user, true)
    }

    pub fn parse_browse_results_for_item_ids(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(
            response,
            "get_browse_results_for_item_ids",
            ResponseShape::Results,
        )
    }

    pub fn get_browse_results_for_item_ids<S: AsRef<str>>(
        &self,
        item_ids: &[S],
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_browse_results_for_item_ids(item_ids, parameters, user)?;
        self.client
            .execute("get_browse_results_for_item_ids", request, |response| {
                self.parse_browse_results_for_item_ids(response)
            })
    }

    pub fn build_browse_groups(
        &self,
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        let builder = self
            .client
            .service_request(HttpMethod::Get, "/browse/groups");
        self.finish(builder, self.params(parameters)?, user, false)
    }

    pub fn parse_browse_groups(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(
            response,
            "get_browse_groups",
            ResponseShape::ResponseList("groups"),
        )
    }

    pub fn get_browse_groups(
        &self,
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_browse_groups(parameters, user)?;
        self.client.execute("get_browse_groups", request, |response| {
            self.parse_browse_groups(response)
        })
    }

    pub fn build_browse_facets(
        &self,
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        let builder = self
            .client
            .service_request(HttpMethod::Get, "/browse/facets");
        self.finish(builder, self.params(parameters)?, user, false)
    }

    pub fn parse_browse_facets(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(
            response,
            "get_browse_facets",
            ResponseShape::ResponseList("facets"),
        )
    }

    pub fn get_browse_facets(
        &self,
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_browse_facets(parameters, user)?;
        self.client.execute("get_browse_facets", request, |response| {
            self.parse_browse_facets(response)
        })
    }

    pub fn build_browse_facet_options(
        &self,
        facet_name: &str,
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        require("facet_name", facet_name)?;
        let mut params = self.params(parameters)?;
        params.insert("facet_name", facet_name);

        let builder = self
            .client
            .service_request(HttpMethod::Get, "/browse/facet_options");
        self.finish(builder, params, user, false)
    }

    pub fn parse_browse_facet_options(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(
            response,
            "get_browse_facet_options",
            ResponseShape::ResponseList("facets"),
        )
    }

    pub fn get_browse_facet_options(
        &self,
        facet_name: &str,
        parameters: &BrowseParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_browse_facet_options(facet_name, parameters, user)?;
        self.client
            .execute("get_browse_facet_options", request, |response| {
                self.parse_browse_facet_options(response)
            })
    }
}
