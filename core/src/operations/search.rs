//! Search results (`/search/{query}`).
//!
//! A response carries either `results` or a `redirect`, and both are well
//! formed.

use serde_json::Value;

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::{ListingParameters, QueryParams, UserParameters};
use crate::response::{translate_shape, ResponseShape};
use crate::Client;

const OPERATION: &str = "get_search_results";

pub type SearchParameters = ListingParameters;

pub struct Search<'a> {
    client: &'a Client,
}

impl<'a> Search<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn build_search_results(
        &self,
        query: &str,
        parameters: &SearchParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        parameters.apply_to(&mut params)?;
        self.client.default_results_per_page(&mut params);
        self.client.default_section(&mut params);
        user.apply_to(&mut params);

        let builder = self
            .client
            .service_request(HttpMethod::Get, "/search/{query}")
            .path_text("query", query)
            .query(params)
            .headers(user.headers())
            .timestamp(self.client.cache_buster());
        self.client.finish(builder)
    }

    /// A search either returns `response.results` or, for terms the
    /// merchandiser redirected, `response.redirect`.
    pub fn parse_search_results(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(response, OPERATION, ResponseShape::ResultsOrRedirect)
    }

    pub fn get_search_results(
        &self,
        query: &str,
        parameters: &SearchParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_search_results(query, parameters, user)?;
        self.client
            .execute(OPERATION, request, |response| self.parse_search_results(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::operations::testing::{client, config, responding};
    use crate::params::SortOrder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn build_produces_documented_url() {
        let params = SearchParameters::new()
            .page(2)
            .filter("color", vec!["red", "blue"]);
        let req = client()
            .search()
            .build_search_results("shoes", &params, &UserParameters::new())
            .unwrap();
        assert_eq!(
            req.url,
            "https://ac.cnstrc.com/search/shoes?page=2\
             &filters%5Bcolor%5D=red&filters%5Bcolor%5D=blue\
             &key=k1&c=test&_dt=1700000000000"
        );
    }

    #[test]
    fn build_with_everything() {
        let params = SearchParameters::new()
            .results_per_page(10)
            .sort("price", SortOrder::Ascending)
            .section("Products")
            .hidden_field("margin");
        let user = UserParameters::new()
            .user_id("u 1")
            .segment("a")
            .segment("b")
            .test_cell("ranking", "v2")
            .user_ip("10.0.0.1");
        let req = client()
            .search()
            .build_search_results("peanut butter", &params, &user)
            .unwrap();
        assert_eq!(
            req.url,
            "https://ac.cnstrc.com/search/peanut%20butter?num_results_per_page=10\
             &sort_by=price&sort_order=ascending&section=Products&hidden_fields=margin\
             &ui=u+1&us=a&us=b&ef-ranking=v2&key=k1&c=test&_dt=1700000000000"
        );
        assert_eq!(req.header("x-forwarded-for"), Some("10.0.0.1"));
    }

    #[test]
    fn slash_in_query_is_kept_and_large_session_ids_stay_unsigned() {
        let user = UserParameters::new().session_id(u64::MAX);
        let req = client()
            .search()
            .build_search_results("ac/dc", &SearchParameters::new(), &user)
            .unwrap();
        assert_eq!(
            req.url,
            "https://ac.cnstrc.com/search/ac/dc?s=18446744073709551615\
             &key=k1&c=test&_dt=1700000000000"
        );
    }

    #[test]
    fn security_token_travels_in_query_and_header() {
        let client = responding(config().with_security_token("sec"), 200, "{}");
        let req = client
            .search()
            .build_search_results("shoes", &SearchParameters::new(), &UserParameters::new())
            .unwrap();
        assert!(req.url.contains("&key=k1&x-cnstrc-token=sec&c=test"));
        assert_eq!(req.header("x-cnstrc-token"), Some("sec"));
    }

    #[test]
    fn redirects_are_accepted() {
        let client = responding(
            config(),
            200,
            r#"{"response":{"redirect":{"data":{"url":"/sale"}}}}"#,
        );
        let value = client
            .search()
            .get_search_results("sale", &SearchParameters::new(), &UserParameters::new())
            .unwrap();
        assert_eq!(value["response"]["redirect"]["data"]["url"], json!("/sale"));
    }

    #[test]
    fn body_without_response_is_malformed() {
        let client = responding(config(), 200, r#"{"results":[]}"#);
        let err = client
            .search()
            .get_search_results("shoes", &SearchParameters::new(), &UserParameters::new())
            .unwrap_err();
        assert!(matches!(err, Error::Api(api) if api.message == "get_search_results response data is malformed"));
    }
}
