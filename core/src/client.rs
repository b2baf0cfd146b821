//! The client facade.
//!
//! # Design
//! `Client` owns the configuration, a `Transport` and a `Clock`. Operation
//! groups borrow it and share one pipeline per call:
//!
//! normalize -> sign -> build -> send -> translate
//!
//! Every group exposes `build_*` (pure, produces an `HttpRequest`) and
//! `parse_*` (pure, consumes an `HttpResponse`) next to the method that runs
//! both through the transport, so callers that do their own I/O can skip the
//! transport entirely.
//!
//! Calls allocate their own parameters and requests. The only state shared
//! between calls is the configuration, which changes only through
//! `set_options(&mut self)`.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::auth::sign;
use crate::clock::{Clock, SystemClock};
use crate::config::{ClientConfig, ConfigUpdate};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::operations::{
    Autocomplete, Browse, Catalog, Quizzes, Recommendations, Search, Tasks,
};
use crate::params::QueryParams;
use crate::request::RequestBuilder;
use crate::transport::Transport;

#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("service_url", &self.config.service_url)
            .field("quizzes_service_url", &self.config.quizzes_service_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client over the default `ureq` transport, honoring `timeout_secs`.
    #[cfg(feature = "ureq-transport")]
    pub fn new(config: ClientConfig) -> Result<Self> {
        let timeout = config.timeout_secs.map(std::time::Duration::from_secs);
        Self::with_transport(config, crate::transport::UreqTransport::new(timeout))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn get_options(&self) -> &ClientConfig {
        &self.config
    }

    /// Merge `update` into the current configuration.
    ///
    /// The merged configuration is validated first; on error nothing changes.
    /// The transport is not rebuilt, so a new `timeout_secs` only takes
    /// effect for clients created afterwards.
    pub fn set_options(&mut self, update: ConfigUpdate) -> Result<()> {
        self.config = self.config.merged(update)?;
        Ok(())
    }

    pub fn autocomplete(&self) -> Autocomplete<'_> {
        Autocomplete::new(self)
    }

    pub fn browse(&self) -> Browse<'_> {
        Browse::new(self)
    }

    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(self)
    }

    pub fn quizzes(&self) -> Quizzes<'_> {
        Quizzes::new(self)
    }

    pub fn recommendations(&self) -> Recommendations<'_> {
        Recommendations::new(self)
    }

    pub fn search(&self) -> Search<'_> {
        Search::new(self)
    }

    pub fn tasks(&self) -> Tasks<'_> {
        Tasks::new(self)
    }

    pub(crate) fn service_request(
        &self,
        method: HttpMethod,
        template: &'static str,
    ) -> RequestBuilder {
        RequestBuilder::new(method, self.config.service_base(), template)
    }

    pub(crate) fn quizzes_request(
        &self,
        method: HttpMethod,
        template: &'static str,
    ) -> RequestBuilder {
        RequestBuilder::new(method, self.config.quizzes_base(), template)
    }

    /// `_dt` value for cache-busted endpoints, unless disabled.
    pub(crate) fn cache_buster(&self) -> Option<u64> {
        self.config
            .defaults
            .cache_busting
            .then(|| self.clock.now_millis())
    }

    pub(crate) fn default_section(&self, params: &mut QueryParams) {
        if let Some(section) = &self.config.defaults.section {
            params.insert_default("section", section.as_str());
        }
    }

    pub(crate) fn default_results_per_page(&self, params: &mut QueryParams) {
        if let Some(results_per_page) = self.config.defaults.results_per_page {
            params.insert_default("num_results_per_page", results_per_page);
        }
    }

    /// Sign and assemble the final request.
    pub(crate) fn finish(&self, builder: RequestBuilder) -> Result<HttpRequest> {
        let auth = sign(&self.config)?;
        builder.build(&auth, self.config.client_identifier())
    }

    /// Send `request` and translate the response with `parse`.
    pub(crate) fn execute<T>(
        &self,
        operation: &'static str,
        request: HttpRequest,
        parse: impl FnOnce(&HttpResponse) -> Result<T>,
    ) -> Result<T> {
        let method = request.method;
        let path = request.path_for_log().to_string();
        debug!(operation, %method, %path, "dispatching request");

        let started = Instant::now();
        let response = self.transport.send(request).map_err(|err| {
            warn!(operation, %method, %path, error = %err, "no response received");
            Error::from(err)
        })?;
        debug!(
            operation,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        parse(&response).inspect_err(|err| {
            warn!(operation, status = response.status, error = %err, "request failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::DefaultOptions;
    use crate::error::{TransportError, TransportErrorKind};
    use crate::operations::SearchParameters;
    use crate::params::UserParameters;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn recording_client(
        status: u16,
        body: &'static str,
    ) -> (Client, Arc<Mutex<Vec<HttpRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let transport = move |request: HttpRequest| {
            sink.lock().unwrap().push(request);
            Ok::<_, TransportError>(HttpResponse::new(status, body))
        };
        let client = Client::with_transport(ClientConfig::new("k1"), transport)
            .unwrap()
            .with_clock(FixedClock(1_700_000_000_000));
        (client, seen)
    }

    #[test]
    fn construction_validates_config() {
        let config = ClientConfig::new("k1").with_service_url("ftp://nope");
        let transport =
            |_: HttpRequest| Ok::<_, TransportError>(HttpResponse::new(200, "{}"));
        assert!(matches!(
            Client::with_transport(config, transport),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn set_options_merges_and_keeps_previous_on_error() {
        let (mut client, _) = recording_client(200, "{}");
        client
            .set_options(ConfigUpdate {
                security_token: Some(Some("sec".to_string())),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(client.get_options().security_token.as_deref(), Some("sec"));

        let err = client
            .set_options(ConfigUpdate {
                service_url: Some("not a url".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(client.get_options().service_url, "https://ac.cnstrc.com");
        assert_eq!(client.get_options().security_token.as_deref(), Some("sec"));
    }

    #[test]
    fn search_runs_the_whole_pipeline() {
        let (client, seen) = recording_client(200, r#"{"response":{"results":[]}}"#);
        let params = SearchParameters::new()
            .page(2)
            .filter("color", vec!["red", "blue"]);
        let body = client
            .search()
            .get_search_results("shoes", &params, &UserParameters::new())
            .unwrap();
        assert_eq!(body, serde_json::json!({"response": {"results": []}}));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].url,
            format!(
                "https://ac.cnstrc.com/search/shoes?page=2\
                 &filters%5Bcolor%5D=red&filters%5Bcolor%5D=blue\
                 &key=k1&c={}&_dt=1700000000000",
                crate::config::CLIENT_IDENTIFIER
            )
        );
    }

    #[test]
    fn defaults_fill_unset_fields_only() {
        let (mut client, seen) = recording_client(200, r#"{"response":{"results":[]}}"#);
        client
            .set_options(ConfigUpdate {
                defaults: Some(DefaultOptions {
                    section: Some("Products".to_string()),
                    results_per_page: Some(24),
                    cache_busting: false,
                }),
                ..Default::default()
            })
            .unwrap();

        let params = SearchParameters::new().results_per_page(5);
        client
            .search()
            .get_search_results("shoes", &params, &UserParameters::new())
            .unwrap();

        let url = seen.lock().unwrap()[0].url.clone();
        assert!(url.contains("num_results_per_page=5&section=Products"), "{url}");
        assert!(!url.contains("_dt="), "{url}");
    }

    #[test]
    fn transport_failures_are_not_api_errors() {
        let transport = |_: HttpRequest| {
            Err::<HttpResponse, _>(TransportError::new(TransportErrorKind::Timeout, "timed out"))
        };
        let client = Client::with_transport(ClientConfig::new("k1"), transport).unwrap();
        let err = client
            .search()
            .get_search_results("shoes", &SearchParameters::new(), &UserParameters::new())
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn http_failures_carry_the_status() {
        let (client, _) = recording_client(401, r#"{"message":"Invalid key"}"#);
        let err = client
            .search()
            .get_search_results("shoes", &SearchParameters::new(), &UserParameters::new())
            .unwrap_err();
        match err {
            Error::Api(api) => {
                assert_eq!(api.status, 401);
                assert_eq!(api.message, "Invalid key");
                assert!(api.is_unauthorized());
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[test]
    fn client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }
}
