//! Synchronous client core for the cnstrc search, recommendation and catalog
//! service.
//!
//! # Overview
//! Every call runs the same pipeline: the call's typed parameters are
//! normalized into ordered query parameters, credentials are attached by the
//! auth signer, the request builder assembles an `HttpRequest`, a `Transport`
//! executes it, and the response translator turns the `HttpResponse` into
//! JSON or a typed error.
//!
//! # Design
//! - Host-does-IO: each operation has a pure `build_*` and `parse_*` half.
//!   `Client` also runs both through its `Transport` for convenience.
//! - `Client` owns its `ClientConfig`; there are no process-wide defaults.
//! - Errors are one enum (`Error`) with distinct variants for configuration,
//!   validation, HTTP-level (`ApiError`) and transport failures. Nothing is
//!   retried.
//!
//! ```no_run
//! use cnstrc_core::{Client, ClientConfig, SearchParameters, UserParameters};
//!
//! # fn main() -> cnstrc_core::Result<()> {
//! let client = Client::new(ClientConfig::new("key_abc123"))?;
//! let params = SearchParameters::new().page(2).filter("color", vec!["red", "blue"]);
//! let results = client
//!     .search()
//!     .get_search_results("shoes", &params, &UserParameters::new().session_id(1))?;
//! println!("{}", results["response"]["total_num_results"]);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod operations;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use client::Client;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ClientConfig, ConfigUpdate, DefaultOptions};
pub use error::{ApiError, Error, Result, TransportError, TransportErrorKind};
pub use http::{Body, FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, PartSource};
pub use operations::{
    AutocompleteParameters, BrowseParameters, CatalogFiles, CatalogWriteOptions,
    ItemGroupsQuery, QuizParameters, RecommendationsParameters, RetrieveItemsQuery,
    RetrieveVariationsQuery, SearchParameters, TaskParameters,
};
pub use params::{Filters, ListingParameters, ParamValue, QueryParams, SortOrder, UserParameters};
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
pub use transport::Transport;
