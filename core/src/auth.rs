//! Credential injection.
//!
//! `sign` derives the query parameters and headers that authenticate a
//! request from the client configuration. It returns a fresh fragment that the
//! request builder appends after the call's own parameters.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

pub const API_KEY_PARAM: &str = "key";
pub const SECURITY_TOKEN_NAME: &str = "x-cnstrc-token";
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Auth-derived query parameters and headers for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFragment {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

pub fn sign(config: &ClientConfig) -> Result<AuthFragment> {
    let api_key = non_blank(config.api_key.as_deref());
    let api_token = non_blank(config.api_token.as_deref());
    if api_key.is_none() && api_token.is_none() {
        return Err(Error::Configuration(
            "an API key or an API token is required".to_string(),
        ));
    }

    let mut fragment = AuthFragment::default();
    if let Some(key) = api_key {
        fragment.query.push((API_KEY_PARAM.to_string(), key.to_string()));
    }
    if let Some(token) = non_blank(config.security_token.as_deref()) {
        fragment
            .query
            .push((SECURITY_TOKEN_NAME.to_string(), token.to_string()));
        fragment
            .headers
            .push((SECURITY_TOKEN_NAME.to_string(), token.to_string()));
    }
    if let Some(token) = api_token {
        fragment
            .headers
            .push((AUTHORIZATION_HEADER.to_string(), basic_auth(token)));
    }
    Ok(fragment)
}

/// The API token is the username; the password is empty.
fn basic_auth(token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{token}:")))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
