//! Pluggable HTTP execution.
//!
//! The client never talks to the network itself. It hands each `HttpRequest`
//! to a `Transport` and translates whatever `HttpResponse` comes back. Bring
//! your own implementation (any closure with the right signature works), or
//! enable the default `ureq-transport` feature for `UreqTransport`.
//!
//! A transport returns non-2xx responses as data. `TransportError` is
//! reserved for requests that never got a response.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(feature = "ureq-transport")]
pub use self::ureq_impl::UreqTransport;

#[cfg(feature = "ureq-transport")]
mod ureq_impl {
    use std::time::Duration;

    use ureq::typestate::{WithBody, WithoutBody};
    use ureq::RequestBuilder;

    use super::Transport;
    use crate::error::{TransportError, TransportErrorKind};
    use crate::http::{Body, HttpMethod, HttpRequest, HttpResponse};

    type UreqResult = Result<ureq::http::Response<ureq::Body>, ureq::Error>;

    /// Blocking transport built on a shared `ureq::Agent`.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new(None)
        }
    }

    impl UreqTransport {
        pub fn new(timeout: Option<Duration>) -> Self {
            // Status codes are the translator's business, not the transport's.
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent }
        }

        pub fn with_agent(agent: ureq::Agent) -> Self {
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let result = match method {
                HttpMethod::Get => without_body(self.agent.get(&url), &headers, body),
                HttpMethod::Delete => without_body(self.agent.delete(&url), &headers, body),
                HttpMethod::Post => with_body(with_headers(self.agent.post(&url), &headers), body),
                HttpMethod::Put => with_body(with_headers(self.agent.put(&url), &headers), body),
                HttpMethod::Patch => {
                    with_body(with_headers(self.agent.patch(&url), &headers), body)
                }
            };
            into_response(result?.map_err(map_error)?)
        }
    }

    fn with_headers<B>(
        mut builder: RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn without_body(
        builder: RequestBuilder<WithoutBody>,
        headers: &[(String, String)],
        body: Option<Body>,
    ) -> Result<UreqResult, TransportError> {
        let builder = with_headers(builder, headers);
        match body {
            None => Ok(builder.call()),
            Some(body) => with_body(builder.force_send_body(), Some(body)),
        }
    }

    fn with_body(
        builder: RequestBuilder<WithBody>,
        body: Option<Body>,
    ) -> Result<UreqResult, TransportError> {
        Ok(match body {
            None => builder.send_empty(),
            Some(Body::Json(json)) => builder.send(json.as_bytes()),
            Some(Body::Multipart(form)) => {
                // A known length keeps the upload out of chunked encoding.
                let length = form.content_length()?;
                let mut reader = form.reader()?;
                builder
                    .header("content-length", length.to_string())
                    .send(ureq::SendBody::from_reader(&mut reader))
            }
        })
    }

    fn into_response(
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<HttpResponse, TransportError> {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(map_error)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }

    fn map_error(err: ureq::Error) -> TransportError {
        match err {
            ureq::Error::Io(err) => err.into(),
            ureq::Error::Timeout(_) => {
                TransportError::new(TransportErrorKind::Timeout, err.to_string())
            }
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                TransportError::new(TransportErrorKind::Connect, err.to_string())
            }
            other => TransportError::new(TransportErrorKind::Other, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn closures_are_transports() {
        let transport = |request: HttpRequest| {
            assert_eq!(request.method, HttpMethod::Get);
            Ok::<_, TransportError>(HttpResponse::new(200, "{}"))
        };
        let response = transport
            .send(HttpRequest {
                method: HttpMethod::Get,
                url: "http://localhost/".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[cfg(feature = "ureq-transport")]
    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let transport = UreqTransport::new(Some(std::time::Duration::from_secs(2)));
        let result = transport.send(HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/search/x".to_string(),
            headers: Vec::new(),
            body: None,
        });
        assert!(result.is_err());
    }
}
