//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. Operation
//! groups build `HttpRequest` values and translate `HttpResponse` values
//! without touching the network; a `Transport` executes the round-trip in
//! between.
//!
//! Multipart bodies reference their file parts by path. The transport opens
//! them when it streams the body, so catalog uploads are never held in memory
//! by the request value.

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(String),
    Multipart(MultipartForm),
}

impl Body {
    pub fn content_type(&self) -> String {
        match self {
            Body::Json(_) => "application/json".to_string(),
            Body::Multipart(form) => form.content_type(),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by the operation groups' `build_*` methods and handed to a
/// `Transport` exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Base URL, path and encoded query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl HttpRequest {
    /// First header matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// URL without its query string. Safe to log: credentials only ever
    /// travel in the query or in headers.
    pub fn path_for_log(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Where the bytes of a multipart part come from.
#[derive(Debug, Clone, PartialEq)]
pub enum PartSource {
    Text(String),
    Bytes(Vec<u8>),
    /// Streamed from disk when the body is sent.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub source: PartSource,
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            source: PartSource::Text(value.into()),
        }
    }

    pub fn csv(name: impl Into<String>, filename: impl Into<String>, source: PartSource) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some("text/csv".to_string()),
            source,
        }
    }

    fn head(&self, boundary: &str) -> String {
        let mut head = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"",
            self.name
        );
        if let Some(filename) = &self.filename {
            head.push_str(&format!("; filename=\"{filename}\""));
        }
        head.push_str("\r\n");
        if let Some(content_type) = &self.content_type {
            head.push_str(&format!("Content-Type: {content_type}\r\n"));
        }
        head.push_str("\r\n");
        head
    }

    fn reader(&self) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(match &self.source {
            PartSource::Text(text) => Box::new(Cursor::new(text.clone().into_bytes())),
            PartSource::Bytes(bytes) => Box::new(Cursor::new(bytes.clone())),
            PartSource::File(path) => Box::new(File::open(path)?),
        })
    }

    fn len(&self) -> std::io::Result<u64> {
        Ok(match &self.source {
            PartSource::Text(text) => text.len() as u64,
            PartSource::Bytes(bytes) => bytes.len() as u64,
            PartSource::File(path) => std::fs::metadata(path)?.len(),
        })
    }
}

/// A `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartForm {
    pub boundary: String,
    pub parts: Vec<FormPart>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("cnstrc-{}", Uuid::new_v4().simple()),
            parts: Vec::new(),
        }
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn push(&mut self, part: FormPart) {
        self.parts.push(part);
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn closing(&self) -> String {
        format!("--{}--\r\n", self.boundary)
    }

    /// Total encoded size. File parts are measured from their metadata, not
    /// read.
    pub fn content_length(&self) -> std::io::Result<u64> {
        let mut total = self.closing().len() as u64;
        for part in &self.parts {
            total += part.head(&self.boundary).len() as u64 + part.len()? + 2;
        }
        Ok(total)
    }

    /// Streaming reader over the encoded body. File parts are opened here and
    /// read lazily.
    pub fn reader(&self) -> std::io::Result<Box<dyn Read + Send>> {
        let mut reader: Box<dyn Read + Send> = Box::new(std::io::empty());
        for part in &self.parts {
            let head = Cursor::new(part.head(&self.boundary).into_bytes());
            reader = Box::new(
                reader
                    .chain(head)
                    .chain(part.reader()?)
                    .chain(Cursor::new(b"\r\n".to_vec())),
            );
        }
        Ok(Box::new(reader.chain(Cursor::new(self.closing().into_bytes()))))
    }

    /// Reads the whole body into memory. Meant for small forms and tests.
    pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader()?.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
