//! # HTTP request builder
//!
//! Renders minimal HTTP/1.1 requests, which ask the server to close the connection after responding.
//!
//! ````
//! use esp8266_at::http::{Method, Request};
//!
//! let request = Request::new(Method::Get, "example.com", "/index.html");
//! let text = request.render::<128>().unwrap();
//! assert_eq!("GET /index.html HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n", text.as_str());
//! ````
use core::fmt::Write;
use heapless::String;

/// Request method
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Errors when rendering a request
#[derive(Clone, Debug, PartialEq)]
pub enum HttpError {
    /// Rendered request does not fit into the given capacity
    RequestTooLong,
}

#[cfg(feature = "defmt")]
impl defmt::Format for HttpError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            HttpError::RequestTooLong => defmt::write!(f, "HttpError::RequestTooLong"),
        }
    }
}

/// HTTP/1.1 request without body
#[derive(Copy, Clone, Debug)]
pub struct Request<'a> {
    method: Method,
    host: &'a str,
    uri: &'a str,
}

impl<'a> Request<'a> {
    pub fn new(method: Method, host: &'a str, uri: &'a str) -> Self {
        Self { method, host, uri }
    }

    /// Renders the request text
    pub fn render<const N: usize>(&self) -> Result<String<N>, HttpError> {
        let mut text = String::new();
        write!(
            text,
            "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.method.as_str(),
            self.uri,
            self.host
        )
        .map_err(|_| HttpError::RequestTooLong)?;

        Ok(text)
    }
}
