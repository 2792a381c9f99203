use std::collections::HashMap;
use std::error::Error;
use std::io::Write;

use http::{header::HeaderName, HeaderValue, Method};
use url::Url;

use crate::signing::host_from_url;
use crate::ClientRequestLike;

/// A mock request type
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    method: Method,
    path: String,
    host: Option<String>,
    headers: HashMap<HeaderName, HeaderValue>,
    body: Option<Vec<u8>>,
}

impl MockRequest {
    /// Returns the path (including any query string) used by this mock request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Constructs a new mock request. Panics if `url` is not a valid URL.
    pub fn new(method: Method, url: &str) -> Self {
        let url: Url = url.parse().unwrap();

        let path = if let Some(query) = url.query() {
            format!("{}?{}", url.path(), query)
        } else {
            url.path().into()
        };
        let host = host_from_url(&url);
        let mut res = Self {
            method,
            path,
            host: host.clone(),
            headers: Default::default(),
            body: None,
        };
        if let Some(host) = host {
            res = res.with_header("Host", &host)
        }
        res
    }
    /// Convenience method for setting a header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_bytes(value.as_bytes()).unwrap(),
        );
        self
    }
    /// Method for setting a request body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        let l = body.len();
        self.body = Some(body);
        self.with_header("Content-Length", &l.to_string())
    }

    /// Write out this HTTP request in standard format
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), Box<dyn Error>> {
        writeln!(writer, "{} {} HTTP/1.1", self.method.as_str(), self.path)?;
        let mut headers: Vec<_> = self.headers.iter().collect();
        headers.sort_by_key(|(name, _)| name.as_str());
        for (header_name, header_value) in headers {
            writeln!(
                writer,
                "{}: {}",
                header_name.as_str(),
                header_value.to_str()?
            )?;
        }

        if let Some(body) = &self.body {
            writeln!(writer)?;
            writer.write_all(body)?;
        }

        Ok(())
    }
}

impl ClientRequestLike for MockRequest {
    fn method(&self) -> String {
        self.method.as_str().into()
    }
    fn uri(&self) -> String {
        self.path
            .split('?')
            .next()
            .unwrap_or_default()
            .to_owned()
    }
    fn host(&self) -> Option<String> {
        self.host.clone()
    }
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        self.headers.get(header).cloned()
    }
    fn set_header(&mut self, header: HeaderName, value: HeaderValue) {
        self.headers.insert(header, value);
    }
    fn body_bytes(&mut self) -> Option<Vec<u8>> {
        Some(self.body.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{SigningConfig, SigningExt};

    #[test]
    fn query_is_not_part_of_uri() {
        let req = MockRequest::new(Method::POST, "http://example.com/foo?param=value&pet=dog");
        assert_eq!(req.path(), "/foo?param=value&pet=dog");
        assert_eq!(ClientRequestLike::uri(&req), "/foo");
        assert_eq!(ClientRequestLike::host(&req).as_deref(), Some("example.com"));
    }

    #[test]
    fn missing_body_hashes_as_empty() {
        let mut req = MockRequest::new(Method::GET, "http://example.com/");
        assert_eq!(req.body_bytes(), Some(Vec::new()));
    }

    #[test]
    fn writes_signed_request() {
        let config = SigningConfig::new("test_key", b"abcdefgh").unwrap();
        let mut req = MockRequest::new(Method::POST, "http://test.com/foo/bar")
            .with_body(br#"{ "x": 1, "y": 2}"#.to_vec());
        req.sign_at(&config, 1_404_810_611).unwrap();

        let mut out = Vec::new();
        req.write(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "POST /foo/bar HTTP/1.1\n\
             authorization: Rapid7-HMAC-V1-SHA256 dGVzdF9rZXk6VFNmTUllc0dkVzRBSDZoWTlHVGhBaW1YbUpKWUtwRDRtVW9qZ3kwek00bz0=\n\
             content-length: 17\n\
             date: 1404810611\n\
             digest: SHA256=2vgEVkfe4d6VW+tSWAziO7BUx7uT/rA9hn1EoxUJi2o=\n\
             host: test.com\n\
             \n\
             { \"x\": 1, \"y\": 2}"
        );
    }
}
