use http::header::{HeaderName, HeaderValue};

use super::*;
use crate::signing::host_from_url;

impl ClientRequestLike for reqwest::Request {
    fn method(&self) -> String {
        self.method().as_str().into()
    }
    fn uri(&self) -> String {
        self.url().path().into()
    }
    fn host(&self) -> Option<String> {
        host_from_url(self.url())
    }
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        self.headers().get(header).cloned()
    }
    fn set_header(&mut self, header: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(header, value);
    }
    fn body_bytes(&mut self) -> Option<Vec<u8>> {
        match self.body() {
            Some(body) => body.as_bytes().map(<[u8]>::to_vec),
            None => Some(Vec::new()),
        }
    }
}

impl ClientRequestLike for reqwest::blocking::Request {
    fn method(&self) -> String {
        self.method().as_str().into()
    }
    fn uri(&self) -> String {
        self.url().path().into()
    }
    fn host(&self) -> Option<String> {
        host_from_url(self.url())
    }
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        self.headers().get(header).cloned()
    }
    fn set_header(&mut self, header: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(header, value);
    }
    fn body_bytes(&mut self) -> Option<Vec<u8>> {
        match self.body_mut() {
            Some(body) => body.buffer().ok().map(<[u8]>::to_vec),
            None => Some(Vec::new()),
        }
    }
}
