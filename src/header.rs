use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, DATE};

/// Name of the `Digest` header, which the `http` crate does not define.
pub fn digest_header() -> HeaderName {
    HeaderName::from_static("digest")
}

/// The three header values produced by signing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub(crate) digest: String,
    pub(crate) date: i64,
    pub(crate) signature: String,
    pub(crate) authorization: String,
}

impl SignedHeaders {
    /// Value of the `Digest` header: `<ALG>=<base64>`.
    pub fn digest(&self) -> &str {
        &self.digest
    }
    /// Value of the `Date` header, in seconds since the Unix epoch.
    pub fn date(&self) -> i64 {
        self.date
    }
    /// The base64 HMAC carried inside the `Authorization` header.
    pub fn signature(&self) -> &str {
        &self.signature
    }
    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Returns the headers in the order `Digest`, `Date`, `Authorization`.
    pub fn iter(&self) -> impl Iterator<Item = (HeaderName, HeaderValue)> {
        vec![
            (
                digest_header(),
                HeaderValue::from_str(&self.digest)
                    .expect("Digest should be valid in a HTTP header"),
            ),
            (DATE, HeaderValue::from(self.date)),
            (
                AUTHORIZATION,
                HeaderValue::from_str(&self.authorization)
                    .expect("Signature scheme should generate a valid header"),
            ),
        ]
        .into_iter()
    }
}

impl From<SignedHeaders> for HeaderMap {
    fn from(other: SignedHeaders) -> Self {
        other.iter().collect()
    }
}
