use std::fmt;

use chrono::Utc;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use thiserror::Error;
use url::Url;

use crate::algorithm::{Algorithm, UnsupportedAlgorithm};
use crate::canonicalize::{canonicalize, SignatureString};
use crate::digest::compute_digest;
use crate::header::SignedHeaders;

/// Name of the authentication scheme, sent as the prefix of the
/// `Authorization` header.
pub const AUTHN_PROTOCOL: &str = "Rapid7-HMAC-V1";

/// The types of error which may occur whilst signing a request. All of them
/// are raised before any hashing takes place.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SigningError {
    /// The requested algorithm is not on the allow-list.
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] UnsupportedAlgorithm),

    /// The identity or the secret was empty.
    #[error("{0} is required")]
    MissingCredential(&'static str),

    /// The request target has no host to sign.
    #[error("Request has no host")]
    MissingHost,

    /// The request body is a stream and cannot be hashed.
    #[error("Request body cannot be buffered for hashing")]
    UnbufferedBody,
}

/// An identity and the secret shared with the server for it.
#[derive(Clone)]
pub struct Credential {
    identity: String,
    secret: Vec<u8>,
}

impl Credential {
    /// Fails with `MissingCredential` if either half is empty.
    pub fn new(identity: &str, secret: &[u8]) -> Result<Self, SigningError> {
        if identity.is_empty() {
            return Err(SigningError::MissingCredential("Identity"));
        }
        if secret.is_empty() {
            return Err(SigningError::MissingCredential("Secret"));
        }
        Ok(Self {
            identity: identity.into(),
            secret: secret.into(),
        })
    }

    /// The identity the server looks the secret up by.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Everything about a request that goes into its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: String,
    uri: String,
    host: String,
    date: i64,
    body: Vec<u8>,
}

impl RequestDescriptor {
    /// The method is uppercased when signing; everything else is used verbatim.
    pub fn new(
        method: impl Into<String>,
        uri: impl Into<String>,
        host: impl Into<String>,
        date: i64,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            host: host.into(),
            date,
            body: body.into(),
        }
    }

    /// Takes the URI and host from a parsed URL. Only the path is signed;
    /// the query string is not part of the URI.
    pub fn from_url(
        method: &str,
        url: &Url,
        date: i64,
        body: impl Into<Vec<u8>>,
    ) -> Result<Self, SigningError> {
        let host = host_from_url(url).ok_or(SigningError::MissingHost)?;
        Ok(Self::new(method, url.path(), host, date, body))
    }

    /// The HTTP method, as given.
    pub fn method(&self) -> &str {
        &self.method
    }
    /// The request path.
    pub fn uri(&self) -> &str {
        &self.uri
    }
    /// The host, with the port when it is not the scheme default.
    pub fn host(&self) -> &str {
        &self.host
    }
    /// Seconds since the Unix epoch.
    pub fn date(&self) -> i64 {
        self.date
    }
    /// The payload to digest.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Returns the correct `Host` header value for a given URL, in the form `<host>:<port>`.
/// An explicit default port (`:80` for http, `:443` for https) is dropped, as
/// in the `Host` header an HTTP client sends.
pub(crate) fn host_from_url(url: &Url) -> Option<String> {
    url.host_str().map(|host| match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.into(),
    })
}

/// HMAC of the signature string keyed with `secret`, base64 encoded.
pub fn compute_signature(
    algorithm: Algorithm,
    secret: &[u8],
    signature_string: &SignatureString,
) -> String {
    base64::encode(&algorithm.mac(secret, signature_string.as_bytes()))
}

/// Builds the `Authorization` header value:
/// `Rapid7-HMAC-V1-<ALG> <base64(identity:signature)>`.
pub fn authorization_header(algorithm: Algorithm, identity: &str, signature: &str) -> String {
    let token = base64::encode(format!("{}:{}", identity, signature));
    format!("{}-{} {}", AUTHN_PROTOCOL, algorithm.name(), token)
}

/// Credential and algorithm used to sign requests.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    credential: Credential,
    algorithm: Algorithm,
}

impl SigningConfig {
    /// Uses the default algorithm (`SHA256`).
    pub fn new(identity: &str, secret: &[u8]) -> Result<Self, SigningError> {
        Ok(Self::from_credential(Credential::new(identity, secret)?))
    }

    /// Uses the default algorithm (`SHA256`) with an already validated credential.
    pub fn from_credential(credential: Credential) -> Self {
        SigningConfig {
            credential,
            algorithm: Algorithm::default(),
        }
    }

    /// The credential requests are signed with.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }
    /// Shorthand for `credential().identity()`.
    pub fn identity(&self) -> &str {
        self.credential.identity()
    }
    /// The digest and HMAC algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
    /// Set the digest and HMAC algorithm
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> &mut Self {
        self.algorithm = algorithm;
        self
    }
    /// Set the digest and HMAC algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.set_algorithm(algorithm);
        self
    }

    /// Computes the `Digest`, `Date` and `Authorization` headers for a request.
    pub fn sign_request(&self, request: &RequestDescriptor) -> SignedHeaders {
        let algorithm = self.algorithm;
        let identity = self.credential.identity();

        let digest = compute_digest(algorithm, request.body());
        let signature_string = canonicalize(
            request.method(),
            request.uri(),
            request.host(),
            request.date(),
            identity,
            &digest,
        );
        let signature = compute_signature(algorithm, self.credential.secret(), &signature_string);
        let authorization = authorization_header(algorithm, identity, &signature);

        SignedHeaders {
            digest,
            date: request.date(),
            signature,
            authorization,
        }
    }
}

/// Implemented by request types which can be signed.
pub trait ClientRequestLike {
    /// The HTTP method, in any case.
    fn method(&self) -> String;
    /// The request path, without query string.
    fn uri(&self) -> String;
    /// The value to sign as the host, usually that of the `Host` header.
    fn host(&self) -> Option<String>;
    /// Returns an existing header on the request. This must reflect changes
    /// made by `set_header`.
    fn header(&self, header: &HeaderName) -> Option<HeaderValue>;
    /// Adds or replaces a header.
    fn set_header(&mut self, header: HeaderName, value: HeaderValue);
    /// Returns the body to hash, or `None` if the body is a stream.
    /// Requests without a body return an empty buffer.
    fn body_bytes(&mut self) -> Option<Vec<u8>>;
}

/// Extension methods for signing a request in place.
pub trait SigningExt: Sized {
    /// Signs the request with the current time and returns it.
    fn signed(mut self, config: &SigningConfig) -> Result<Self, SigningError> {
        self.sign(config)?;
        Ok(self)
    }

    /// Signs the request with the current time as its date.
    fn sign(&mut self, config: &SigningConfig) -> Result<SignedHeaders, SigningError> {
        self.sign_at(config, Utc::now().timestamp())
    }

    /// Signs the request with an explicit date, in seconds since the epoch.
    /// Returns the headers that were attached.
    fn sign_at(
        &mut self,
        config: &SigningConfig,
        date: i64,
    ) -> Result<SignedHeaders, SigningError>;
}

impl<R: ClientRequestLike> SigningExt for R {
    fn sign_at(
        &mut self,
        config: &SigningConfig,
        date: i64,
    ) -> Result<SignedHeaders, SigningError> {
        let host = self.host().ok_or(SigningError::MissingHost)?;
        let body = self.body_bytes().ok_or(SigningError::UnbufferedBody)?;
        let request = RequestDescriptor::new(self.method(), self.uri(), host, date, body);

        let signed = config.sign_request(&request);

        // Computed values replace anything the caller set
        for (name, value) in signed.iter() {
            if name != AUTHORIZATION {
                if let Some(existing) = self.header(&name).filter(|existing| *existing != value) {
                    warn!(
                        "Replacing {} header {:?} with computed value {:?}",
                        name, existing, value
                    );
                }
            }
            self.set_header(name, value);
        }

        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use http::header::DATE;
    use http::Method;

    use super::*;
    use crate::header::digest_header;
    use crate::mock_request::MockRequest;

    const SIGNATURE: &str = "AVzJqUvlo0xHUjNWsw9WxOyVUfto3QaO//nO3i+Uipk=";
    const AUTHORIZATION_VALUE: &str =
        "Rapid7-HMAC-V1-SHA256 YWxpY2U6QVZ6SnFVdmxvMHhIVWpOV3N3OVd4T3lWVWZ0bzNRYU8vL25PM2krVWlwaz0=";

    fn config() -> SigningConfig {
        SigningConfig::new("alice", b"s3cr3t").unwrap()
    }

    fn descriptor(method: &str) -> RequestDescriptor {
        RequestDescriptor::new(method, "/v1/resource", "api.example.com", 1_000_000_000, "{}")
    }

    #[test]
    fn end_to_end_sha256() {
        let headers = config().sign_request(&descriptor("GET"));

        assert_eq!(
            headers.digest(),
            "SHA256=RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o="
        );
        assert_eq!(headers.date(), 1_000_000_000);
        assert_eq!(headers.authorization(), AUTHORIZATION_VALUE);
    }

    #[test]
    fn end_to_end_sha512() {
        let headers = config()
            .with_algorithm(Algorithm::Sha512)
            .sign_request(&descriptor("GET"));

        assert_eq!(
            headers.digest(),
            "SHA512=J8dGcK23UHX60FjVzq97IMTneGyDuuijL2Jvl4KvNMmjPCBG72D9Knh403jin+yFGAa72aZ4ePOp8c2kgwdj/Q=="
        );
        assert_eq!(
            headers.authorization(),
            "Rapid7-HMAC-V1-SHA512 YWxpY2U6RlVYT1pqUFpIdjErNHphVHZFc0dud1poTUUramhyTnhtdGdRK1piT1hxdkJxdHRLRU40QWNubEVVdGFRKzNDdTM2eTRoRlcydGg2YVhiY1N3T0hKYnc9PQ=="
        );
    }

    #[test]
    fn lowercase_method_signs_identically() {
        assert_eq!(
            config().sign_request(&descriptor("get")),
            config().sign_request(&descriptor("GET"))
        );
    }

    #[test]
    fn signature_known_answer() {
        let s = canonicalize(
            "GET",
            "/v1/resource",
            "api.example.com",
            1_000_000_000,
            "alice",
            "SHA256=RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o=",
        );
        assert_eq!(compute_signature(Algorithm::Sha256, b"s3cr3t", &s), SIGNATURE);
    }

    #[test]
    fn signature_is_key_and_algorithm_sensitive() {
        let s = canonicalize("GET", "/", "h", 1, "id", "SHA256=x");
        let base = compute_signature(Algorithm::Sha256, b"one", &s);
        assert_eq!(base, compute_signature(Algorithm::Sha256, b"one", &s));
        assert_ne!(base, compute_signature(Algorithm::Sha256, b"two", &s));
        assert_ne!(base, compute_signature(Algorithm::Sha512, b"one", &s));
    }

    #[test]
    fn authorization_header_structure() {
        let header = authorization_header(Algorithm::Sha512, "bob", "c2ln");
        let token = header
            .strip_prefix("Rapid7-HMAC-V1-SHA512 ")
            .expect("protocol prefix");
        assert_eq!(base64::decode(token).unwrap(), b"bob:c2ln");
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(matches!(
            SigningConfig::new("", b"s3cr3t"),
            Err(SigningError::MissingCredential("Identity"))
        ));
        assert!(matches!(
            SigningConfig::new("alice", b""),
            Err(SigningError::MissingCredential("Secret"))
        ));
    }

    #[test]
    fn unsupported_algorithm_converts_into_signing_error() {
        let err: SigningError = "MD5".parse::<Algorithm>().unwrap_err().into();
        assert!(matches!(err, SigningError::UnsupportedAlgorithm(_)));
        assert!(err.to_string().contains("You specified MD5."));
    }

    #[test]
    fn debug_output_hides_secret() {
        let printed = format!("{:?}", config());
        assert!(printed.contains("alice"));
        assert!(!printed.contains("s3cr3t"));
    }

    #[test]
    fn descriptor_from_url() {
        let url: Url = "https://api.example.com:8443/v1/resource?x=1".parse().unwrap();
        let request = RequestDescriptor::from_url("get", &url, 7, "").unwrap();
        assert_eq!(request.uri(), "/v1/resource");
        assert_eq!(request.host(), "api.example.com:8443");

        let url: Url = "https://api.example.com:443/v1/resource".parse().unwrap();
        let request = RequestDescriptor::from_url("GET", &url, 7, "").unwrap();
        assert_eq!(request.host(), "api.example.com");

        let url: Url = "http://api.example.com:443/".parse().unwrap();
        let request = RequestDescriptor::from_url("GET", &url, 7, "").unwrap();
        assert_eq!(request.host(), "api.example.com:443");

        let url: Url = "mailto:someone@example.com".parse().unwrap();
        assert!(matches!(
            RequestDescriptor::from_url("GET", &url, 7, ""),
            Err(SigningError::MissingHost)
        ));
    }

    #[test]
    fn sign_mock_request() {
        let mut req = MockRequest::new(Method::GET, "http://api.example.com/v1/resource")
            .with_body(b"{}".to_vec());
        let signed = req.sign_at(&config(), 1_000_000_000).unwrap();

        assert_eq!(signed.signature(), SIGNATURE);
        assert_eq!(req.header(&AUTHORIZATION).unwrap(), AUTHORIZATION_VALUE);
        assert_eq!(req.header(&DATE).unwrap(), "1000000000");
        assert_eq!(
            req.header(&digest_header()).unwrap(),
            "SHA256=RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o="
        );
    }

    #[test]
    fn computed_headers_replace_supplied_ones() {
        let req = MockRequest::new(Method::GET, "http://api.example.com/v1/resource")
            .with_header("Date", "Sun, 05 Jan 2014 21:31:40 GMT")
            .with_header("Digest", "SHA256=bogus")
            .with_body(b"{}".to_vec());
        let req = req.signed(&config()).unwrap();

        assert_ne!(req.header(&DATE).unwrap(), "Sun, 05 Jan 2014 21:31:40 GMT");
        assert_eq!(
            req.header(&digest_header()).unwrap(),
            "SHA256=RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o="
        );
    }
}
