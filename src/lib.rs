#![deny(missing_docs)]
//! Client-side signing for the `Rapid7-HMAC-V1` HTTP authentication scheme.
//!
//! A signed request carries three headers:
//!
//! - `Digest: <ALG>=<base64(hash(body))>`
//! - `Date: <seconds since the Unix epoch>`
//! - `Authorization: Rapid7-HMAC-V1-<ALG> <base64(identity:signature)>`
//!
//! where the signature is the base64 encoded HMAC, keyed with the caller's
//! secret, of the following five lines:
//!
//! ```text
//! <METHOD> <URI>
//! <HOST>
//! <DATE>
//! <IDENTITY>
//! <DIGEST>
//! ```
//!
//! ## Features
//!
//! | Crate / Feature name                              | Notes                                                |
//! | ------------------------------------------------- | ---------------------------------------------------- |
//! | [reqwest](https://crates.io/crates/reqwest)       | Supports blocking and non-blocking requests.<sup>1</sup> |
//!
//! 1. Streaming request bodies cannot be hashed, and fail to sign with
//!    `SigningError::UnbufferedBody`.
//!
//! ### Supported algorithms:
//!
//! - `SHA256` (default)
//! - `SHA512`
//!
//! ## Example usage
//!
//! ```rust
//! use rapid7_hmac::*;
//!
//! let config = SigningConfig::new("alice", b"s3cr3t")?
//!     .with_algorithm("sha512".parse()?);
//!
//! let request = RequestDescriptor::new("GET", "/v1/resource", "api.example.com", 1_000_000_000, "{}");
//! let headers = config.sign_request(&request);
//!
//! assert!(headers.authorization().starts_with("Rapid7-HMAC-V1-SHA512 "));
//! # Ok::<(), SigningError>(())
//! ```

#[macro_use]
mod macros;

mod algorithm;
pub use algorithm::*;

mod digest;
pub use digest::*;

mod header;
pub use header::*;

mod canonicalize;
pub use canonicalize::*;

mod signing;
pub use signing::*;

/// Module containg a mock request type which implements
/// `ClientRequestLike` for testing.
pub mod mock_request;

#[cfg(feature = "reqwest")]
mod reqwest_impls;
