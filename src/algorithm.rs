use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

/// Hash algorithms accepted by the Rapid7-HMAC-V1 scheme.
///
/// The same algorithm is used both for the body digest and as the inner
/// hash of the HMAC over the signature string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// SHA-256, named `SHA256` on the wire.
    Sha256,
    /// SHA-512, named `SHA512` on the wire.
    Sha512,
}

/// Returned when an algorithm name is not on the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Turnstile currently supports the following algorithms: {}. You specified {requested}.",
    Algorithm::supported_names().join(", ")
)]
pub struct UnsupportedAlgorithm {
    /// The name exactly as it was requested.
    pub requested: String,
}

impl Algorithm {
    /// Every supported algorithm, ordered by canonical name.
    pub const ALL: [Algorithm; 2] = [Algorithm::Sha256, Algorithm::Sha512];

    /// Canonical uppercase name, as it appears in the `Digest` and
    /// `Authorization` headers.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha512 => "SHA512",
        }
    }

    /// Case-insensitive check against the allow-list.
    pub fn is_supported(name: &str) -> bool {
        Self::lookup(name).is_some()
    }

    /// Canonical names of all supported algorithms, sorted.
    pub fn supported_names() -> Vec<&'static str> {
        let mut names: Vec<_> = Self::ALL.iter().map(|alg| alg.name()).collect();
        names.sort_unstable();
        names
    }

    fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|alg| alg.name().eq_ignore_ascii_case(name))
    }

    /// Raw hash of `bytes`.
    pub fn hash(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::Sha256 => Sha256::digest(bytes).to_vec(),
            Algorithm::Sha512 => Sha512::digest(bytes).to_vec(),
        }
    }

    /// Raw HMAC of `bytes`, keyed with `key`, using this algorithm as the
    /// inner hash.
    pub fn mac(self, key: &[u8], bytes: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::Sha256 => hmac_bytes::<Hmac<Sha256>>(key, bytes),
            Algorithm::Sha512 => hmac_bytes::<Hmac<Sha512>>(key, bytes),
        }
    }
}

fn hmac_bytes<M: Mac + hmac::digest::KeyInit>(key: &[u8], bytes: &[u8]) -> Vec<u8> {
    let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(bytes);
    mac.finalize().into_bytes().to_vec()
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Sha256
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| UnsupportedAlgorithm {
            requested: s.into(),
        })
    }
}
