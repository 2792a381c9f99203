/// Opaque struct storing a computed signature string.
///
/// The signature string is always five newline-terminated lines:
///
/// ```text
/// <METHOD> <URI>
/// <HOST>
/// <DATE>
/// <IDENTITY>
/// <DIGEST>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureString {
    content: Vec<u8>,
}

impl SignatureString {
    /// Obtain a view of this signature string as a byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }
}

impl From<SignatureString> for Vec<u8> {
    fn from(other: SignatureString) -> Self {
        other.content
    }
}

/// Builds the signature string for a request. The method is uppercased; every
/// other field is used verbatim.
pub fn canonicalize(
    method: &str,
    uri: &str,
    host: &str,
    date: i64,
    identity: &str,
    digest: &str,
) -> SignatureString {
    let content = format!(
        "{} {}\n{}\n{}\n{}\n{}\n",
        method.to_ascii_uppercase(),
        uri,
        host,
        date,
        identity,
        digest
    )
    .into_bytes();

    SignatureString { content }
}
