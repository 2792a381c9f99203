use crate::Algorithm;

/// Computes the value of the `Digest` header for a request body, in the form
/// `<ALG>=<base64>`.
pub fn compute_digest(algorithm: Algorithm, body: &[u8]) -> String {
    format!("{}={}", algorithm.name(), base64::encode(&algorithm.hash(body)))
}
