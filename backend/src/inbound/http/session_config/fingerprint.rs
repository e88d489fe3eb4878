//! Short fingerprint of the session signing key.
//!
//! Logged at startup so operators can tell which key a replica loaded
//! without the key material ever reaching the logs.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Digest bytes kept before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Lower-case hex prefix of the SHA-256 digest of the signing key.
///
/// # Examples
/// ```
/// use actix_web::cookie::Key;
/// use spinwheel::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fingerprint = key_fingerprint(&Key::generate());
/// assert_eq!(fingerprint.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
