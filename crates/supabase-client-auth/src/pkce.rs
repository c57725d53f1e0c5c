//! PKCE verifier and S256 challenge generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Challenge method sent alongside the code challenge.
pub const CODE_CHALLENGE_METHOD: &str = "s256";

/// Suffix appended to the storage key for the persisted verifier.
pub const CODE_VERIFIER_SUFFIX: &str = "-code-verifier";

/// A fresh random code verifier (43 URL-safe characters).
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
