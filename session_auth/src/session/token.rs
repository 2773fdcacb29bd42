use sha2::{Digest, Sha256};

use crate::session::errors::SessionError;
use crate::utils::{base32_lower_encode, gen_random_bytes, hex_lower_encode};

/// Entropy of a session token: 20 bytes, 160 bits.
const SESSION_TOKEN_BYTES: usize = 20;

/// Generate a new opaque session token.
///
/// The token is 20 bytes from the system CSPRNG encoded as lowercase base32 without
/// padding, which keeps it URL- and cookie-safe. It is handed to the client and never
/// stored; see [`derive_session_id`].
pub fn generate_session_token() -> Result<String, SessionError> {
    let bytes = gen_random_bytes(SESSION_TOKEN_BYTES)?;
    Ok(base32_lower_encode(&bytes))
}

/// Derive the storage key for a session token: lowercase hex of SHA-256 over its UTF-8 bytes.
pub fn derive_session_id(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex_lower_encode(&digest)
}
