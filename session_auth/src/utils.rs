use data_encoding::{BASE32_NOPAD, HEXLOWER};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),
}

pub(crate) fn gen_random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// RFC 4648 base32 with a lowercase alphabet and no `=` padding.
pub(crate) fn base32_lower_encode(input: &[u8]) -> String {
    BASE32_NOPAD.encode(input).to_ascii_lowercase()
}

pub(crate) fn hex_lower_encode(input: &[u8]) -> String {
    HEXLOWER.encode(input)
}
