//! Random token generation for session IDs and CSRF tokens.

use rand::Rng;

/// Default token length.
pub const TOKEN_LEN: usize = 128;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

/// Generate a [`TOKEN_LEN`]-character token over `[A-Za-z0-9_]`.
#[must_use]
pub fn generate_token() -> String {
    generate_token_with_len(TOKEN_LEN)
}

/// Generate a token of `len` characters over `[A-Za-z0-9_]`.
///
/// Uses the thread-local CSPRNG.
#[must_use]
pub fn generate_token_with_len(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}
