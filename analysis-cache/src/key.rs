//! Cache key derivation: lowercase-and-whitespace-normalize the message,
//! then MD5 hash it. Grounded in `rendivs925-bro`'s use of `md5` for
//! content-addressed keys.

/// Collapses internal whitespace runs to a single space and lowercases,
/// so "Hello   World" and "hello world" hash identically.
fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derives the cache key for `text`: the hex MD5 digest of its normalized
/// form.
pub fn cache_key(text: &str) -> String {
    let normalized = normalize(text);
    format!("{:x}", md5::compute(normalized.as_bytes()))
}
