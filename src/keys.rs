//! Cache key construction shared by the place-search and recommendation callers

use sha2::{Digest, Sha256};

/// Builds the generic-cache key for a nearby search, e.g. `shibuya_1000`
///
/// The whole key is lowercased and then trimmed once, so trailing whitespace
/// on the place name stays inside the key: `"Shibuya "` gives
/// `shibuya _1000`. This matches keys already stored by the search flow.
pub fn search_key(place: &str, radius_m: u32) -> String {
    format!("{}_{}", place, radius_m).to_lowercase().trim().to_string()
}

/// Hashes a model name and prompt into the LLM-cache key
///
/// Lowercase hex SHA-256 of `"{model}|{prompt}"`.
pub fn prompt_hash(model: &str, prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update(b"|");
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}
