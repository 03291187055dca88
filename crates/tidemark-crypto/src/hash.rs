use tidemark_types::Hash;

/// Blake3 hashing utilities.

/// Compute blake3 hash of data
pub fn hash(data: &[u8]) -> Hash {
    Hash::compute(data)
}

/// Compute blake3 hash of multiple data slices
pub fn hash_multi(data: &[&[u8]]) -> Hash {
    Hash::compute_multi(data)
}

/// Hash with a domain separator.
///
/// The domain tag is hashed first so digests signed for one purpose
/// (or one deployed instance) can never collide with another.
pub fn hash_with_domain(domain: &str, data: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain.as_bytes());
    for chunk in data {
        hasher.update(chunk);
    }
    Hash::from_bytes(*hasher.finalize().as_bytes())
}
