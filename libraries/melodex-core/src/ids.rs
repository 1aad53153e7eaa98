//! Deterministic id generation
//!
//! Every identifier in the index is a pure function of its input string, so
//! re-scanning the same files always produces the same ids and upserting by
//! id is equivalent to upserting by path. Track ids hash the absolute path;
//! album/artist/genre ids hash the normalized display name. Split artist
//! identities get negative ids so they can never collide with raw credits.

fn hash64(input: &str) -> u64 {
    let digest = blake3::hash(input.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Normalize a name for hashing and case-insensitive comparison
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Id for a track, derived from its absolute path
pub fn track_id(path: &str) -> i64 {
    ((hash64(path) & 0x7FFF_FFFF_FFFF_FFFF).max(1)) as i64
}

/// Id for an album, artist credit, or genre, derived from the normalized name
pub fn name_id(name: &str) -> i64 {
    ((hash64(&normalize(name)) & 0x7FFF_FFFF_FFFF_FFFF).max(1)) as i64
}

/// Id for a split artist identity, always strictly negative
pub fn split_artist_id(name: &str) -> i64 {
    -(((hash64(&normalize(name)) & 0x7FFF_FFFF).max(1)) as i64)
}

/// Whether an artist id refers to a split identity rather than a raw credit
pub fn is_split_id(id: i64) -> bool {
    id < 0
}
