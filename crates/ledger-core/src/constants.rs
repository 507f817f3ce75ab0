pub const HASH_SIZE: usize = 32;
/// Width of a base64 rendered digest, padding included.
pub const HASH_TEXT_SIZE: usize = HASH_SIZE.div_ceil(3) * 4;
pub const DIFFICULTY_PREFIX: &str = "00";
pub const GENESIS_HASH: &str = "00000000000000000000000000000000000000000000";
pub const GENESIS_NONCE: i64 = -1;
pub const MAX_PAYLOAD_DEPTH: usize = 64;
pub const DEFAULT_DIGEST: &str = "sha256";
