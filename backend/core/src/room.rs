//! Room names for outbound calls.
//!
//! `outbound-call-<epoch millis>-<9 base36 chars>`. The random suffix keeps two
//! names generated in the same millisecond apart; uniqueness is best-effort.

use chrono::Utc;
use rand::Rng;

pub const ROOM_PREFIX: &str = "outbound-call";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh room name for one call.
pub fn generate_room_name() -> String {
    room_name_at(Utc::now().timestamp_millis())
}

fn room_name_at(millis: i64) -> String {
    format!("{ROOM_PREFIX}-{millis}-{}", random_suffix())
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
