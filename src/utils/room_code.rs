//! Room code generation.

use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::OsRng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const ROOM_CODE_LEN: usize = 6;

/// Generate a 6-character uppercase alphanumeric room code using the OS
/// RNG. Uniqueness is enforced by the registry (collision retry), not here.
pub fn generate_room_code() -> String {
    let mut rng = OsRng;
    let dist = Uniform::from(0..ALPHABET.len());

    let mut s = String::with_capacity(ROOM_CODE_LEN);
    for _ in 0..ROOM_CODE_LEN {
        s.push(ALPHABET[dist.sample(&mut rng)] as char);
    }
    s
}
