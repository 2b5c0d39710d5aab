//! Room codes are the short handle players type in to join a multiplayer room.

use rand::distributions::Uniform;
use rand::prelude::*;

pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const ROOM_CODE_LEN: usize = 6;

pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let dist = Uniform::from(0..ALPHABET.len());
    (0..ROOM_CODE_LEN)
        .map(|_| ALPHABET[dist.sample(&mut *rng)] as char)
        .collect()
}

/// Canonical form of a code typed by a player.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_valid(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN && code.bytes().all(|b| ALPHABET.contains(&b))
}
