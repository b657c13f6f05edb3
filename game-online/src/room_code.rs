use rand::Rng;

/// Uppercase letters and digits without the easily confused `I`, `O`, `0`
/// and `1`.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Codes are typed by hand, so accept surrounding spaces and lowercase.
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn is_valid_room_code(code: &str, length: usize) -> bool {
    code.len() == length && code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
}
