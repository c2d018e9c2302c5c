// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Prefix of every claim code.
pub const CLAIM_CODE_PREFIX: &str = "WIN-";

/// Characters a winner can read out over the phone without confusion
/// (no `0/O`, `1/I/L`).
const CLAIM_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

const CLAIM_CODE_LENGTH: usize = 8;

/// Generates a human-readable claim code such as `WIN-7KQ2MXRA`.
///
/// Codes are random, not derived from the draw seed, so knowing a seed does
/// not reveal anyone's claim code. Uniqueness is enforced by storage.
#[must_use]
pub fn generate_claim_code() -> String {
    let mut code = String::with_capacity(CLAIM_CODE_PREFIX.len() + CLAIM_CODE_LENGTH);
    code.push_str(CLAIM_CODE_PREFIX);
    for _ in 0..CLAIM_CODE_LENGTH {
        let index: usize = rand::random_range(0..CLAIM_ALPHABET.len());
        code.push(char::from(CLAIM_ALPHABET[index]));
    }
    code
}
