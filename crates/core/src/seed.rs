// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DrawError;

/// Length of freshly generated seeds in bytes (256 bits).
pub const SEED_LENGTH: usize = 32;

/// The secret key of one draw.
///
/// Live draws always use [`generate_seed`]; parsing a stored seed is only
/// for replaying an existing record.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed(Vec<u8>);

impl Seed {
    /// Wraps raw seed bytes.
    ///
    /// # Errors
    ///
    /// Returns `DrawError::InvalidSeed` if fewer than 32 bytes are supplied.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DrawError> {
        if bytes.len() < SEED_LENGTH {
            return Err(DrawError::InvalidSeed(format!(
                "seed must be at least {SEED_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Parses a hex-encoded seed as stored in a draw record.
    ///
    /// # Errors
    ///
    /// Returns `DrawError::InvalidSeed` if the text is not hex or too short.
    pub fn from_hex(text: &str) -> Result<Self, DrawError> {
        let bytes = hex::decode(text).map_err(|e| DrawError::InvalidSeed(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// Hex encoding for storage.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// Seeds stay out of logs.
impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seed({} bytes)", self.0.len())
    }
}

/// Generates a fresh 256-bit seed from the thread-local CSPRNG.
#[must_use]
pub fn generate_seed() -> Seed {
    let bytes: [u8; SEED_LENGTH] = rand::random();
    Seed(bytes.to_vec())
}
