use crate::errors::{Error, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SEED_SIZE_BYTES: usize = 32;
pub const SEED_HEX_DIGITS: usize = SEED_SIZE_BYTES * 2;

/// A 32-byte PRNG seed.
///
/// The textual form is always 64 hex digits: case-insensitive on input,
/// uppercase on output (logs and `--write-seed` files).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed([u8; SEED_SIZE_BYTES]);

impl Seed {
    /// Parses a 64-digit hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != SEED_HEX_DIGITS {
            return Err(Error::InvalidSeed(format!(
                "expected {SEED_HEX_DIGITS} hexadecimal digits, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; SEED_SIZE_BYTES];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| Error::InvalidSeed("seed is not a valid hexadecimal number".into()))?;
        Ok(Self(bytes))
    }

    /// Draws a fresh seed from the OS entropy source. When the OS source
    /// fails, the buffer is zeroed and a wallclock snapshot is XOR-folded
    /// into it as a last resort.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SEED_SIZE_BYTES];
        if OsRng.try_fill_bytes(&mut bytes).is_err() {
            bytes = [0u8; SEED_SIZE_BYTES];
            fold_wallclock(&mut bytes);
        }
        Self(bytes)
    }

    pub fn to_hex(self) -> String {
        hex::encode_upper(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_SIZE_BYTES] {
        &self.0
    }
}

// Mirrors the classic timeval fallback: 16 bytes of wallclock state XORed
// into the tail of the buffer with a half-width index swizzle.
fn fold_wallclock(output: &mut [u8; SEED_SIZE_BYTES]) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let mut clock = [0u8; 16];
    clock[..8].copy_from_slice(&now.as_secs().to_ne_bytes());
    clock[8..].copy_from_slice(&u64::from(now.subsec_nanos()).to_ne_bytes());

    let size = output.len();
    for i in 0..clock.len().min(size) {
        output[size - 1 - i] ^= clock[i ^ (clock.len() / 2)];
    }
}
