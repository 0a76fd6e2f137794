//! Deterministic random number generation.
//!
//! The selector must be reproducible from a 32-byte seed, so randomness
//! comes from a self-contained ChaCha20 block generator rather than a
//! platform RNG. Seed material is either user-supplied hex or drawn once
//! from OS entropy.

mod chacha;
mod seed;

pub use chacha::ChaChaRng;
pub use seed::{Seed, SEED_HEX_DIGITS, SEED_SIZE_BYTES};
