//! Seed generation for launched runs.

use rand::rngs::{OsRng, StdRng};
use rand::{CryptoRng, RngCore, SeedableRng};

use crate::errors::{ErrorInfo, RunmError};

/// Largest seed width supported by [`SeedGenerator::generate`].
pub const MAX_SEED_BITS: u32 = 128;

/// Produces per-run seeds of a configured bit width.
///
/// Production code draws from the operating system CSPRNG through
/// [`SeedGenerator::os`]. Tests inject a seeded [`StdRng`] (ChaCha based, so it
/// still satisfies [`CryptoRng`]) through [`SeedGenerator::from_seed`] to get
/// reproducible seed strings.
#[derive(Debug, Clone)]
pub struct SeedGenerator<R = OsRng> {
    rng: R,
}

impl SeedGenerator<OsRng> {
    /// Seeds drawn from the operating system.
    pub fn os() -> Self {
        Self { rng: OsRng }
    }
}

impl Default for SeedGenerator<OsRng> {
    fn default() -> Self {
        Self::os()
    }
}

impl SeedGenerator<StdRng> {
    /// Deterministic generator for tests and reproducible dry runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore + CryptoRng> SeedGenerator<R> {
    /// Wraps an arbitrary cryptographically secure source.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws a uniformly distributed integer in `[0, 2^bits)`.
    pub fn random_bits(&mut self, bits: u32) -> Result<u128, RunmError> {
        validate_bits(bits)?;
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        let raw = u128::from_le_bytes(bytes);
        if bits == MAX_SEED_BITS {
            Ok(raw)
        } else {
            Ok(raw & ((1u128 << bits) - 1))
        }
    }

    /// Draws a seed and renders it as a decimal string.
    pub fn generate(&mut self, bits: u32) -> Result<String, RunmError> {
        Ok(self.random_bits(bits)?.to_string())
    }
}

/// Checks that a requested seed width can be produced.
pub fn validate_bits(bits: u32) -> Result<(), RunmError> {
    if bits == 0 || bits > MAX_SEED_BITS {
        return Err(RunmError::Config(
            ErrorInfo::new("seed_bits", "random seed width out of range")
                .with_context("bits", bits.to_string())
                .with_hint(format!("use a width between 1 and {MAX_SEED_BITS}")),
        ));
    }
    Ok(())
}
