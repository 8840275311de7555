#![deny(missing_docs)]
#![doc = "Core error taxonomy and seed sources shared by the runm sweep launcher."]

pub mod errors;
pub mod rng;

pub use errors::{ErrorInfo, RunmError};
pub use rng::{validate_bits, SeedGenerator, MAX_SEED_BITS};
