pub mod params;
pub mod permutation;
pub mod sponge;

pub use params::{rp, RF};
pub use permutation::permute;
pub use sponge::{linear_hash_many, linear_hash_many_default, poseidon_hash, DEFAULT_LINEAR_ARITY};
