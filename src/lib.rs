//! Verifier-side cryptographic core of a ZK Proof-of-Solvency protocol.
//!
//! This crate is purely functional: every public entry point is a
//! deterministic `fn(&T...) -> Result<U, VerifierError>` (or a bare `bool`
//! for the verification predicates) over immutable inputs. There is no I/O,
//! no background state, and no retry/timeout policy — callers own those
//! concerns.

pub mod address;
pub mod anonset;
pub mod balance;
pub mod curve;
pub mod error;
pub mod groth16;
pub mod poseidon;
pub mod pubhash;
pub mod receipt;

pub use error::VerifierError;
