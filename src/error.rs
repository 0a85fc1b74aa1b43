use thiserror::Error;

/// Failure kinds the verifier core can produce.
///
/// The first four variants are programmer/prover errors: fatal at the call
/// site, never silently swallowed. `VerificationFailed` is different in
/// kind — a verifier legitimately expects occasional rejection, so the
/// primary verification entry points return `bool` (or `(bool, bool)` for
/// receipts) directly rather than this variant; it exists for callers that
/// want a uniform `Result`-shaped diagnostic path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("point not on curve: {0}")]
    NotOnCurve(String),

    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),

    #[error("verification failed: {0}")]
    VerificationFailed(String),
}
