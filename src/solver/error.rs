use thiserror::Error;

/// The solver's error taxonomy. Everything above the solver
/// (CLI, oracle transport) still wraps these in `anyhow`, but the solver
/// itself hands back one of these exactly, so callers can match on it to
/// pick an exit code.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("cyphertext is not block-aligned or has fewer than 2 blocks")]
    InvalidInput,

    #[error("oracle misbehaved: no guess in 0..=255 produced valid padding at block {block}, pad width {pad_width}")]
    OracleMisbehavior { block: usize, pad_width: u8 },

    #[error("oracle unavailable: {0}")]
    OracleUnavailable(#[from] anyhow::Error),

    #[error("solve cancelled")]
    Cancelled,
}
