//! Crate-wide error taxonomy.
//!
//! Every fallible public operation on the engine returns [`AmemError`]. Port
//! implementations (metadata store, vector store, embedding/LLM providers,
//! cache, peer-sync) return their own error types but are expected to convert
//! into this taxonomy at the boundary via `#[from]` or explicit mapping —
//! the engine itself never matches on a port's concrete error type.

use uuid::Uuid;

/// The stable error taxonomy the engine surfaces to callers.
///
/// Variants map directly onto the kinds described for the core's error
/// handling design: each carries enough context to act on without a second
/// round trip, but never leaks a port's internal error representation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AmemError {
    /// Entity absent, or present but not visible to the caller after
    /// isolation filtering. Not logged as an error — this is an expected
    /// outcome of normal operation.
    #[error("memory {id} not found")]
    NotFound {
        /// The identifier that was looked up.
        id: Uuid,
    },

    /// The isolation guard filtered every candidate, or a write targeted a
    /// tenant the caller does not own.
    #[error("permission denied: {reason}")]
    PermissionDenied {
        /// Human-readable reason, safe to surface to the caller.
        reason: String,
    },

    /// A schema or invariant violation on input (e.g. a reflection with
    /// fewer than two source memories).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A capacity bound could not be satisfied even after eviction.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// An upstream call (store, provider, peer) exceeded its deadline.
    #[error("deadline exceeded calling {operation}")]
    DeadlineExceeded {
        /// Name of the operation that timed out, for diagnostics.
        operation: String,
    },

    /// An upstream store or provider reported a connection-level failure.
    /// The engine retries idempotent calls against this kind up to three
    /// times with exponential backoff before surfacing it.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// A sync conflict was detected under the Manual resolution strategy
    /// and was not auto-applied. Carries both sides for caller inspection.
    #[error("sync conflict on memory {id}")]
    Conflict {
        /// The memory identifier in conflict.
        id: Uuid,
    },

    /// An invariant the engine assumes was violated. Surfaced to the
    /// caller but also logged at the highest severity; the underlying
    /// state is left untouched rather than guessed at.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AmemError>;
