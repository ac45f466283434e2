use thiserror::Error;

/// Error returned by [`Mutex::release`](super::Mutex::release).
///
/// Both variants signal a bug at the call site, never a transient
/// condition, so retrying is pointless. The mutex state is unchanged when
/// either is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReleaseError {
    /// The mutex is not held by anyone: a double release, or a release
    /// without a matching acquire.
    #[error("cannot release an unacquired lock")]
    IllegalState,

    /// The token is not the one held by the current owner, e.g. a stale
    /// token from an earlier grant or another task's token.
    #[error("release token doesn't match the current lock holder")]
    TokenMismatch,
}
