use snafu::Snafu;

/// An enumeration representing session-level authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum SessionError {
    /// The boot silent sign-in failed and the user has to go through an
    /// interactive sign-in. Carries no structured detail; the concrete cause
    /// was already reported through the session callbacks.
    #[snafu(display("SessionError: Need to sign in"))]
    SigninRequired,
}
