use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use snafu::Snafu;

use crate::session::RawAuthResult;

/// Promise-style asynchronous result used across the session orchestration.
/// Everything runs on the page's single-threaded event loop, so futures are
/// neither `Send` nor `Sync`.
pub type SessionFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Error surfaced by the auth client capability.
///
/// The orchestrator treats every failure from the client uniformly. There is
/// no classification by HTTP status or protocol error code, so a single
/// message-carrying error is all the seam requires.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("AuthClientError: {message}"))]
pub struct AuthClientError {
    pub message: String,
}

impl AuthClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Lifecycle notifications published by the auth client capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The current access token is about to expire.
    AccessTokenExpiring,

    /// The current access token expired.
    AccessTokenExpired,

    /// A client-internal silent renewal attempt failed.
    SilentRenewError(AuthClientError),

    /// A user was loaded by the client. Observability only.
    UserLoaded,

    /// The user was signed out at the identity provider.
    UserSignedOut,
}

pub type AuthEventListener = Rc<dyn Fn(&AuthEvent)>;

/// Identifies a registered listener so it can be detached again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The OIDC client consumed by the session orchestrator.
///
/// The protocol itself (token exchange, JWT validation, redirect and iframe
/// mechanics) lives behind this seam; implementations typically bridge to
/// whatever OIDC machinery the page actually runs.
pub trait AuthClient {
    /// Attempt a re-authentication without any user-facing redirect.
    fn signin_silent(&self) -> SessionFuture<Result<RawAuthResult, AuthClientError>>;

    /// Navigate the page to the identity provider's login flow.
    fn signin_redirect(&self);

    /// Register a listener for [`AuthEvent`]s.
    fn subscribe(&self, listener: AuthEventListener) -> ListenerId;

    /// Detach a previously registered listener.
    fn unsubscribe(&self, id: ListenerId);
}
