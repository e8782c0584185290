//! Client-side OIDC session bootstrapping for Leptos single-page
//! applications.
//!
//! The crate wires a black-box OIDC client ([`AuthClient`]) to the
//! application's callback surface: it attempts a silent sign-in at
//! application start, renews the session whenever the client announces an
//! imminent token expiry, preserves the pre-authentication route across
//! redirect round-trips and escalates to a full-page redirect sign-in only
//! when silent re-authentication is not possible.
//!
//! The OIDC protocol itself (token exchange, validation, redirect and
//! iframe mechanics) stays behind the [`AuthClient`] seam.
//!
//! ```no_run
//! use std::rc::Rc;
//!
//! use leptos_oidc_session::url::Url;
//! use leptos_oidc_session::{
//!     AuthClient, AuthClientError, AuthEventListener, ListenerId, LoginConfig, RawAuthResult,
//!     SessionCallbacks, SessionFuture, SessionSettings, use_auth_session,
//! };
//!
//! /// Bridge to whatever OIDC machinery the page actually runs.
//! struct PageAuthClient;
//!
//! impl AuthClient for PageAuthClient {
//!     fn signin_silent(&self) -> SessionFuture<Result<RawAuthResult, AuthClientError>> {
//!         Box::pin(async { Err(AuthClientError::new("not wired up")) })
//!     }
//!
//!     fn signin_redirect(&self) {}
//!
//!     fn subscribe(&self, _listener: AuthEventListener) -> ListenerId {
//!         ListenerId(0)
//!     }
//!
//!     fn unsubscribe(&self, _id: ListenerId) {}
//! }
//!
//! let config = LoginConfig {
//!     authority: Url::parse("https://auth.example.com").unwrap(),
//!     client_id: "my-client".to_owned(),
//!     redirect_uri: Url::parse("https://app.example.com/redirect.html").unwrap(),
//!     silent_redirect_uri: None,
//!     oauth_scope: vec!["openid".to_owned(), "profile".to_owned()],
//!     prevent_redirect: false,
//!     mock_locale: "en-GB".to_owned(),
//! };
//!
//! // Hand the derived settings to the OIDC client implementation.
//! let _settings = SessionSettings::from_config(&config);
//!
//! // Inside the application's root component, below the `Router`:
//! let auth = use_auth_session(
//!     Rc::new(PageAuthClient),
//!     &config,
//!     SessionCallbacks::new(
//!         |session| {
//!             // Publish the access token to the API layer.
//!             let _ = session;
//!         },
//!         || {
//!             // Drop any published credentials.
//!         },
//!         |err| {
//!             // Surface the error to the user.
//!             let _ = err;
//!         },
//!     ),
//! );
//!
//! // Then restore the route that was active before the redirect round-trip.
//! auth.restore_initial_route();
//! ```

mod browser;
mod client;
mod config;
mod error;
mod externals;
mod hooks;
mod mock;
mod orchestrator;
mod profile;
mod session;
mod storage;

pub use browser::{BrowserContext, SIGNIN_REQUESTED, request_signin};
pub use client::{
    AuthClient, AuthClientError, AuthEvent, AuthEventListener, ListenerId, SessionFuture,
};
pub use config::{LoginConfig, SessionSettings};
pub use error::SessionError;
pub use externals::{EXTERNAL_DEPENDENCIES, EntryPoints, ExternalDependency};
pub use hooks::{AuthSession, use_auth_session, use_mock_auth_session};
pub use mock::{MOCK_ACCESS_TOKEN, mock_session};
pub use orchestrator::{
    SessionCallbacks, SessionHandle, SessionOrchestrator, SessionStartup, Spawner,
};
pub use profile::{UserProfile, map_user_profile};
pub use session::{DEFAULT_LOCALE, NormalizedSession, RawAuthResult, RawClaims, adapt_auth_result};
pub use storage::{InMemoryRouteStore, InitialState, RouteStore, retrieve_initial_state};

pub mod url {
    pub use url::Url;
}

type AccessToken = String;
