use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::client::{AuthClient, AuthClientError};
use crate::config::LoginConfig;
use crate::mock::mock_session;
use crate::orchestrator::{SessionCallbacks, SessionHandle};
#[cfg(not(feature = "ssr"))]
use crate::orchestrator::{SessionOrchestrator, SessionStartup};
use crate::session::NormalizedSession;
use crate::storage::{InMemoryRouteStore, InitialState, RouteStore, retrieve_initial_state};

#[cfg(not(feature = "ssr"))]
use crate::browser::{BrowserContext, DomBrowserContext};
#[cfg(not(feature = "ssr"))]
use crate::storage::BrowserRouteStore;

/// Reactive view of the running authentication session.
///
/// Provided as context by [`use_auth_session`] and [`use_mock_auth_session`].
/// Use
/// ```no_run
/// use leptos::prelude::expect_context;
/// use leptos_oidc_session::AuthSession;
///
/// let auth = expect_context::<AuthSession>();
/// ```
/// in any component rendered below the component that performed the hook
/// call.
#[derive(Clone, Copy)]
pub struct AuthSession {
    /// The last published session, `None` while unauthenticated.
    pub session: Signal<Option<NormalizedSession>>,

    /// Derived signal stating `true` while a session is published.
    pub is_authenticated: Signal<bool>,

    /// Display rendering of the last session error, cleared on the next
    /// successful sign-in.
    pub last_error: Signal<Option<String>>,

    routes: StoredValue<Rc<dyn RouteStore>, LocalStorage>,
    handle: StoredValue<SessionHandle, LocalStorage>,
}

impl Debug for AuthSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("session", &self.session)
            .field("is_authenticated", &self.is_authenticated)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// The pre-authentication route remembered across the last redirect
    /// round-trip. Pure read, callable at any time.
    pub fn initial_state(&self) -> InitialState {
        self.routes
            .with_value(|routes| retrieve_initial_state(routes.as_ref()))
    }

    /// Navigate to the remembered pre-authentication route, if any. Must be
    /// called below a leptos `Router`.
    pub fn restore_initial_route(&self) {
        let Some(route) = self.initial_state().initial_route else {
            return;
        };
        let path = match route.starts_with('/') {
            true => route,
            false => format!("/{route}"),
        };
        tracing::trace!(%path, "restoring pre-authentication route");
        let navigate = leptos_router::hooks::use_navigate();
        navigate(&path, NavigateOptions::default());
    }

    /// Detach every listener the session wired up.
    pub fn stop(&self) {
        self.handle.with_value(|handle| handle.stop());
    }
}

struct ReactiveSession {
    session: Signal<Option<NormalizedSession>>,
    is_authenticated: Signal<bool>,
    last_error: Signal<Option<String>>,
    wrapped: SessionCallbacks,
}

/// Wrap the host's callbacks so the published session additionally drives
/// the reactive [`AuthSession`] signals.
fn bind_session_signals(callbacks: &SessionCallbacks) -> ReactiveSession {
    let (session, set_session) = signal::<Option<NormalizedSession>>(None);
    let (last_error, set_last_error) = signal::<Option<String>>(None);

    let on_renewed = Rc::clone(&callbacks.on_token_renewed);
    let on_expired = Rc::clone(&callbacks.on_token_expired);
    let on_error = Rc::clone(&callbacks.on_session_error);

    let wrapped = SessionCallbacks::new(
        move |published: NormalizedSession| {
            set_session.set(Some(published.clone()));
            set_last_error.set(None);
            on_renewed(published);
        },
        move || {
            set_session.set(None);
            on_expired();
        },
        move |err: AuthClientError| {
            set_last_error.set(Some(err.to_string()));
            on_error(err);
        },
    );

    ReactiveSession {
        session: session.into(),
        is_authenticated: Signal::derive(move || session.read().is_some()),
        last_error: last_error.into(),
        wrapped,
    }
}

/// Wire up the authentication session for the running page.
///
/// Creates the [`SessionOrchestrator`] against the real browser context,
/// starts it (document listener, auth client events, boot silent sign-in)
/// and provides the returned [`AuthSession`] as context.
///
/// Intended to be called exactly once, at application start.
pub fn use_auth_session(
    client: Rc<dyn AuthClient>,
    config: &LoginConfig,
    callbacks: SessionCallbacks,
) -> AuthSession {
    tracing::trace!("initializing auth session");

    let ReactiveSession {
        session,
        is_authenticated,
        last_error,
        wrapped,
    } = bind_session_signals(&callbacks);

    let routes: Rc<dyn RouteStore> = {
        #[cfg(not(feature = "ssr"))]
        {
            Rc::new(BrowserRouteStore::new())
        }
        #[cfg(feature = "ssr")]
        {
            Rc::new(InMemoryRouteStore::default())
        }
    };

    let handle = {
        #[cfg(not(feature = "ssr"))]
        {
            let browser: Rc<dyn BrowserContext> = Rc::new(DomBrowserContext::new());
            let orchestrator = SessionOrchestrator::new(
                client,
                Rc::clone(&routes),
                browser,
                config.prevent_redirect,
                Rc::new(|task| leptos::task::spawn_local(task)),
            );
            let SessionStartup { boot, handle } = orchestrator.start(wrapped);
            leptos::task::spawn_local(async move {
                match boot.await {
                    Ok(_) => tracing::trace!("boot sign-in completed"),
                    Err(err) => {
                        tracing::trace!(?err, "boot sign-in ended without a session");
                    }
                }
            });
            handle
        }
        #[cfg(feature = "ssr")]
        {
            let _ = (client, config, callbacks, wrapped);
            SessionHandle::detached()
        }
    };

    let auth = AuthSession {
        session,
        is_authenticated,
        last_error,
        routes: StoredValue::new_local(routes),
        handle: StoredValue::new_local(handle),
    };

    provide_context(auth);

    auth
}

/// Drop-in substitute for [`use_auth_session`] in non-production
/// environments: publishes the mocked session and never talks to an
/// identity provider. The decision to use it belongs to the host.
pub fn use_mock_auth_session(config: &LoginConfig, callbacks: SessionCallbacks) -> AuthSession {
    let ReactiveSession {
        session,
        is_authenticated,
        last_error,
        wrapped,
    } = bind_session_signals(&callbacks);

    // The mock publishes synchronously and the returned attempt is already
    // resolved, so there is nothing left to await.
    let _resolved = mock_session(&wrapped, &config.mock_locale);

    let routes: Rc<dyn RouteStore> = Rc::new(InMemoryRouteStore::default());

    let auth = AuthSession {
        session,
        is_authenticated,
        last_error,
        routes: StoredValue::new_local(routes),
        handle: StoredValue::new_local(SessionHandle::detached()),
    };

    provide_context(auth);

    auth
}
