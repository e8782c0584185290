use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use crate::browser::{BrowserContext, route_of, url_carries_access_token};
use crate::client::{AuthClient, AuthClientError, AuthEvent, SessionFuture};
use crate::error::SessionError;
use crate::session::{NormalizedSession, adapt_auth_result};
use crate::storage::RouteStore;

/// Hands a task to the page's executor. In production this is
/// `leptos::task::spawn_local`; tests inject a deterministic pool.
pub type Spawner = Rc<dyn Fn(SessionFuture<()>)>;

/// The application callback surface wired up by the orchestrator.
#[derive(Clone)]
pub struct SessionCallbacks {
    /// Invoked with the published session after every successful sign-in.
    pub on_token_renewed: Rc<dyn Fn(NormalizedSession)>,

    /// Invoked whenever the session has to be considered unauthenticated.
    pub on_token_expired: Rc<dyn Fn()>,

    /// Invoked with the causing error on security-relevant failures.
    pub on_session_error: Rc<dyn Fn(AuthClientError)>,
}

impl SessionCallbacks {
    pub fn new(
        on_token_renewed: impl Fn(NormalizedSession) + 'static,
        on_token_expired: impl Fn() + 'static,
        on_session_error: impl Fn(AuthClientError) + 'static,
    ) -> Self {
        Self {
            on_token_renewed: Rc::new(on_token_renewed),
            on_token_expired: Rc::new(on_token_expired),
            on_session_error: Rc::new(on_session_error),
        }
    }
}

impl Debug for SessionCallbacks {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCallbacks").finish_non_exhaustive()
    }
}

/// Owns the lifecycle of a single authentication session for the running
/// page.
///
/// Composes an injected [`AuthClient`], a [`RouteStore`] and the
/// [`BrowserContext`]. The fresh-redirect flag is computed once, here; the
/// initial reading of the page URL stays authoritative for the lifetime of
/// the orchestrator.
#[derive(Clone)]
pub struct SessionOrchestrator {
    client: Rc<dyn AuthClient>,
    routes: Rc<dyn RouteStore>,
    browser: Rc<dyn BrowserContext>,
    spawner: Spawner,
    prevent_redirect: bool,
    fresh_redirect: bool,
}

impl Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("prevent_redirect", &self.prevent_redirect)
            .field("fresh_redirect", &self.fresh_redirect)
            .finish_non_exhaustive()
    }
}

/// Everything [`SessionOrchestrator::start`] produces: the boot sign-in
/// attempt and the handle detaching all listeners again.
pub struct SessionStartup {
    /// The boot silent sign-in attempt. Resolves with the published session
    /// or rejects with the generic [`SessionError::SigninRequired`] after
    /// the escalation policy ran.
    pub boot: SessionFuture<Result<NormalizedSession, SessionError>>,

    /// Detaches every listener registered by `start` when stopped or
    /// dropped.
    pub handle: SessionHandle,
}

impl SessionOrchestrator {
    pub fn new(
        client: Rc<dyn AuthClient>,
        routes: Rc<dyn RouteStore>,
        browser: Rc<dyn BrowserContext>,
        prevent_redirect: bool,
        spawner: Spawner,
    ) -> Self {
        let fresh_redirect = browser
            .current_url()
            .is_some_and(|url| url_carries_access_token(&url));

        tracing::trace!(fresh_redirect, prevent_redirect, "session orchestrator created");

        Self {
            client,
            routes,
            browser,
            spawner,
            prevent_redirect,
            fresh_redirect,
        }
    }

    /// Whether the page URL carried a freshly issued access token when this
    /// orchestrator was created.
    pub fn is_fresh_redirect(&self) -> bool {
        self.fresh_redirect
    }

    /// Wire up the session: attaches the document-level sign-in request
    /// listener (when a document exists), subscribes to the auth client's
    /// events and kicks off the boot silent sign-in attempt.
    ///
    /// Intended to be called exactly once at application start. The returned
    /// [`SessionHandle`] detaches everything again.
    pub fn start(&self, callbacks: SessionCallbacks) -> SessionStartup {
        let mut disposers: Vec<Box<dyn FnOnce()>> = Vec::new();

        let signin_listener = {
            let this = self.clone();
            let callbacks = callbacks.clone();
            self.browser.listen_signin_requested(Rc::new(move || {
                tracing::trace!("sign-in requested, trying to sign in silently");
                let attempt = this.try_signin(&callbacks);
                (this.spawner)(Box::pin(async move {
                    match attempt.await {
                        Ok(_) => tracing::trace!("requested re-sign-in succeeded"),
                        Err(err) => tracing::trace!(?err, "requested re-sign-in failed"),
                    }
                }));
            }))
        };
        if let Some(id) = signin_listener {
            let browser = Rc::clone(&self.browser);
            disposers.push(Box::new(move || browser.unlisten_signin_requested(id)));
        }

        {
            let this = self.clone();
            let callbacks = callbacks.clone();
            let id = self.client.subscribe(Rc::new(move |event| match event {
                AuthEvent::AccessTokenExpiring => {
                    tracing::trace!("access token expiring, triggering silent renewal");
                    this.save_current_route();
                    let attempt = this.try_signin(&callbacks);
                    (this.spawner)(Box::pin(async move {
                        let _ = attempt.await;
                    }));
                }
                AuthEvent::AccessTokenExpired => {
                    tracing::trace!("access token expired");
                    (callbacks.on_token_expired)();
                }
                AuthEvent::SilentRenewError(err) => {
                    tracing::trace!(?err, "silent renewal failed");
                    (callbacks.on_session_error)(err.clone());
                    (callbacks.on_token_expired)();
                }
                AuthEvent::UserLoaded => {
                    tracing::trace!("user loaded");
                }
                AuthEvent::UserSignedOut => {
                    tracing::trace!("user signed out");
                    (callbacks.on_token_expired)();
                }
            }));
            let client = Rc::clone(&self.client);
            disposers.push(Box::new(move || client.unsubscribe(id)));
        }

        let boot: SessionFuture<Result<NormalizedSession, SessionError>> = {
            let this = self.clone();
            let attempt = self.try_signin(&callbacks);
            Box::pin(async move {
                match attempt.await {
                    Ok(session) => Ok(session),
                    Err(err) => {
                        if this.prevent_redirect {
                            tracing::warn!(?err, "redirect prevented due to configuration");
                        } else if this.fresh_redirect {
                            // The page already carried a token fragment which
                            // nonetheless failed silent processing.
                            tracing::trace!(
                                ?err,
                                "redirect suppressed after a suspicious sign-in failure"
                            );
                            this.routes.discard_route();
                            (callbacks.on_session_error)(err);
                        } else {
                            tracing::trace!(?err, "silent sign-in failed, trying a page redirect");
                            this.save_current_route();
                            this.client.signin_redirect();
                        }
                        Err(SessionError::SigninRequired)
                    }
                }
            })
        };

        SessionStartup {
            boot,
            handle: SessionHandle::new(disposers),
        }
    }

    fn try_signin(
        &self,
        callbacks: &SessionCallbacks,
    ) -> SessionFuture<Result<NormalizedSession, AuthClientError>> {
        let this = self.clone();
        let callbacks = callbacks.clone();
        Box::pin(async move {
            match this.client.signin_silent().await {
                Ok(raw) => {
                    tracing::trace!("silent sign-in succeeded");
                    let session = adapt_auth_result(raw);
                    (callbacks.on_token_renewed)(session.clone());

                    if !this.fresh_redirect {
                        this.save_current_route();
                    }

                    Ok(session)
                }
                Err(err) => {
                    tracing::trace!(?err, "silent sign-in failed");

                    if !this.fresh_redirect {
                        this.save_current_route();
                    }

                    (callbacks.on_token_expired)();
                    Err(err)
                }
            }
        })
    }

    fn save_current_route(&self) {
        let Some(url) = self.browser.current_url() else {
            return;
        };
        let route = route_of(&url);
        self.routes.save_route(&route);
        tracing::trace!(%route, "saved current route");
    }
}

/// Detaches the listeners a [`SessionOrchestrator::start`] call attached.
/// Stopping is idempotent; dropping the handle stops it as well.
pub struct SessionHandle {
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl SessionHandle {
    pub(crate) fn new(disposers: Vec<Box<dyn FnOnce()>>) -> Self {
        Self {
            disposers: RefCell::new(disposers),
        }
    }

    /// A handle without any listeners to detach (server-side rendering).
    pub(crate) fn detached() -> Self {
        Self::new(Vec::new())
    }

    /// Whether any listeners are still attached.
    pub fn is_active(&self) -> bool {
        !self.disposers.borrow().is_empty()
    }

    /// Detach all listeners.
    pub fn stop(&self) {
        let disposers: Vec<_> = self.disposers.borrow_mut().drain(..).collect();
        if !disposers.is_empty() {
            tracing::trace!("detaching session listeners");
        }
        for dispose in disposers {
            dispose();
        }
    }
}

impl Debug for SessionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
