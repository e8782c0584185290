#[cfg(not(feature = "ssr"))]
use std::cell::{Cell, RefCell};
#[cfg(not(feature = "ssr"))]
use std::collections::HashMap;
use std::rc::Rc;

use url::Url;
#[cfg(not(feature = "ssr"))]
use wasm_bindgen::JsCast;
#[cfg(not(feature = "ssr"))]
use wasm_bindgen::closure::Closure;

use crate::client::ListenerId;

/// Name of the document-level event through which the hosting page can
/// request an on-demand silent re-authentication attempt.
pub const SIGNIN_REQUESTED: &str = "rio.core.login.signinrequested";

/// The browser context consumed by the session orchestrator: the current
/// page URL and the document-level sign-in request signal.
pub trait BrowserContext {
    /// The full current URL of the page, including query and fragment.
    /// `None` when there is no browser context (e.g. on the server).
    fn current_url(&self) -> Option<Url>;

    /// Attach a listener for the [`SIGNIN_REQUESTED`] document event.
    /// Returns `None` when no document context exists.
    fn listen_signin_requested(&self, listener: Rc<dyn Fn()>) -> Option<ListenerId>;

    /// Detach a previously attached [`SIGNIN_REQUESTED`] listener.
    fn unlisten_signin_requested(&self, id: ListenerId);
}

/// Dispatch the [`SIGNIN_REQUESTED`] event on the document, asking a running
/// session orchestrator for a silent re-authentication attempt.
pub fn request_signin() {
    #[cfg(not(feature = "ssr"))]
    {
        let Some(document) = web_sys::window().and_then(|it| it.document()) else {
            return;
        };
        match web_sys::CustomEvent::new(SIGNIN_REQUESTED) {
            Ok(event) => {
                let _ = document.dispatch_event(&event);
            }
            Err(err) => {
                tracing::error!(?err, "Could not create the sign-in request event.");
            }
        }
    }
}

/// Whether the URL carries a freshly issued access token, indicating that
/// the browser just returned from an authentication redirect.
///
/// Both the query and a query embedded in the fragment are inspected through
/// a structured parser, so encoded `&`/`=` characters inside parameter
/// values cannot confuse the check.
pub(crate) fn url_carries_access_token(url: &Url) -> bool {
    if url.query().is_some_and(params_carry_access_token) {
        return true;
    }
    match url.fragment() {
        Some(fragment) => {
            // Fragment routers put the parameters behind a `?` inside the
            // fragment; an implicit-flow response may also place them at the
            // very start of it.
            let params = fragment.split_once('?').map_or(fragment, |(_, tail)| tail);
            params_carry_access_token(params)
        }
        None => false,
    }
}

fn params_carry_access_token(params: &str) -> bool {
    url::form_urlencoded::parse(params.as_bytes())
        .any(|(key, value)| key == "access_token" && !value.is_empty())
}

/// The navigation target to restore after a redirect round-trip: the URL's
/// fragment followed by its query, without the leading `#`.
pub(crate) fn route_of(url: &Url) -> String {
    let mut route = String::new();
    if let Some(fragment) = url.fragment() {
        route.push_str(fragment);
    }
    if let Some(query) = url.query() {
        route.push('?');
        route.push_str(query);
    }
    route
}

/// Production [`BrowserContext`] reading `window.location` and listening on
/// the document. Every operation degrades to a no-op when the crate is
/// compiled for the server.
#[derive(Default)]
pub(crate) struct DomBrowserContext {
    #[cfg(not(feature = "ssr"))]
    listeners: RefCell<HashMap<ListenerId, Closure<dyn FnMut(web_sys::Event)>>>,
    #[cfg(not(feature = "ssr"))]
    next_listener_id: Cell<u64>,
}

impl DomBrowserContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[cfg(not(feature = "ssr"))]
impl BrowserContext for DomBrowserContext {
    fn current_url(&self) -> Option<Url> {
        let href = web_sys::window()?.location().href().ok()?;
        Url::parse(&href).ok()
    }

    fn listen_signin_requested(&self, listener: Rc<dyn Fn()>) -> Option<ListenerId> {
        let document = web_sys::window()?.document()?;
        let closure =
            Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| listener());
        if let Err(err) = document
            .add_event_listener_with_callback(SIGNIN_REQUESTED, closure.as_ref().unchecked_ref())
        {
            tracing::error!(?err, "Could not attach the sign-in request listener.");
            return None;
        }

        let id = ListenerId(self.next_listener_id.get());
        self.next_listener_id.set(id.0.wrapping_add(1));
        self.listeners.borrow_mut().insert(id, closure);
        Some(id)
    }

    fn unlisten_signin_requested(&self, id: ListenerId) {
        let Some(closure) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        if let Some(document) = web_sys::window().and_then(|it| it.document()) {
            let _ = document.remove_event_listener_with_callback(
                SIGNIN_REQUESTED,
                closure.as_ref().unchecked_ref(),
            );
        }
    }
}

#[cfg(feature = "ssr")]
impl BrowserContext for DomBrowserContext {
    fn current_url(&self) -> Option<Url> {
        None
    }

    fn listen_signin_requested(&self, _listener: Rc<dyn Fn()>) -> Option<ListenerId> {
        None
    }

    fn unlisten_signin_requested(&self, _id: ListenerId) {}
}

#[cfg(test)]
mod tests {
    use assertr::prelude::*;

    use super::*;

    fn url(input: &str) -> Url {
        Url::parse(input).unwrap()
    }

    #[test]
    fn detects_access_token_in_fragment_query() {
        let url = url("https://app.example.com/#/path?access_token=abc&state=xyz");
        assert_that(url_carries_access_token(&url)).is_true();
    }

    #[test]
    fn detects_access_token_at_fragment_start() {
        let url = url("https://app.example.com/#access_token=abc&token_type=Bearer");
        assert_that(url_carries_access_token(&url)).is_true();
    }

    #[test]
    fn detects_access_token_in_query() {
        let url = url("https://app.example.com/?access_token=abc");
        assert_that(url_carries_access_token(&url)).is_true();
    }

    #[test]
    fn ignores_urls_without_access_token() {
        let url = url("https://app.example.com/#/path?filter=active");
        assert_that(url_carries_access_token(&url)).is_false();
    }

    #[test]
    fn ignores_empty_access_token_values() {
        let url = url("https://app.example.com/#access_token=&state=xyz");
        assert_that(url_carries_access_token(&url)).is_false();
    }

    #[test]
    fn encoded_token_values_do_not_leak_parameters() {
        // The encoded `&access_token=x` inside the value must not register.
        let url = url("https://app.example.com/#/path?state=a%26access_token%3Dx");
        assert_that(url_carries_access_token(&url)).is_false();
    }

    #[test]
    fn route_concatenates_fragment_and_query() {
        let route = route_of(&url("https://app.example.com/?lang=de#/fleet"));
        assert_that(route.as_str()).is_equal_to("/fleet?lang=de");
    }

    #[test]
    fn route_has_no_leading_hash() {
        let route = route_of(&url("https://app.example.com/#/dashboard?filter=active"));
        assert_that(route.as_str()).is_equal_to("/dashboard?filter=active");
    }

    #[test]
    fn route_of_plain_url_is_empty() {
        let route = route_of(&url("https://app.example.com/"));
        assert_that(route.as_str()).is_equal_to("");
    }
}
