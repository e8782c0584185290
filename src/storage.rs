use std::cell::RefCell;

#[cfg(not(feature = "ssr"))]
use codee::string::JsonSerdeCodec;
#[cfg(not(feature = "ssr"))]
use leptos::prelude::*;
#[cfg(not(feature = "ssr"))]
use leptos_use::storage::{StorageType, UseStorageOptions, use_storage_with_options};

/// The route persistence capability: keeps the pre-authentication navigation
/// target alive across redirect round-trips.
pub trait RouteStore {
    /// Remember `route` as the navigation target to restore after the next
    /// sign-in completes. Last writer wins.
    fn save_route(&self, route: &str);

    /// Drop any remembered route.
    fn discard_route(&self);

    /// The currently remembered route, if any.
    fn get_route(&self) -> Option<String>;
}

/// State read once at application start to restore navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialState {
    pub initial_route: Option<String>,
}

/// Read the currently stored route. Pure read, callable at any time.
pub fn retrieve_initial_state(routes: &dyn RouteStore) -> InitialState {
    InitialState {
        initial_route: routes.get_route(),
    }
}

/// A [`RouteStore`] kept entirely in memory. Used in tests, in mocked
/// environments and as the server-side stand-in.
#[derive(Debug, Default)]
pub struct InMemoryRouteStore {
    route: RefCell<Option<String>>,
}

impl RouteStore for InMemoryRouteStore {
    fn save_route(&self, route: &str) {
        *self.route.borrow_mut() = Some(route.to_owned());
    }

    fn discard_route(&self) {
        *self.route.borrow_mut() = None;
    }

    fn get_route(&self) -> Option<String> {
        self.route.borrow().clone()
    }
}

#[cfg(not(feature = "ssr"))]
const ROUTE_STORAGE_KEY: &str = "leptos_oidc_session__route";

/// A [`RouteStore`] backed by the browser's session storage, so the stored
/// route survives the full-page redirect round-trip but stays scoped to the
/// tab that started it.
#[cfg(not(feature = "ssr"))]
pub(crate) struct BrowserRouteStore {
    route: Signal<Option<String>>,
    set_route: WriteSignal<Option<String>>,
    remove: Box<dyn Fn()>,
}

#[cfg(not(feature = "ssr"))]
impl BrowserRouteStore {
    pub(crate) fn new() -> Self {
        let (route, set_route, remove) =
            use_storage_with_options::<Option<String>, JsonSerdeCodec>(
                StorageType::Session,
                ROUTE_STORAGE_KEY,
                UseStorageOptions::default()
                    .initial_value(None::<String>)
                    .listen_to_storage_changes(false)
                    .delay_during_hydration(false)
                    .on_error(|err| {
                        tracing::error!(?err, "Error accessing the stored route.");
                    }),
            );

        Self {
            route,
            set_route,
            remove: Box::new(remove),
        }
    }
}

#[cfg(not(feature = "ssr"))]
impl RouteStore for BrowserRouteStore {
    fn save_route(&self, route: &str) {
        self.set_route.set(Some(route.to_owned()));
    }

    fn discard_route(&self) {
        self.set_route.set(None);
        // Setting `None` will eventually clear the persisted value as well,
        // but we do not rely on that side effect alone and explicitly remove
        // the entry from storage.
        (self.remove)();
    }

    fn get_route(&self) -> Option<String> {
        self.route.get_untracked()
    }
}

#[cfg(test)]
mod tests {
    use assertr::prelude::*;

    use super::*;

    #[test]
    fn save_then_get_roundtrips() {
        let store = InMemoryRouteStore::default();
        store.save_route("/fleet?lang=de");
        assert_that(store.get_route()).is_equal_to(Some("/fleet?lang=de".to_owned()));
    }

    #[test]
    fn last_writer_wins() {
        let store = InMemoryRouteStore::default();
        store.save_route("/first");
        store.save_route("/second");
        assert_that(store.get_route()).is_equal_to(Some("/second".to_owned()));
    }

    #[test]
    fn discard_clears_the_route() {
        let store = InMemoryRouteStore::default();
        store.save_route("/fleet");
        store.discard_route();
        assert_that(store.get_route()).is_equal_to(None::<String>);
    }

    #[test]
    fn initial_state_reflects_the_stored_route() {
        let store = InMemoryRouteStore::default();
        assert_that(retrieve_initial_state(&store).initial_route).is_equal_to(None::<String>);

        store.save_route("/dashboard?filter=active");
        assert_that(retrieve_initial_state(&store).initial_route)
            .is_equal_to(Some("/dashboard?filter=active".to_owned()));
    }
}
