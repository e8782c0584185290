use crate::client::SessionFuture;
use crate::error::SessionError;
use crate::orchestrator::SessionCallbacks;
use crate::session::{NormalizedSession, RawAuthResult, RawClaims, adapt_auth_result};

/// Token published by the mocked auth provider. Accepted by nothing.
pub const MOCK_ACCESS_TOKEN: &str = "valid-mocked-oauth-bogus-token";

const MOCK_TOKEN_LIFETIME: time::Duration = time::Duration::days(365);

/// Drop-in substitute for a started session orchestrator in non-production
/// environments. Synchronously publishes a fixed session valid for one year
/// through `on_token_renewed` and resolves immediately.
///
/// Whether the mock is used instead of the real orchestrator is an external
/// decision, typically a non-production configuration flag.
pub fn mock_session(
    callbacks: &SessionCallbacks,
    mock_locale: &str,
) -> SessionFuture<Result<NormalizedSession, SessionError>> {
    tracing::warn!("using mocked authorization due to configuration");

    let session = adapt_auth_result(RawAuthResult {
        access_token: MOCK_ACCESS_TOKEN.to_owned(),
        expires_in: MOCK_TOKEN_LIFETIME.whole_seconds(),
        profile: mock_claims(mock_locale),
    });
    (callbacks.on_token_renewed)(session.clone());

    Box::pin(async move { Ok(session) })
}

fn mock_claims(locale: &str) -> RawClaims {
    serde_json::from_value(serde_json::json!({
        "account": "mockaccount",
        "azp": "test-client",
        "email": "test@example.com",
        "family_name": "Client",
        "given_name": "Test",
        "locale": locale,
        "name": "Test Client",
        "sub": "mock-user",
    }))
    .expect("object literal")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::task::{Context, Poll, Waker};

    use assertr::prelude::*;

    use super::*;

    fn drive<T>(mut future: SessionFuture<T>) -> T {
        let mut cx = Context::from_waker(Waker::noop());
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(value) => value,
            Poll::Pending => panic!("mock session must resolve immediately"),
        }
    }

    #[test]
    fn resolves_and_renews_exactly_once() {
        let renewed: Rc<RefCell<Vec<NormalizedSession>>> = Rc::default();
        let in_callback = Rc::clone(&renewed);
        let callbacks = SessionCallbacks::new(
            move |session| in_callback.borrow_mut().push(session),
            || panic!("mock auth never expires a token"),
            |_| panic!("mock auth never raises a session error"),
        );

        let session = drive(mock_session(&callbacks, "de-DE")).unwrap();

        assert_that(renewed.borrow().len()).is_equal_to(1);
        assert_that(renewed.borrow()[0].clone()).is_equal_to(session);
    }

    #[test]
    fn published_session_is_valid_for_one_year() {
        let callbacks = SessionCallbacks::new(|_| {}, || {}, |_| {});
        let session = drive(mock_session(&callbacks, "en-GB")).unwrap();

        assert_that(session.expires_in_seconds).is_equal_to(31_536_000);
        assert_that(session.access_token.as_str()).is_equal_to(MOCK_ACCESS_TOKEN);
    }

    #[test]
    fn configured_mock_locale_is_published() {
        let callbacks = SessionCallbacks::new(|_| {}, || {}, |_| {});
        let session = drive(mock_session(&callbacks, "de-DE")).unwrap();

        assert_that(session.locale.as_str()).is_equal_to("de-DE");
        assert_that(session.profile.locale).is_equal_to(Some("de-DE".to_owned()));
        assert_that(session.profile.given_name).is_equal_to(Some("Test".to_owned()));
        assert_that(session.profile.sub.as_str()).is_equal_to("mock-user");
    }
}
