use serde::{Deserialize, Serialize};

use crate::AccessToken;
use crate::profile::{UserProfile, map_user_profile};

/// Raw identity claims as delivered by the auth client, untouched.
pub type RawClaims = serde_json::Map<String, serde_json::Value>;

/// Locale published when the identity provider did not report one.
pub const DEFAULT_LOCALE: &str = "en-GB";

/// The raw sign-in result published by the auth client capability.
///
/// All fields default, so partial results (or none at all) still adapt into
/// a well-formed session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawAuthResult {
    pub access_token: AccessToken,
    pub expires_in: i64,
    pub profile: RawClaims,
}

/// The session information published to the application after a successful
/// sign-in.
///
/// Only ever produced by [`adapt_auth_result`]; no other code path assembles
/// one by hand.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NormalizedSession {
    /// Access token to be used in an authorization header.
    pub access_token: AccessToken,

    /// Remaining validity of the access token at the time it was issued.
    pub expires_in_seconds: i64,

    /// The raw identity claims, passed through unmodified.
    pub id_token: RawClaims,

    /// The user's locale, defaulting to [`DEFAULT_LOCALE`] when the claims
    /// carry none.
    pub locale: String,

    /// Mapped user profile.
    pub profile: UserProfile,
}

impl NormalizedSession {
    /// The access token lifetime as a duration.
    pub fn expires_in(&self) -> time::Duration {
        time::Duration::seconds(self.expires_in_seconds)
    }
}

/// Adapt a raw sign-in result into the session shape published to the
/// application. Pure and total: missing fields already defaulted in
/// [`RawAuthResult`], a missing or non-string locale claim falls back to
/// [`DEFAULT_LOCALE`].
pub fn adapt_auth_result(raw: RawAuthResult) -> NormalizedSession {
    let locale = raw
        .profile
        .get("locale")
        .and_then(|it| it.as_str())
        .unwrap_or(DEFAULT_LOCALE)
        .to_owned();

    NormalizedSession {
        access_token: raw.access_token,
        expires_in_seconds: raw.expires_in,
        locale,
        profile: map_user_profile(&raw.profile),
        id_token: raw.profile,
    }
}

#[cfg(test)]
mod tests {
    use assertr::prelude::*;

    use super::*;

    fn claims(json: serde_json::Value) -> RawClaims {
        match json {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn locale_defaults_when_claims_lack_one() {
        let session = adapt_auth_result(RawAuthResult {
            access_token: "token".to_owned(),
            expires_in: 60,
            profile: RawClaims::new(),
        });
        assert_that(session.locale.as_str()).is_equal_to("en-GB");
    }

    #[test]
    fn locale_defaults_when_claim_is_not_a_string() {
        let session = adapt_auth_result(RawAuthResult {
            profile: claims(serde_json::json!({ "locale": 42 })),
            ..Default::default()
        });
        assert_that(session.locale.as_str()).is_equal_to("en-GB");
    }

    #[test]
    fn locale_is_taken_from_claims_when_present() {
        let session = adapt_auth_result(RawAuthResult {
            profile: claims(serde_json::json!({ "locale": "de-DE" })),
            ..Default::default()
        });
        assert_that(session.locale.as_str()).is_equal_to("de-DE");
    }

    #[test]
    fn token_fields_pass_through() {
        let session = adapt_auth_result(RawAuthResult {
            access_token: "abc".to_owned(),
            expires_in: 1234,
            profile: RawClaims::new(),
        });
        assert_that(session.access_token.as_str()).is_equal_to("abc");
        assert_that(session.expires_in_seconds).is_equal_to(1234);
        assert_that(session.expires_in()).is_equal_to(time::Duration::seconds(1234));
    }

    #[test]
    fn raw_claims_pass_through_as_id_token() {
        let profile = claims(serde_json::json!({ "sub": "user-1", "custom": ["a", "b"] }));
        let session = adapt_auth_result(RawAuthResult {
            profile: profile.clone(),
            ..Default::default()
        });
        assert_that(session.id_token).is_equal_to(profile);
    }

    #[test]
    fn adapting_an_empty_result_yields_defaults() {
        let session = adapt_auth_result(RawAuthResult::default());
        assert_that(session.access_token.as_str()).is_equal_to("");
        assert_that(session.expires_in_seconds).is_equal_to(0);
        assert_that(session.locale.as_str()).is_equal_to("en-GB");
    }
}
