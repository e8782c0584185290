use serde::{Deserialize, Serialize};

use crate::session::RawClaims;

/// User profile mapped out of the raw identity claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProfile {
    /// Subject identifier. Empty when the claims carry none.
    pub sub: String,
    pub account: Option<String>,
    /// Authorized party, i.e. the client id the token was issued to.
    pub azp: Option<String>,
    pub email: Option<String>,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub name: Option<String>,
    pub locale: Option<String>,
}

fn string_claim(claims: &RawClaims, key: &str) -> Option<String> {
    claims.get(key).and_then(|it| it.as_str()).map(str::to_owned)
}

/// Map raw identity claims into a [`UserProfile`]. Total: missing or
/// mistyped claims simply yield empty fields.
pub fn map_user_profile(claims: &RawClaims) -> UserProfile {
    UserProfile {
        sub: string_claim(claims, "sub").unwrap_or_default(),
        account: string_claim(claims, "account"),
        azp: string_claim(claims, "azp"),
        email: string_claim(claims, "email"),
        family_name: string_claim(claims, "family_name"),
        given_name: string_claim(claims, "given_name"),
        name: string_claim(claims, "name"),
        locale: string_claim(claims, "locale"),
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
    fn maps_known_claims() {
        let profile = map_user_profile(&claims(serde_json::json!({
            "sub": "user-1",
            "account": "acme",
            "azp": "test-client",
            "email": "jane@example.com",
            "family_name": "Doe",
            "given_name": "Jane",
            "name": "Jane Doe",
            "locale": "en-GB",
        })));

        assert_that(profile.sub.as_str()).is_equal_to("user-1");
        assert_that(profile.account).is_equal_to(Some("acme".to_owned()));
        assert_that(profile.azp).is_equal_to(Some("test-client".to_owned()));
        assert_that(profile.email).is_equal_to(Some("jane@example.com".to_owned()));
        assert_that(profile.family_name).is_equal_to(Some("Doe".to_owned()));
        assert_that(profile.given_name).is_equal_to(Some("Jane".to_owned()));
        assert_that(profile.name).is_equal_to(Some("Jane Doe".to_owned()));
        assert_that(profile.locale).is_equal_to(Some("en-GB".to_owned()));
    }

    #[test]
    fn missing_claims_yield_defaults() {
        let profile = map_user_profile(&RawClaims::new());
        assert_that(profile.sub.as_str()).is_equal_to("");
        assert_that(profile.email).is_equal_to(None::<String>);
    }

    #[test]
    fn mistyped_claims_are_ignored() {
        let profile = map_user_profile(&claims(serde_json::json!({
            "sub": 42,
            "email": ["not", "a", "string"],
            "name": "Jane Doe",
        })));
        assert_that(profile.sub.as_str()).is_equal_to("");
        assert_that(profile.email).is_equal_to(None::<String>);
        assert_that(profile.name).is_equal_to(Some("Jane Doe".to_owned()));
    }

    #[test]
    fn unknown_claims_are_ignored() {
        let profile = map_user_profile(&claims(serde_json::json!({
            "sub": "user-1",
            "tenant": "t-1",
        })));
        assert_that(profile.sub.as_str()).is_equal_to("user-1");
    }
}
