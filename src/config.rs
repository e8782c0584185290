use itertools::Itertools;
use serde::Serialize;
use url::Url;

/// Login configuration consumed at application start. Typically assembled
/// once from environment configuration by the hosting application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    /// Base URL of the identity provider, e.g. "https://auth.example.com".
    pub authority: Url,

    /// The OAuth client id registered for this application.
    pub client_id: String,

    /// Url to which the identity provider redirects after an interactive
    /// sign-in.
    pub redirect_uri: Url,

    /// Url used for the hidden silent-renew flow. Falls back to
    /// `redirect_uri` when absent.
    pub silent_redirect_uri: Option<Url>,

    /// Ordered OAuth scopes, joined with single spaces when deriving the
    /// client settings.
    pub oauth_scope: Vec<String>,

    /// When set, a failed boot sign-in never escalates into a full-page
    /// redirect. The page is left unauthenticated but alive.
    pub prevent_redirect: bool,

    /// Locale reported by the mocked auth provider.
    pub mock_locale: String,
}

/// Settings handed to the OIDC client implementation. Immutable once
/// constructed; built exactly once at application start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSettings {
    pub authority: Url,
    pub client_id: String,
    pub redirect_uri: Url,
    pub silent_redirect_uri: Url,
    pub response_type: &'static str,
    pub scope: String,
    #[serde(rename = "loadUserInfo")]
    pub load_user_info: bool,
}

impl SessionSettings {
    /// Derive the client settings from the login configuration. Pure, no
    /// side effects beyond a trace log of the result.
    pub fn from_config(config: &LoginConfig) -> Self {
        let settings = Self {
            authority: config.authority.clone(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            silent_redirect_uri: config
                .silent_redirect_uri
                .clone()
                .unwrap_or_else(|| config.redirect_uri.clone()),
            response_type: "id_token token",
            scope: config.oauth_scope.iter().map(|it| it.trim()).join(" "),
            load_user_info: false,
        };

        tracing::trace!(?settings, "derived session settings");

        settings
    }
}
