use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::matcher::{MatcherError, RouteMatcher};
use crate::auth::{verify_session_token, SessionClaims, SessionError};
use crate::config::SecurityConfig;

/// Result of an authentication check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    Redirect(String),
}

/// Decides whether a request may proceed. The gate holds no policy of its own.
pub trait AuthProvider: Send + Sync {
    fn authorize(&self, uri: &Uri, headers: &HeaderMap) -> AuthDecision;
}

/// Session-cookie provider for the dashboard:
/// - protected pages require a valid session, otherwise redirect to login with a callback URL
/// - a signed-in user visiting any other gated page is sent to the dashboard
pub struct SessionAuthProvider {
    secret: String,
    cookie_name: String,
    login_path: String,
    protected_prefix: String,
}

impl SessionAuthProvider {
    pub fn new(config: &SecurityConfig) -> Self {
        if config.session_secret.is_empty() {
            tracing::warn!("AUTH_SECRET is not set; every session will be treated as signed out");
        }
        Self {
            secret: config.session_secret.clone(),
            cookie_name: config.session_cookie.clone(),
            login_path: config.login_path.clone(),
            protected_prefix: config.protected_prefix.clone(),
        }
    }

    /// Authenticated session, if the request carries a valid one
    pub fn session(&self, headers: &HeaderMap) -> Option<SessionClaims> {
        let token = extract_session_token(headers, &self.cookie_name)?;
        match verify_session_token(&token, &self.secret) {
            Ok(claims) => Some(claims),
            Err(SessionError::MissingSecret) => None,
            Err(e) => {
                tracing::warn!("Ignoring session: {}", e);
                None
            }
        }
    }

    fn is_protected(&self, path: &str) -> bool {
        path == self.protected_prefix
            || path
                .strip_prefix(self.protected_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    fn login_redirect(&self, uri: &Uri) -> String {
        let callback = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let encoded: String = url::form_urlencoded::byte_serialize(callback.as_bytes()).collect();
        format!("{}?callbackUrl={}", self.login_path, encoded)
    }
}

impl AuthProvider for SessionAuthProvider {
    fn authorize(&self, uri: &Uri, headers: &HeaderMap) -> AuthDecision {
        let signed_in = self.session(headers).is_some();

        if self.is_protected(uri.path()) {
            if signed_in {
                AuthDecision::Allow
            } else {
                AuthDecision::Redirect(self.login_redirect(uri))
            }
        } else if signed_in {
            AuthDecision::Redirect(self.protected_prefix.clone())
        } else {
            AuthDecision::Allow
        }
    }
}

/// Matcher plus provider, shared by every request
#[derive(Clone)]
pub struct RouteGate {
    matcher: RouteMatcher,
    provider: Arc<dyn AuthProvider>,
}

impl RouteGate {
    pub fn new(matcher: RouteMatcher, provider: Arc<dyn AuthProvider>) -> Self {
        Self { matcher, provider }
    }

    /// Gate configured with the session provider
    pub fn from_config(config: &SecurityConfig) -> Result<Self, MatcherError> {
        let matcher = RouteMatcher::parse(&config.route_matcher)?;
        Ok(Self::new(matcher, Arc::new(SessionAuthProvider::new(config))))
    }

    pub fn check(&self, uri: &Uri, headers: &HeaderMap) -> AuthDecision {
        if !self.matcher.matches(uri.path()) {
            return AuthDecision::Allow;
        }
        self.provider.authorize(uri, headers)
    }
}

/// Route gate middleware: runs before every matched path is served
pub async fn route_gate(State(gate): State<RouteGate>, request: Request, next: Next) -> Response {
    match gate.check(request.uri(), request.headers()) {
        AuthDecision::Allow => next.run(request).await,
        AuthDecision::Redirect(location) => {
            tracing::debug!("Route gate redirecting {} to {}", request.uri().path(), location);
            Redirect::temporary(&location).into_response()
        }
    }
}

/// Extract the session token from the session cookie or a Bearer Authorization header
fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string());

    from_cookie.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}
