//! Session gate.
//!
//! The session marker is a plain `auth=1` cookie: it carries no user identity,
//! no expiry and no signature, so anyone able to set the cookie is treated as
//! logged in. Acceptable for a single-operator internal tool only.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

pub const SESSION_COOKIE: &str = "auth";
pub const SESSION_MARKER: &str = "1";
pub const LOGIN_PATH: &str = "/login";

const PUBLIC_PREFIXES: &[&str] = &["/login", "/api/auth"];
const PROTECTED_PREFIXES: &[&str] = &["/dashboard"];

const ISSUE_COOKIE: &str = "auth=1; Path=/; HttpOnly; SameSite=Lax";
const CLEAR_COOKIE: &str = "auth=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Protected,
    /// Not listed anywhere; forwarded.
    Unlisted,
}

pub fn classify(path: &str) -> RouteAccess {
    if PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteAccess::Public
    } else if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteAccess::Protected
    } else {
        RouteAccess::Unlisted
    }
}

/// Value of the first `auth` cookie, if any.
fn marker_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

pub fn has_session_marker(headers: &HeaderMap) -> bool {
    marker_value(headers) == Some(SESSION_MARKER)
}

/// `/login?next=<path>` with the path percent-encoded.
pub fn login_redirect_target(path: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(path))
}

pub fn issue_cookie() -> HeaderValue {
    HeaderValue::from_static(ISSUE_COOKIE)
}

pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static(CLEAR_COOKIE)
}

/// Middleware: redirects unauthenticated requests for protected paths to the
/// login page. Never fails.
pub async fn session_gate(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    match classify(&path) {
        RouteAccess::Protected if !has_session_marker(request.headers()) => {
            let target = login_redirect_target(&path);
            debug!(%path, %target, "no session marker, redirecting to login");
            Redirect::temporary(&target).into_response()
        }
        _ => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn classification_uses_prefixes() {
        assert_eq!(classify("/login"), RouteAccess::Public);
        assert_eq!(classify("/api/auth/login"), RouteAccess::Public);
        assert_eq!(classify("/dashboard"), RouteAccess::Protected);
        assert_eq!(classify("/dashboard/invoices"), RouteAccess::Protected);
        assert_eq!(classify("/api/debug/db"), RouteAccess::Unlisted);
        assert_eq!(classify("/"), RouteAccess::Unlisted);
    }

    #[test]
    fn marker_must_be_exactly_one() {
        assert!(has_session_marker(&headers_with_cookie("auth=1")));
        assert!(has_session_marker(&headers_with_cookie("theme=dark; auth=1")));
        assert!(!has_session_marker(&headers_with_cookie("auth=true")));
        assert!(!has_session_marker(&headers_with_cookie("auth=")));
        assert!(!has_session_marker(&headers_with_cookie("xauth=1")));
        assert!(!has_session_marker(&headers_with_cookie("garbage")));
        assert!(!has_session_marker(&HeaderMap::new()));
    }

    #[test]
    fn redirect_target_encodes_path() {
        assert_eq!(login_redirect_target("/dashboard"), "/login?next=%2Fdashboard");
        assert_eq!(
            login_redirect_target("/dashboard/a b"),
            "/login?next=%2Fdashboard%2Fa%20b"
        );
    }

    fn app() -> Router {
        Router::new()
            .route("/dashboard", get(|| async { "desk" }))
            .route("/login", get(|| async { "login" }))
            .route("/other", get(|| async { "other" }))
            .layer(middleware::from_fn(session_gate))
    }

    fn get_req(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn protected_without_marker_redirects() {
        let res = app().oneshot(get_req("/dashboard", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/login?next=%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn protected_with_wrong_marker_redirects() {
        let res = app()
            .oneshot(get_req("/dashboard", Some("auth=0")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn protected_with_marker_is_forwarded() {
        let res = app()
            .oneshot(get_req("/dashboard", Some("auth=1")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn public_and_unlisted_are_forwarded_without_marker() {
        for uri in ["/login", "/other"] {
            let res = app().oneshot(get_req(uri, None)).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{uri}");
        }
    }
}
