//! Which front-end pages need a session and where to send the visitor otherwise.

const PROTECTED_PREFIXES: &[&str] = &["/boxes", "/items", "/search"];
const AUTH_ONLY_PATHS: &[&str] = &["/login", "/signup", "/reset-password"];

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Requires a signed-in user.
    Protected,
    /// Only meaningful while signed out.
    AuthOnly,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Continue,
    Redirect(String),
}

/// `/boxes` matches `/boxes` and `/boxes/...` but not `/boxesfoo`.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub fn classify(path: &str) -> RouteKind {
    if PROTECTED_PREFIXES.iter().any(|p| under(path, p)) {
        RouteKind::Protected
    } else if AUTH_ONLY_PATHS.iter().any(|p| under(path, p)) {
        RouteKind::AuthOnly
    } else {
        RouteKind::Public
    }
}

/// Anonymous visitors to protected pages go to the login page with the
/// original path in `redirectTo`; signed-in visitors to auth pages go home.
pub fn guard(path: &str, authenticated: bool) -> RouteDecision {
    match (classify(path), authenticated) {
        (RouteKind::Protected, false) => RouteDecision::Redirect(format!(
            "{}?redirectTo={}",
            LOGIN_PATH,
            urlencoding::encode(path)
        )),
        (RouteKind::AuthOnly, true) => RouteDecision::Redirect(HOME_PATH.to_string()),
        _ => RouteDecision::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("/boxes"), RouteKind::Protected);
        assert_eq!(classify("/boxes/123/edit"), RouteKind::Protected);
        assert_eq!(classify("/items/new"), RouteKind::Protected);
        assert_eq!(classify("/search"), RouteKind::Protected);
        assert_eq!(classify("/login"), RouteKind::AuthOnly);
        assert_eq!(classify("/reset-password"), RouteKind::AuthOnly);
        assert_eq!(classify("/"), RouteKind::Public);
        assert_eq!(classify("/boxesfoo"), RouteKind::Public);
    }

    #[test]
    fn test_anonymous_redirected_to_login() {
        assert_eq!(
            guard("/boxes/abc", false),
            RouteDecision::Redirect("/login?redirectTo=%2Fboxes%2Fabc".to_string())
        );
        assert_eq!(guard("/boxes/abc", true), RouteDecision::Continue);
    }

    #[test]
    fn test_signed_in_redirected_home() {
        assert_eq!(guard("/signup", true), RouteDecision::Redirect("/".to_string()));
        assert_eq!(guard("/signup", false), RouteDecision::Continue);
        assert_eq!(guard("/", false), RouteDecision::Continue);
    }
}
