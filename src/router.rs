//! Client-side router.
//!
//! A static table of routes, all children of the shared root layout. Each
//! route carries an access class; the guard runs as the route's loader step
//! and only when it lets navigation through is the screen built.

use std::collections::HashMap;

use thiserror::Error;

use crate::guard::{self, AccessClass, Decision};
use crate::session::Session;

/// Extracted dynamic segments, passed to screens as untyped strings.
pub type Params = HashMap<String, String>;

/// Upper bound on chained guard redirects within one navigation.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("route not found: {0}")]
    NotFound(String),
    #[error("missing parameter: {0}")]
    MissingParameter(String),
    #[error("redirect loop while resolving {0}")]
    RedirectLoop(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteId {
    Login,
    Signup,
    ForgotPassword,
    ResetPassword,
    Home,
    CreateTask,
    EditTask,
    UpdateUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// A path pattern such as `/edit-task/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        let segments = split(pattern)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns extracted params when `path` matches. Query strings and
    /// trailing slashes are ignored.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let parts: Vec<&str> = split(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(s) if s == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }

    /// Builds a concrete path from params.
    pub fn reverse(&self, params: &Params) -> Result<String, RouterError> {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Static(s) => path.push_str(s),
                Segment::Param(name) => path.push_str(
                    params
                        .get(name)
                        .ok_or_else(|| RouterError::MissingParameter(name.clone()))?,
                ),
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub id: RouteId,
    pub pattern: PathPattern,
    pub access: AccessClass,
}

impl RouteDescriptor {
    fn new(id: RouteId, pattern: &str, access: AccessClass) -> Self {
        Self {
            id,
            pattern: PathPattern::new(pattern),
            access,
        }
    }
}

/// Outcome of resolving a path: the route to mount and where navigation
/// actually landed after guard redirects.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub route: RouteId,
    pub path: String,
    pub params: Params,
    /// The originally requested path when a guard redirected.
    pub redirected_from: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<RouteDescriptor>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        use AccessClass::{AuthOnly, PublicOnly};
        Self {
            routes: vec![
                RouteDescriptor::new(RouteId::Login, "/login", PublicOnly),
                RouteDescriptor::new(RouteId::Signup, "/signup", PublicOnly),
                RouteDescriptor::new(RouteId::ForgotPassword, "/forgot-password", PublicOnly),
                RouteDescriptor::new(RouteId::ResetPassword, "/reset-password/:token", PublicOnly),
                RouteDescriptor::new(RouteId::Home, "/", AuthOnly),
                RouteDescriptor::new(RouteId::CreateTask, "/create-task", AuthOnly),
                RouteDescriptor::new(RouteId::EditTask, "/edit-task/:id", AuthOnly),
                RouteDescriptor::new(RouteId::UpdateUser, "/update-user", AuthOnly),
            ],
        }
    }

    pub fn descriptor(&self, id: RouteId) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.id == id)
    }

    /// Builds the path for a route.
    pub fn path_for(&self, id: RouteId, params: &Params) -> Result<String, RouterError> {
        self.descriptor(id)
            .ok_or_else(|| RouterError::NotFound(format!("{id:?}")))?
            .pattern
            .reverse(params)
    }

    pub fn match_path(&self, path: &str) -> Option<(&RouteDescriptor, Params)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    /// Matches `path` and runs the guard, following redirects.
    pub fn resolve(&self, path: &str, session: &Session) -> Result<Resolved, RouterError> {
        let present = session.is_present();
        let mut target = path.to_string();
        let mut redirected_from = None;

        for _ in 0..=MAX_REDIRECTS {
            let (route, params) = self
                .match_path(&target)
                .ok_or_else(|| RouterError::NotFound(target.clone()))?;

            match guard::evaluate(route.access, present) {
                Decision::Proceed => {
                    return Ok(Resolved {
                        route: route.id,
                        path: target,
                        params,
                        redirected_from,
                    });
                }
                Decision::RedirectTo(next) => {
                    tracing::debug!(from = %target, to = next, "guard redirect");
                    redirected_from.get_or_insert_with(|| target.clone());
                    target = next.to_string();
                }
            }
        }

        Err(RouterError::RedirectLoop(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> Session {
        let session = Session::default();
        session.set("token");
        session
    }

    const AUTH_ONLY: [&str; 4] = ["/", "/create-task", "/edit-task/42", "/update-user"];
    const PUBLIC_ONLY: [&str; 4] = ["/login", "/signup", "/forgot-password", "/reset-password/xyz"];

    #[test]
    fn pattern_extracts_params() {
        let pattern = PathPattern::new("/edit-task/:id");
        let params = pattern.matches("/edit-task/abc123").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("abc123"));
        assert!(pattern.matches("/edit-task").is_none());
        assert!(pattern.matches("/edit-task/a/b").is_none());
        assert!(pattern.matches("/create-task").is_none());
    }

    #[test]
    fn pattern_ignores_trailing_slash_and_query() {
        let pattern = PathPattern::new("/reset-password/:token");
        let params = pattern.matches("/reset-password/t0k/?x=1").unwrap();
        assert_eq!(params["token"], "t0k");
    }

    #[test]
    fn root_pattern_matches_only_root() {
        let pattern = PathPattern::new("/");
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("/login").is_none());
    }

    #[test]
    fn reverse_fills_params() {
        let router = Router::new();
        let params = Params::from([("id".to_string(), "7".to_string())]);
        assert_eq!(router.path_for(RouteId::EditTask, &params).unwrap(), "/edit-task/7");
        assert_eq!(router.path_for(RouteId::Home, &Params::new()).unwrap(), "/");
        assert_eq!(
            router.path_for(RouteId::EditTask, &Params::new()),
            Err(RouterError::MissingParameter("id".into()))
        );
    }

    #[test]
    fn auth_only_routes_redirect_to_login_without_session() {
        let router = Router::new();
        let session = Session::default();
        for path in AUTH_ONLY {
            let resolved = router.resolve(path, &session).unwrap();
            assert_eq!(resolved.route, RouteId::Login, "{path}");
            assert_eq!(resolved.path, "/login");
            assert_eq!(resolved.redirected_from.as_deref(), Some(path));
        }
    }

    #[test]
    fn auth_only_routes_mount_with_session() {
        let router = Router::new();
        let session = signed_in();
        for path in AUTH_ONLY {
            let resolved = router.resolve(path, &session).unwrap();
            assert_eq!(resolved.path, path);
            assert_eq!(resolved.redirected_from, None);
        }
    }

    #[test]
    fn public_only_routes_redirect_home_with_session() {
        let router = Router::new();
        let session = signed_in();
        for path in PUBLIC_ONLY {
            let resolved = router.resolve(path, &session).unwrap();
            assert_eq!(resolved.route, RouteId::Home, "{path}");
            assert_eq!(resolved.path, "/");
        }
    }

    #[test]
    fn public_only_routes_mount_without_session() {
        let router = Router::new();
        let session = Session::default();
        for path in PUBLIC_ONLY {
            let resolved = router.resolve(path, &session).unwrap();
            assert_eq!(resolved.path, path);
            assert_eq!(resolved.redirected_from, None);
        }
    }

    #[test]
    fn dynamic_segment_reaches_the_screen() {
        let router = Router::new();
        let resolved = router.resolve("/edit-task/99", &signed_in()).unwrap();
        assert_eq!(resolved.route, RouteId::EditTask);
        assert_eq!(resolved.params["id"], "99");
    }

    #[test]
    fn unknown_path_is_not_found() {
        let router = Router::new();
        assert_eq!(
            router.resolve("/nope", &Session::default()),
            Err(RouterError::NotFound("/nope".into()))
        );
    }
}
