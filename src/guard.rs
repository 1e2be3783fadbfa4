//! Route guard.
//!
//! A guard decides, before a screen is built, whether navigation proceeds or
//! is redirected. It only looks at whether a session token is present. A
//! stale or forged token still proceeds; the API is the real authorization
//! boundary.

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// Who may enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessClass {
    /// Only reachable without a session (login, signup, password recovery).
    PublicOnly,
    /// Only reachable with a session.
    AuthOnly,
    Unrestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    RedirectTo(&'static str),
}

pub fn evaluate(access: AccessClass, session_present: bool) -> Decision {
    match (access, session_present) {
        (AccessClass::PublicOnly, true) => Decision::RedirectTo(HOME_PATH),
        (AccessClass::AuthOnly, false) => Decision::RedirectTo(LOGIN_PATH),
        _ => Decision::Proceed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table() {
        let cases = [
            (AccessClass::PublicOnly, true, Decision::RedirectTo("/")),
            (AccessClass::PublicOnly, false, Decision::Proceed),
            (AccessClass::AuthOnly, true, Decision::Proceed),
            (AccessClass::AuthOnly, false, Decision::RedirectTo("/login")),
            (AccessClass::Unrestricted, true, Decision::Proceed),
            (AccessClass::Unrestricted, false, Decision::Proceed),
        ];
        for (access, present, expected) in cases {
            assert_eq!(evaluate(access, present), expected, "{access:?} present={present}");
        }
    }
}
