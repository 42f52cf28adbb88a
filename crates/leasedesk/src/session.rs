use std::fmt;

///
/// Session
///
/// The authenticated identity, passed explicitly to whatever needs it.
/// Holds at most one bearer token; there is no ambient copy anywhere else.
///

#[derive(Clone, Default, Eq, PartialEq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }

    /// Start a session, replacing any previous token.
    pub fn login(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
        tracing::debug!("session started");
    }

    /// End the session. Returns whether there was anything to end.
    pub fn logout(&mut self) -> bool {
        let had = self.token.take().is_some();
        if had {
            tracing::debug!("session ended");
        }

        had
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value for an `Authorization` header, if authenticated.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

// never print the token
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_then_logout() {
        let mut session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert_eq!(session.authorization(), None);

        session.login("tok-1");
        assert_eq!(session.authorization().as_deref(), Some("Bearer tok-1"));

        session.login("tok-2");
        assert_eq!(session.token(), Some("tok-2"));

        assert!(session.logout());
        assert!(!session.logout());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn debug_hides_token() {
        let mut session = Session::default();
        session.login("secret-token");

        let shown = format!("{session:?}");
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("authenticated: true"));
    }
}
