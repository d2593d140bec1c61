use std::fmt;

use log::warn;
use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/login";

/// A location in the application that the navigator can switch to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,

    /// Where the login view should send the user back to once it is done.
    pub redirect: Option<String>,
}

/// Application routing, injected into the client.
///
/// `replace` is fire-and-forget: the client never waits for the navigation
/// to finish.
pub trait Navigator: Send + Sync {
    fn replace(&self, route: &Route);

    /// The location the application is currently showing, if known.
    fn current(&self) -> Option<String> {
        None
    }
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            redirect: None,
        }
    }

    pub fn with_redirect(mut self, redirect: Option<String>) -> Self {
        self.redirect = redirect;
        self
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.redirect {
            Some(ref redirect) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("redirect", redirect)
                    .finish();
                write!(f, "{}?{}", self.path, query)
            }
            None => write!(f, "{}", self.path),
        }
    }
}

/// Navigator for headless use: there is no view to switch to, so the
/// navigation is only reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn replace(&self, route: &Route) {
        warn!("Authentication required, navigate to '{route}'");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_display() {
        let route = Route::new(LOGIN_PATH);
        assert_eq!(route.to_string(), "/login");

        let route = route.with_redirect(Some(String::from("/texts/12")));
        assert_eq!(route.to_string(), "/login?redirect=%2Ftexts%2F12");

        // The location's own query must not leak into the login query.
        let route = route.with_redirect(Some(String::from("/a?x=1&y=2")));
        assert_eq!(route.to_string(), "/login?redirect=%2Fa%3Fx%3D1%26y%3D2");

        let route = route.with_redirect(None);
        assert_eq!(route.to_string(), "/login");
    }

    #[test]
    fn test_default_current() {
        assert_eq!(LogNavigator.current(), None);
    }
}
