use reqwest::StatusCode;

/// What the application should do after the server rejected a call with a
/// non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// 401: not logged in.
    RedirectToLogin,

    /// 403: the credential expired or was revoked. Drop it, then log in again.
    EvictAndRedirect,

    /// 404: nothing to do.
    Ignore,

    /// Any other status: report the server's message.
    Log(String),
}

impl Effect {
    pub fn for_status(status: StatusCode, message: impl Into<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::RedirectToLogin,
            StatusCode::FORBIDDEN => Self::EvictAndRedirect,
            StatusCode::NOT_FOUND => Self::Ignore,
            _ => Self::Log(message.into()),
        }
    }

    pub fn evicts_credential(&self) -> bool {
        matches!(self, Self::EvictAndRedirect)
    }

    pub fn redirects(&self) -> bool {
        matches!(self, Self::RedirectToLogin | Self::EvictAndRedirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_status() {
        let cases = [
            (401, Effect::RedirectToLogin),
            (403, Effect::EvictAndRedirect),
            (404, Effect::Ignore),
            (400, Effect::Log(String::from("msg"))),
            (500, Effect::Log(String::from("msg"))),
            (503, Effect::Log(String::from("msg"))),
        ];
        for (status, expect) in cases {
            let status = StatusCode::from_u16(status).unwrap();
            assert_eq!(Effect::for_status(status, "msg"), expect, "status {status}");
        }
    }

    #[test]
    fn test_flags() {
        assert!(Effect::RedirectToLogin.redirects());
        assert!(!Effect::RedirectToLogin.evicts_credential());

        assert!(Effect::EvictAndRedirect.redirects());
        assert!(Effect::EvictAndRedirect.evicts_credential());

        assert!(!Effect::Ignore.redirects());
        assert!(!Effect::Log(String::new()).redirects());
        assert!(!Effect::Log(String::new()).evicts_credential());
    }
}
