use thiserror::Error;

/// Failures reported by the hosted auth provider.
///
/// `Rejected` means the provider answered and said no (bad password, expired
/// code, unknown refresh token). `Unavailable` means we never got an answer we
/// could interpret.
#[derive(Error, Debug)]
pub enum AuthProviderError {
    #[error("{message}")]
    Rejected { message: String, status: u16 },

    #[error("Auth provider unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

impl AuthProviderError {
    pub fn rejected(message: impl Into<String>, status: u16) -> Self {
        Self::Rejected {
            message: message.into(),
            status,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl From<reqwest::Error> for AuthProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_provider_message() {
        let err = AuthProviderError::rejected("Invalid login credentials", 400);
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(err.is_rejected());
    }

    #[test]
    fn test_unavailable_wraps_source() {
        let err: AuthProviderError = anyhow::anyhow!("connection refused").into();
        assert!(!err.is_rejected());
        assert!(err.to_string().contains("connection refused"));
    }
}
