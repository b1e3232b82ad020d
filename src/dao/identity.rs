//! Sign-in flow seam and the fixed account directory behind it.

use std::sync::Arc;

use futures::future::{self, BoxFuture};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authenticated principal returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable account id; doubles as the member id.
    pub uid: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Parameters of one interactive sign-in attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInPrompt {
    /// Always ask the user which account to use, even with a single candidate.
    pub select_account: bool,
    /// Account chosen in the account picker (uid or email).
    pub login_hint: Option<String>,
}

/// Failures of the sign-in flow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The user dismissed the account picker without choosing.
    #[error("sign-in was cancelled")]
    Cancelled,
    /// The login hint matched no known account.
    #[error("no account matches `{0}`")]
    UnknownAccount(String),
}

/// Interactive authentication flow (popup or equivalent).
pub trait IdentityProvider: Send + Sync {
    /// Run one sign-in attempt and resolve to the chosen identity.
    fn authenticate(&self, prompt: SignInPrompt) -> BoxFuture<'static, Result<Identity, AuthError>>;
}

/// Identity provider backed by a fixed list of accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: Arc<Vec<Identity>>,
}

impl AccountDirectory {
    /// Directory offering exactly the given accounts in the picker.
    pub fn new(accounts: Vec<Identity>) -> Self {
        Self {
            accounts: Arc::new(accounts),
        }
    }

    fn pick(&self, prompt: &SignInPrompt) -> Result<Identity, AuthError> {
        match &prompt.login_hint {
            Some(hint) => self
                .accounts
                .iter()
                .find(|account| account.uid == *hint || account.email.as_deref() == Some(hint.as_str()))
                .cloned()
                .ok_or_else(|| AuthError::UnknownAccount(hint.clone())),
            // A lone account is the only possible pick, forced selection or not.
            None => match self.accounts.as_slice() {
                [only] => Ok(only.clone()),
                _ => Err(AuthError::Cancelled),
            },
        }
    }
}

impl IdentityProvider for AccountDirectory {
    fn authenticate(&self, prompt: SignInPrompt) -> BoxFuture<'static, Result<Identity, AuthError>> {
        Box::pin(future::ready(self.pick(&prompt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> AccountDirectory {
        AccountDirectory::new(vec![
            Identity {
                uid: "u1".into(),
                display_name: "Ada".into(),
                email: Some("ada@example.com".into()),
            },
            Identity {
                uid: "u2".into(),
                display_name: "Bo".into(),
                email: None,
            },
        ])
    }

    #[tokio::test]
    async fn hint_matches_uid_or_email() {
        let directory = directory();
        let by_email = directory
            .authenticate(SignInPrompt {
                select_account: true,
                login_hint: Some("ada@example.com".into()),
            })
            .await
            .unwrap();
        assert_eq!(by_email.uid, "u1");

        let by_uid = directory
            .authenticate(SignInPrompt {
                select_account: true,
                login_hint: Some("u2".into()),
            })
            .await
            .unwrap();
        assert_eq!(by_uid.display_name, "Bo");
    }

    #[tokio::test]
    async fn forced_selection_without_choice_is_cancelled() {
        let err = directory()
            .authenticate(SignInPrompt {
                select_account: true,
                login_hint: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Cancelled);
    }

    #[tokio::test]
    async fn single_account_answers_forced_selection() {
        let directory = AccountDirectory::new(vec![Identity {
            uid: "solo".into(),
            display_name: "Solo".into(),
            email: None,
        }]);
        let picked = directory
            .authenticate(SignInPrompt {
                select_account: true,
                login_hint: None,
            })
            .await
            .unwrap();
        assert_eq!(picked.uid, "solo");
    }

    #[tokio::test]
    async fn unknown_hint_is_rejected() {
        let err = directory()
            .authenticate(SignInPrompt {
                select_account: false,
                login_hint: Some("nobody".into()),
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UnknownAccount("nobody".into()));
    }
}
