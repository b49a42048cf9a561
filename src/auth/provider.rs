//! The user pool: sign-up, confirmation, sign-in, sign-out

use crate::auth::email::{EmailMessage, Mailer};
use crate::auth::session::{Session, SessionStore, SessionToken};
use crate::config::VerificationEmailConfig;
use crate::core::error::{AppResult, AuthError, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

struct Account {
    user_id: Uuid,
    password_hash: String,
    confirmed: bool,
    verification_code: String,
}

/// Email/password user pool with code-based account verification
///
/// Sign-up stores the account unconfirmed and emails a 6-digit code; sign-in
/// is refused until the code has been confirmed. Passwords are stored as
/// bcrypt hashes only.
pub struct UserPool {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: SessionStore,
    mailer: Arc<dyn Mailer>,
    email: VerificationEmailConfig,
}

impl UserPool {
    pub fn new(
        sessions: SessionStore,
        mailer: Arc<dyn Mailer>,
        email: VerificationEmailConfig,
    ) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions,
            mailer,
            email,
        }
    }

    /// Register a new account and send its verification code
    pub fn sign_up(&self, email: &str, password: &str) -> AppResult<()> {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let code = generate_code();

        {
            let mut accounts = self.accounts.write().map_err(|e| {
                StorageError::LockPoisoned {
                    message: e.to_string(),
                }
            })?;

            if accounts.contains_key(email) {
                return Err(AuthError::EmailTaken {
                    email: email.to_string(),
                }
                .into());
            }

            accounts.insert(
                email.to_string(),
                Account {
                    user_id: Uuid::new_v4(),
                    password_hash,
                    confirmed: false,
                    verification_code: code.clone(),
                },
            );
        }

        tracing::info!(email = %email, "account created, verification pending");
        self.mailer.send(EmailMessage {
            to: email.to_string(),
            subject: self.email.subject.clone(),
            body: self.email.render_body(&code),
        });

        Ok(())
    }

    /// Confirm an account with the emailed verification code
    pub fn confirm(&self, email: &str, code: &str) -> AppResult<()> {
        let mut accounts = self.accounts.write().map_err(|e| {
            StorageError::LockPoisoned {
                message: e.to_string(),
            }
        })?;

        let account = accounts.get_mut(email).ok_or_else(|| {
            AuthError::UnknownAccount {
                email: email.to_string(),
            }
        })?;

        if account.verification_code != code {
            return Err(AuthError::InvalidCode {
                email: email.to_string(),
            }
            .into());
        }

        account.confirmed = true;
        tracing::info!(email = %email, "account confirmed");
        Ok(())
    }

    /// Verify credentials and issue a session
    pub fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let (user_id, password_hash, confirmed) = {
            let accounts = self.accounts.read().map_err(|e| {
                StorageError::LockPoisoned {
                    message: e.to_string(),
                }
            })?;

            // Unknown email reports the same error as a wrong password
            let account = accounts
                .get(email)
                .ok_or(AuthError::InvalidCredentials)?;
            (
                account.user_id,
                account.password_hash.clone(),
                account.confirmed,
            )
        };

        if !bcrypt::verify(password, &password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }
        if !confirmed {
            return Err(AuthError::NotConfirmed {
                email: email.to_string(),
            }
            .into());
        }

        let session = self.sessions.issue(user_id)?;
        tracing::info!(email = %email, "signed in");
        Ok(session)
    }

    /// Terminate a session; unconditionally available and idempotent
    pub fn sign_out(&self, token: &SessionToken) -> AppResult<()> {
        self.sessions.revoke(token)
    }

    /// The session store this pool issues into
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Generate a 6-digit numeric verification code
fn generate_code() -> String {
    let bytes = *Uuid::new_v4().as_bytes();
    let n = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    format!("{:06}", n % 1_000_000)
}
