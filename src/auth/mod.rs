//! Email/password authentication with code-based verification
//!
//! Models the auth collaborator the service delegates to: accounts sign up
//! with an email and password, confirm themselves with a numeric code sent
//! by email, and then sign in to receive an opaque session token. Every
//! authenticated request resolves its bearer token through the
//! [`SessionStore`].

pub mod email;
pub mod provider;
pub mod session;

pub use email::{EmailMessage, InboxMailer, Mailer};
pub use provider::UserPool;
pub use session::{Session, SessionStore, SessionToken};
