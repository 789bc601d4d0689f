//! Credential and session management.
//!
//! The [`Session`] holds the current [`Configuration`](crate::Configuration)
//! and is the only shared mutable state in the client. Credentials are
//! rotated by publishing a new configuration:
//!
//! ```no_run
//! use checkout_api::{Configuration, Session};
//!
//! # async fn example() -> checkout_api::Result<()> {
//! let session = Session::new(Configuration::builder("acme").token("sk_test_old").build()?);
//!
//! // Somewhere else, after obtaining a fresh token:
//! session.replace_token(Some("sk_test_new".to_string())).await;
//! # Ok(())
//! # }
//! ```

mod session;

pub use session::Session;
