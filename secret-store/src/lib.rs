//! Credential provider for the review hook.
//!
//! One read against a secret store, decoded into a [`CredentialBundle`].
//! Failures are reported with exactly one of three causes (store, parse,
//! unexpected); nothing is retried.

pub mod credentials;
pub mod errors;
pub mod stores;

pub use credentials::{CredentialBundle, SecretPayload};
pub use errors::{SecretError, SecretFailureCause, SecretResult, StoreError};
pub use stores::{SecretLocator, SecretSource, SecretStoreClient, SecretStoreConfig};
