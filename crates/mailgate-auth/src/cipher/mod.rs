//! At-rest encryption of stored mail passwords.

pub mod credential;
pub mod key;

pub use credential::CredentialCipher;
pub use key::EncryptionKey;
