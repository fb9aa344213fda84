//! Signed session tokens: `base64(payload).hex(hmac_sha256(secret, base64(payload)))`.

pub mod claims;
pub mod codec;

pub use claims::TokenPayload;
pub use codec::{INVALID_TOKEN, TokenCodec};
