pub mod authenticator;
pub mod firebase;
pub mod token_codec;

pub use authenticator::{AuthError, Authenticator, Identity};
pub use firebase::FirebaseAuthenticator;
pub use token_codec::{SignedTokenAuthenticator, TokenCodec, TokenError};
