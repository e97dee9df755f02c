//! Authentication: third-party identity assertions in, locally signed bearer
//! tokens out.

pub mod identity;
pub mod token;

pub use identity::{GoogleIdentityVerifier, IdentityVerifier, VerifiedIdentity};
pub use token::{AuthenticatedUser, IssuedToken, TokenIssuer};
