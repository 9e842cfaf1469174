//! Authentication core for SBSN.
//!
//! Credential checks, bearer token issuance and verification, secret
//! hashing, and the lookup seam to the user store.

pub mod authenticator;
pub mod claims;
pub mod clock;
pub mod error;
pub mod jwt;
pub mod lookup;
pub mod password;
pub mod principal;
pub mod registrar;
pub mod verifier;


pub use authenticator::CredentialAuthenticator;
pub use claims::Claims;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use jwt::{IssuedToken, SigningKey, TokenIssuer};
pub use lookup::{PrincipalStore, StoreError};
pub use principal::{Credentials, Principal, PrincipalRecord, Secret};
pub use registrar::{AccountStore, NewAccount, Registrar};
pub use verifier::TokenVerifier;
