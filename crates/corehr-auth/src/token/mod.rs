//! Signed-token issuance and verification.
//!
//! Three independent token domains, each signed with its own secret so a
//! token minted for one purpose can never be presented as another.

pub mod claims;
pub mod service;

pub use claims::{AccessClaims, RefreshClaims, ResetClaims, TokenError};
pub use service::{IssuedRefreshToken, TokenService};
