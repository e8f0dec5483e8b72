//! Community-token issuance.
//!
//! A community issues its own fungible token through a founder-voted
//! proposal. On approval the token is recorded with its airdrop and
//! allocation budgets, its symbol joins the global token registry, and the
//! community record links the new token id. The distribution modules spend
//! against the budgets recorded here.

pub mod issuance;
pub mod token;

pub use issuance::{TokenIssuance, TokenParams};
pub use token::{CommunityToken, TokenStore};
