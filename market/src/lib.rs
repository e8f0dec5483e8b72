//! Marketplace actions: NFT bids and token-offer purchases.
//!
//! Both modules spend community funds through the proposal engine and hand
//! the approved side effect to an external collaborator, specified only at
//! its interface: a [`TokenExchange`] for buying proposals and an
//! [`NftAuction`] for bids. In-memory implementations ship here for wiring
//! and tests.

pub mod bid;
pub mod buying;
pub mod collaborators;

pub use bid::{Bid, BidParams};
pub use buying::{Buying, BuyingParams};
pub use collaborators::{InMemoryAuction, InMemoryExchange, NftAuction, Offer, TokenExchange};
