//! External marketplace collaborators, specified at their interfaces.

use commune_ledger::TokenLedger;
use commune_types::{Address, GovernanceError, GovernanceResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One selling offer on a token exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: u64,
    pub exchange_id: u64,
    /// Symbol of the token being sold.
    pub token_symbol: String,
    /// Symbol the buyer pays with.
    pub payment_symbol: String,
    pub seller: Address,
    pub amount: u128,
    pub price: u128,
}

impl Offer {
    /// Total cost of taking the whole offer, or `None` on overflow.
    pub fn total_cost(&self) -> Option<u128> {
        self.price.checked_mul(self.amount)
    }
}

/// The token-exchange surface the buying module consumes. Obligations:
/// balance conservation and failure on insufficient funds, nothing more.
pub trait TokenExchange {
    fn get_offer_by_id(&self, offer_id: u64) -> GovernanceResult<Offer>;

    /// Take the whole offer: `payer` pays the seller, the sold tokens land
    /// on `deliver_to`.
    fn buy_offer(
        &mut self,
        offer_id: u64,
        payer: &Address,
        deliver_to: &Address,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<()>;
}

/// The auction surface the bid module consumes.
pub trait NftAuction {
    /// Move `amount` of `token_symbol` from `bidder` into the auction as a
    /// bid on `media_symbol`.
    fn place_bid(
        &mut self,
        media_symbol: &str,
        token_symbol: &str,
        bidder: &Address,
        amount: u128,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<()>;
}

/// In-memory exchange, good enough for wiring and tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryExchange {
    next_id: u64,
    offers: HashMap<u64, Offer>,
}

impl InMemoryExchange {
    pub fn new() -> Self {
        Self { next_id: 1, offers: HashMap::new() }
    }

    /// List an offer and hand back its id.
    pub fn place_offer(&mut self, mut offer: Offer) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        offer.offer_id = id;
        self.offers.insert(id, offer);
        id
    }
}

impl TokenExchange for InMemoryExchange {
    fn get_offer_by_id(&self, offer_id: u64) -> GovernanceResult<Offer> {
        self.offers
            .get(&offer_id)
            .cloned()
            .ok_or_else(|| GovernanceError::not_found("offer id is not valid"))
    }

    fn buy_offer(
        &mut self,
        offer_id: u64,
        payer: &Address,
        deliver_to: &Address,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<()> {
        let offer = self.get_offer_by_id(offer_id)?;
        let cost = offer
            .total_cost()
            .ok_or_else(|| GovernanceError::transfer("offer cost overflows"))?;
        ledger.transfer(&offer.payment_symbol, payer, &offer.seller, cost)?;
        ledger.transfer(&offer.token_symbol, &offer.seller, deliver_to, offer.amount)?;
        self.offers.remove(&offer_id);
        tracing::debug!(offer = offer_id, %payer, "offer taken");
        Ok(())
    }
}

/// In-memory auction that escrows bids on its own account.
#[derive(Clone, Debug)]
pub struct InMemoryAuction {
    escrow: Address,
    /// (media symbol, bidder, amount), in placement order.
    bids: Vec<(String, Address, u128)>,
}

impl InMemoryAuction {
    pub fn new(escrow: Address) -> Self {
        Self { escrow, bids: Vec::new() }
    }

    pub fn bids_on(&self, media_symbol: &str) -> Vec<(Address, u128)> {
        self.bids
            .iter()
            .filter(|(media, _, _)| media == media_symbol)
            .map(|(_, bidder, amount)| (bidder.clone(), *amount))
            .collect()
    }
}

impl NftAuction for InMemoryAuction {
    fn place_bid(
        &mut self,
        media_symbol: &str,
        token_symbol: &str,
        bidder: &Address,
        amount: u128,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<()> {
        ledger.transfer(token_symbol, bidder, &self.escrow, amount)?;
        self.bids.push((media_symbol.to_string(), bidder.clone(), amount));
        tracing::debug!(media = media_symbol, %bidder, amount, "bid placed");
        Ok(())
    }
}
