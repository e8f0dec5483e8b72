//! The `CommunityDao` aggregator.

use crate::creation::Creation;
use commune_distribution::{Airdrop, AirdropParams, Allocation, AllocationParams};
use commune_engine::Proposal;
use commune_ledger::{TokenLedger, TokenRegistry};
use commune_market::{Bid, BidParams, Buying, BuyingParams, NftAuction, TokenExchange};
use commune_membership::{Eject, EjectParams, Joining, JoiningParams, StakeBook};
use commune_registry::{Community, CommunityParams, CommunityRegistry, Member, MemberRegistry};
use commune_token::{CommunityToken, TokenIssuance, TokenParams, TokenStore};
use commune_treasury::{Transfer, TransferParams};
use commune_types::{
    Address, CommunityId, GovernanceResult, MemberRole, ProposalId, ProposalStatus, Timestamp,
};

/// Aggregator-level switches.
#[derive(Clone, Copy, Debug, Default)]
pub struct DaoConfig {
    /// When set, every module rejects votes cast after the proposal's
    /// voting window and expires the proposal.
    pub enforce_voting_windows: bool,
}

/// Owns the shared state and every module facade. All operations take the
/// acting address and the current time explicitly; nothing is ambient.
#[derive(Debug)]
pub struct CommunityDao {
    ledger: TokenLedger,
    token_registry: TokenRegistry,
    communities: CommunityRegistry,
    members: MemberRegistry,
    tokens: TokenStore,
    stakes: StakeBook,
    creation: Creation,
    issuance: TokenIssuance,
    airdrop: Airdrop,
    allocation: Allocation,
    eject: Eject,
    joining: Joining,
    transfer: Transfer,
    bid: Bid,
    buying: Buying,
}

impl CommunityDao {
    pub fn new(config: DaoConfig) -> Self {
        let mut dao = Self {
            ledger: TokenLedger::new(),
            token_registry: TokenRegistry::new(),
            communities: CommunityRegistry::new(),
            members: MemberRegistry::new(),
            tokens: TokenStore::new(),
            stakes: StakeBook::new(),
            creation: Creation::new(Address::new("commune:creation")),
            issuance: TokenIssuance::new(Address::new("commune:token")),
            airdrop: Airdrop::new(Address::new("commune:airdrop")),
            allocation: Allocation::new(Address::new("commune:allocation")),
            eject: Eject::new(Address::new("commune:eject")),
            joining: Joining::new(Address::new("commune:joining")),
            transfer: Transfer::new(Address::new("commune:transfer")),
            bid: Bid::new(Address::new("commune:bid")),
            buying: Buying::new(Address::new("commune:buying")),
        };
        if config.enforce_voting_windows {
            dao.creation.set_enforce_voting_window(true);
            dao.issuance.set_enforce_voting_window(true);
            dao.airdrop.set_enforce_voting_window(true);
            dao.allocation.set_enforce_voting_window(true);
            dao.eject.set_enforce_voting_window(true);
            dao.joining.set_enforce_voting_window(true);
            dao.transfer.set_enforce_voting_window(true);
            dao.bid.set_enforce_voting_window(true);
            dao.buying.set_enforce_voting_window(true);
        }
        dao
    }

    // --- shared state ---

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    /// Direct ledger access, for funding accounts and granting the module
    /// custody allowances.
    pub fn ledger_mut(&mut self) -> &mut TokenLedger {
        &mut self.ledger
    }

    pub fn register_token(&mut self, name: &str, symbol: &str, contract_address: Address) {
        self.token_registry.register_token(name, symbol, contract_address);
    }

    pub fn token_exists(&self, symbol: &str) -> bool {
        self.token_registry.exists(symbol)
    }

    // --- communities ---

    pub fn create_community_proposal(
        &mut self,
        caller: &Address,
        params: CommunityParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.creation
            .create_proposal(caller, params, now, &self.token_registry, &mut self.ledger)
    }

    pub fn vote_community_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
    ) -> GovernanceResult<ProposalStatus> {
        self.creation.vote(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &self.token_registry,
            &mut self.communities,
            &mut self.members,
            &mut self.ledger,
        )
    }

    pub fn cancel_community_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.creation.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn creation_proposal_count(&self) -> u64 {
        self.creation.count()
    }

    pub fn creation_proposal_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.creation.id_by_index(index)
    }

    pub fn get_creation_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<CommunityParams>> {
        self.creation.get(proposal_id)
    }

    pub fn community_count(&self) -> u64 {
        self.communities.count()
    }

    pub fn community_id_by_index(&self, index: usize) -> GovernanceResult<&CommunityId> {
        self.communities.id_by_index(index)
    }

    pub fn get_community(&self, id: &CommunityId) -> GovernanceResult<&Community> {
        self.communities.get(id)
    }

    // --- members ---

    /// Privileged direct roster mutation.
    pub fn update_member(
        &mut self,
        community_id: &CommunityId,
        address: &Address,
        role: MemberRole,
        share: u64,
    ) -> GovernanceResult<()> {
        self.communities.get(community_id)?;
        self.members.update_member(community_id, address, role, share);
        Ok(())
    }

    pub fn members_of(&self, community_id: &CommunityId) -> &[Member] {
        self.members.members(community_id)
    }

    pub fn is_founder(&self, community_id: &CommunityId, address: &Address) -> bool {
        self.members.is_founder(community_id, address)
    }

    pub fn is_member(&self, community_id: &CommunityId, address: &Address) -> bool {
        self.members.is_member(community_id, address)
    }

    // --- community tokens ---

    pub fn create_community_token_proposal(
        &mut self,
        caller: &Address,
        params: TokenParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.issuance.create_proposal(
            caller,
            params,
            now,
            &self.communities,
            &self.members,
            &mut self.ledger,
        )
    }

    pub fn vote_community_token_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
    ) -> GovernanceResult<ProposalStatus> {
        self.issuance.vote(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &mut self.communities,
            &self.members,
            &mut self.tokens,
            &mut self.token_registry,
            &mut self.ledger,
        )
    }

    pub fn cancel_community_token_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.issuance.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn token_proposal_count(&self) -> u64 {
        self.issuance.count()
    }

    pub fn token_proposal_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.issuance.id_by_index(index)
    }

    pub fn get_token_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<TokenParams>> {
        self.issuance.get(proposal_id)
    }

    pub fn get_community_token(&self, token_id: u64) -> GovernanceResult<&CommunityToken> {
        self.tokens.get(token_id)
    }

    // --- airdrops ---

    pub fn airdrop_custody(&self) -> &Address {
        self.airdrop.custody()
    }

    pub fn create_airdrop_proposal(
        &mut self,
        caller: &Address,
        params: AirdropParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.airdrop.create_proposal(
            caller,
            params,
            now,
            &self.communities,
            &self.members,
            &self.tokens,
            &mut self.ledger,
        )
    }

    pub fn vote_airdrop_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
    ) -> GovernanceResult<ProposalStatus> {
        self.airdrop.vote(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &self.communities,
            &self.members,
            &mut self.tokens,
            &mut self.ledger,
        )
    }

    pub fn cancel_airdrop_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.airdrop.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn airdrop_proposal_count(&self) -> u64 {
        self.airdrop.count()
    }

    pub fn airdrop_proposal_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.airdrop.id_by_index(index)
    }

    pub fn get_airdrop_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<AirdropParams>> {
        self.airdrop.get(proposal_id)
    }

    // --- allocations ---

    pub fn allocation_custody(&self) -> &Address {
        self.allocation.custody()
    }

    pub fn create_allocation_proposal(
        &mut self,
        caller: &Address,
        params: AllocationParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.allocation.create_proposal(
            caller,
            params,
            now,
            &self.communities,
            &self.members,
            &self.tokens,
            &mut self.ledger,
        )
    }

    pub fn vote_allocation_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
    ) -> GovernanceResult<ProposalStatus> {
        self.allocation.vote(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &self.communities,
            &self.members,
            &mut self.tokens,
            &mut self.ledger,
        )
    }

    pub fn cancel_allocation_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.allocation.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn allocation_proposal_count(&self) -> u64 {
        self.allocation.count()
    }

    pub fn allocation_proposal_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.allocation.id_by_index(index)
    }

    pub fn get_allocation_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<AllocationParams>> {
        self.allocation.get(proposal_id)
    }

    // --- ejection ---

    pub fn eject_custody(&self) -> &Address {
        self.eject.custody()
    }

    pub fn create_eject_member_proposal(
        &mut self,
        caller: &Address,
        params: EjectParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.eject.create_proposal(
            caller,
            params,
            now,
            &self.communities,
            &self.members,
            &self.stakes,
            &mut self.ledger,
        )
    }

    pub fn vote_eject_member_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
    ) -> GovernanceResult<ProposalStatus> {
        self.eject.vote(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &mut self.members,
            &mut self.stakes,
            &mut self.ledger,
        )
    }

    pub fn cancel_eject_member_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.eject.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn eject_proposal_count(&self) -> u64 {
        self.eject.count()
    }

    pub fn eject_proposal_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.eject.id_by_index(index)
    }

    pub fn get_eject_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<EjectParams>> {
        self.eject.get(proposal_id)
    }

    // --- joining ---

    pub fn joining_custody(&self) -> &Address {
        self.joining.custody()
    }

    pub fn create_joining_request(
        &mut self,
        caller: &Address,
        params: JoiningParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.joining.create_request(
            caller,
            params,
            now,
            &self.communities,
            &self.members,
            &mut self.ledger,
        )
    }

    pub fn resolve_joining_request(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
    ) -> GovernanceResult<ProposalStatus> {
        self.joining.resolve(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &self.communities,
            &mut self.members,
            &mut self.stakes,
            &mut self.ledger,
        )
    }

    pub fn cancel_joining_request(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.joining.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn joining_request_count(&self) -> u64 {
        self.joining.count()
    }

    pub fn joining_request_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.joining.id_by_index(index)
    }

    pub fn get_joining_request(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<JoiningParams>> {
        self.joining.get(proposal_id)
    }

    // --- transfers ---

    pub fn transfer_custody(&self) -> &Address {
        self.transfer.custody()
    }

    pub fn create_transfer_proposal(
        &mut self,
        caller: &Address,
        params: TransferParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.transfer.create_proposal(
            caller,
            params,
            now,
            &self.communities,
            &self.members,
            &self.token_registry,
            &mut self.ledger,
        )
    }

    pub fn vote_transfer_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
    ) -> GovernanceResult<ProposalStatus> {
        self.transfer.vote(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &self.members,
            &mut self.ledger,
        )
    }

    pub fn cancel_transfer_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.transfer.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn transfer_proposal_count(&self) -> u64 {
        self.transfer.count()
    }

    pub fn transfer_proposal_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.transfer.id_by_index(index)
    }

    pub fn get_transfer_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<TransferParams>> {
        self.transfer.get(proposal_id)
    }

    // --- bids ---

    pub fn bid_custody(&self) -> &Address {
        self.bid.custody()
    }

    pub fn create_bid_proposal(
        &mut self,
        caller: &Address,
        params: BidParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.bid.create_proposal(
            caller,
            params,
            now,
            &self.communities,
            &self.members,
            &self.token_registry,
            &mut self.ledger,
        )
    }

    pub fn vote_bid_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        auction: &mut dyn NftAuction,
    ) -> GovernanceResult<ProposalStatus> {
        self.bid.vote(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &self.members,
            auction,
            &mut self.ledger,
        )
    }

    pub fn cancel_bid_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.bid.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn bid_proposal_count(&self) -> u64 {
        self.bid.count()
    }

    pub fn bid_proposal_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.bid.id_by_index(index)
    }

    pub fn get_bid_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<BidParams>> {
        self.bid.get(proposal_id)
    }

    // --- buying ---

    pub fn buying_custody(&self) -> &Address {
        self.buying.custody()
    }

    pub fn create_buying_proposal(
        &mut self,
        caller: &Address,
        params: BuyingParams,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        self.buying.create_proposal(
            caller,
            params,
            now,
            &self.communities,
            &self.members,
            &mut self.ledger,
        )
    }

    pub fn vote_buying_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        exchange: &mut dyn TokenExchange,
    ) -> GovernanceResult<ProposalStatus> {
        self.buying.vote(
            caller,
            proposal_id,
            community_id,
            decision,
            now,
            &self.communities,
            &self.members,
            exchange,
            &mut self.ledger,
        )
    }

    pub fn cancel_buying_proposal(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
    ) -> GovernanceResult<()> {
        self.buying.cancel(caller, proposal_id, community_id, &mut self.ledger)
    }

    pub fn buying_proposal_count(&self) -> u64 {
        self.buying.count()
    }

    pub fn buying_proposal_id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.buying.id_by_index(index)
    }

    pub fn get_buying_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> GovernanceResult<&Proposal<BuyingParams>> {
        self.buying.get(proposal_id)
    }
}
