//! The proposal state machine.

use crate::escrow::{EscrowReceipt, FundingPlan};
use crate::proposal::{Approval, Proposal, Tally};
use commune_ledger::TokenLedger;
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus, Timestamp,
    BPS_DENOMINATOR,
};
use std::collections::HashMap;

/// Everything a module supplies when registering a proposal, besides the
/// payload itself: who may vote (with weights), the consensus threshold,
/// the voting window, and what to escrow.
#[derive(Clone, Debug)]
pub struct CreateSpec {
    pub community_id: CommunityId,
    pub creator: Address,
    /// Eligible voters with their weights, snapshotted into the proposal.
    pub roster: Vec<(Address, u64)>,
    /// Consensus threshold in bps of the total roster weight.
    pub threshold_bps: u32,
    pub voting_window_secs: u64,
    /// Funds to reserve at creation, if the payload requires any.
    pub funding: Option<FundingPlan>,
}

/// The generic proposal engine. One instance per module.
///
/// Owns the proposal arena (compact ids, insertion-ordered index) and the
/// module's custody account on the ledger. All calls are synchronous and
/// all-or-nothing: a failed transfer or execution callback leaves no trace.
#[derive(Clone, Debug)]
pub struct ProposalEngine<P> {
    /// Module tag for tracing output.
    module: &'static str,
    /// The module's own ledger account; escrow is held here.
    custody: Address,
    next_id: ProposalId,
    proposals: HashMap<ProposalId, Proposal<P>>,
    /// Insertion order, for id-by-index reads.
    ids: Vec<ProposalId>,
    /// When set, votes after the proposal's deadline expire it.
    enforce_voting_window: bool,
}

impl<P> ProposalEngine<P> {
    pub fn new(module: &'static str, custody: Address) -> Self {
        Self {
            module,
            custody,
            next_id: 1,
            proposals: HashMap::new(),
            ids: Vec::new(),
            enforce_voting_window: false,
        }
    }

    /// Turn hard deadline enforcement on or off.
    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.enforce_voting_window = enforce;
    }

    /// The module's custody account (sources must approve this spender).
    pub fn custody(&self) -> &Address {
        &self.custody
    }

    /// Register a new proposal. Reserves the funding plan (all-or-nothing)
    /// and stores the proposal as `Active` with an empty vote record per
    /// roster entry. Payload validation is the caller's job and must happen
    /// before any funds move.
    pub fn create(
        &mut self,
        spec: CreateSpec,
        payload: P,
        now: Timestamp,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        if spec.roster.is_empty() {
            return Err(GovernanceError::validation(
                "proposal requires at least one eligible voter",
            ));
        }
        if spec.threshold_bps > BPS_DENOMINATOR {
            return Err(GovernanceError::validation(
                "consensus threshold should be between 0 and 10000",
            ));
        }

        let escrow = match spec.funding {
            Some(plan) => Some(EscrowReceipt::reserve(plan, &self.custody, ledger)?),
            None => None,
        };

        let id = self.next_id;
        self.next_id += 1;

        let approvals = spec
            .roster
            .into_iter()
            .map(|(voter, weight)| Approval {
                voter,
                weight,
                has_voted: false,
                vote: false,
            })
            .collect();

        tracing::info!(
            module = self.module,
            proposal = id,
            community = %spec.community_id,
            creator = %spec.creator,
            "proposal created"
        );

        self.proposals.insert(
            id,
            Proposal {
                id,
                community_id: spec.community_id,
                creator: spec.creator,
                payload,
                created_at: now,
                approvals,
                threshold_bps: spec.threshold_bps,
                status: ProposalStatus::Active,
                voting_window_secs: spec.voting_window_secs,
                escrow,
            },
        );
        self.ids.push(id);
        Ok(id)
    }

    /// Record one voter's decision and re-tally.
    ///
    /// When this vote crosses the consensus threshold, `exec` runs
    /// synchronously, exactly once over the proposal's lifetime, before
    /// the vote is committed; if it fails, the vote is not recorded and the
    /// proposal stays `Active`. When this vote makes the threshold
    /// mathematically unreachable, the escrow is refunded and the proposal
    /// is `Rejected` in the same call.
    pub fn vote_with<F>(
        &mut self,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        voter: &Address,
        decision: bool,
        now: Timestamp,
        ledger: &mut TokenLedger,
        exec: F,
    ) -> GovernanceResult<ProposalStatus>
    where
        F: FnOnce(&Proposal<P>, &mut TokenLedger) -> GovernanceResult<()>,
    {
        let module = self.module;
        let custody = self.custody.clone();
        let enforce = self.enforce_voting_window;

        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or_else(|| GovernanceError::not_found("proposal id is not valid"))?;
        if &proposal.community_id != community_id {
            return Err(GovernanceError::not_found(
                "community id does not match proposal",
            ));
        }
        if !proposal.status.is_active() {
            return Err(GovernanceError::invalid_state(
                "proposal is not in the active state",
            ));
        }
        if enforce && proposal.created_at.has_expired(proposal.voting_window_secs, now) {
            // Clear the receipt only once the refund succeeded, as the
            // rejected and cancelled paths do.
            if let Some(receipt) = proposal.escrow.clone() {
                receipt.refund(&custody, ledger)?;
                proposal.escrow = None;
            }
            proposal.status = ProposalStatus::Expired;
            tracing::info!(module, proposal = proposal_id, "proposal expired");
            return Err(GovernanceError::invalid_state(
                "voting window has closed for this proposal",
            ));
        }
        if !proposal.is_eligible_voter(voter) {
            return Err(GovernanceError::authorization(
                "voter is not eligible to vote on this proposal",
            ));
        }
        if proposal.has_voted(voter) {
            return Err(GovernanceError::conflict("voter can not vote second time"));
        }

        match proposal.tally_with(voter, decision) {
            Tally::Approved => {
                // Run the side effect before committing anything, so a
                // failed execution aborts the entire vote.
                exec(proposal, ledger)?;
                proposal.record_vote(voter, decision);
                proposal.status = ProposalStatus::Approved;
                tracing::info!(
                    module,
                    proposal = proposal_id,
                    %voter,
                    "proposal approved and executed"
                );
                Ok(ProposalStatus::Approved)
            }
            Tally::Rejected => {
                if let Some(receipt) = proposal.escrow.clone() {
                    receipt.refund(&custody, ledger)?;
                    proposal.escrow = None;
                }
                proposal.record_vote(voter, decision);
                proposal.status = ProposalStatus::Rejected;
                tracing::info!(module, proposal = proposal_id, %voter, "proposal rejected");
                Ok(ProposalStatus::Rejected)
            }
            Tally::Pending => {
                proposal.record_vote(voter, decision);
                tracing::debug!(module, proposal = proposal_id, %voter, decision, "vote recorded");
                Ok(ProposalStatus::Active)
            }
        }
    }

    /// Withdraw an `Active` proposal. Creator-only; escrowed funds are
    /// returned in full.
    pub fn cancel(
        &mut self,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        caller: &Address,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<()> {
        let module = self.module;
        let custody = self.custody.clone();

        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or_else(|| GovernanceError::not_found("proposal id is not valid"))?;
        if &proposal.community_id != community_id {
            return Err(GovernanceError::not_found(
                "community id does not match proposal",
            ));
        }
        if !proposal.status.is_active() {
            return Err(GovernanceError::invalid_state(
                "proposal is not in the active state",
            ));
        }
        if &proposal.creator != caller {
            return Err(GovernanceError::authorization(
                "only the proposal creator can cancel",
            ));
        }
        if let Some(receipt) = proposal.escrow.clone() {
            receipt.refund(&custody, ledger)?;
            proposal.escrow = None;
        }
        proposal.status = ProposalStatus::Cancelled;
        tracing::info!(module, proposal = proposal_id, %caller, "proposal cancelled");
        Ok(())
    }

    /// Number of proposals ever created in this module.
    pub fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    /// The id of the `index`-th proposal in creation order.
    pub fn id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.ids
            .get(index)
            .copied()
            .ok_or_else(|| GovernanceError::not_found("proposal index out of range"))
    }

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<P>> {
        self.proposals
            .get(&proposal_id)
            .ok_or_else(|| GovernanceError::not_found("proposal id is not valid"))
    }

    /// Ids of this module's proposals belonging to one community, in
    /// creation order.
    pub fn ids_for_community(&self, community_id: &CommunityId) -> Vec<ProposalId> {
        self.ids
            .iter()
            .copied()
            .filter(|id| {
                self.proposals
                    .get(id)
                    .is_some_and(|p| &p.community_id == community_id)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn spec(roster: &[(&str, u64)], threshold_bps: u32, funding: Option<FundingPlan>) -> CreateSpec {
        CreateSpec {
            community_id: addr("0xc0"),
            creator: addr(roster[0].0),
            roster: roster.iter().map(|(v, w)| (addr(v), *w)).collect(),
            threshold_bps,
            voting_window_secs: 86_400,
            funding,
        }
    }

    #[test]
    fn ids_are_one_based_and_monotonic() {
        let mut ledger = TokenLedger::new();
        let mut engine: ProposalEngine<&str> = ProposalEngine::new("test", addr("custody"));
        let a = engine
            .create(spec(&[("f0", 10_000)], 5000, None), "a", Timestamp::EPOCH, &mut ledger)
            .unwrap();
        let b = engine
            .create(spec(&[("f0", 10_000)], 5000, None), "b", Timestamp::EPOCH, &mut ledger)
            .unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(engine.count(), 2);
        assert_eq!(engine.id_by_index(1).unwrap(), 2);
        assert_eq!(engine.ids_for_community(&addr("0xc0")), vec![1, 2]);
        assert!(engine.ids_for_community(&addr("0xc1")).is_empty());
        assert!(matches!(
            engine.id_by_index(2),
            Err(GovernanceError::NotFound(_))
        ));
    }

    #[test]
    fn double_vote_is_a_conflict_and_tally_unchanged() {
        let mut ledger = TokenLedger::new();
        let mut engine: ProposalEngine<()> = ProposalEngine::new("test", addr("custody"));
        let roster = [("f0", 5000u64), ("f1", 3000), ("f2", 2000)];
        let id = engine
            .create(spec(&roster, 9000, None), (), Timestamp::EPOCH, &mut ledger)
            .unwrap();

        engine
            .vote_with(id, &addr("0xc0"), &addr("f0"), true, Timestamp::EPOCH, &mut ledger, |_, _| Ok(()))
            .unwrap();
        let before = engine.get(id).unwrap().yes_weight();
        let err = engine
            .vote_with(id, &addr("0xc0"), &addr("f0"), true, Timestamp::EPOCH, &mut ledger, |_, _| Ok(()))
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::conflict("voter can not vote second time")
        );
        assert_eq!(engine.get(id).unwrap().yes_weight(), before);
    }

    #[test]
    fn execution_runs_exactly_once_and_terminal_states_stay_terminal() {
        let mut ledger = TokenLedger::new();
        let mut engine: ProposalEngine<()> = ProposalEngine::new("test", addr("custody"));
        let roster = [("f0", 5000u64), ("f1", 3000), ("f2", 2000)];
        let id = engine
            .create(spec(&roster, 9000, None), (), Timestamp::EPOCH, &mut ledger)
            .unwrap();

        let mut executions = 0u32;
        for (voter, expected) in [
            ("f0", ProposalStatus::Active),
            ("f1", ProposalStatus::Active),
            ("f2", ProposalStatus::Approved),
        ] {
            let status = engine
                .vote_with(id, &addr("0xc0"), &addr(voter), true, Timestamp::EPOCH, &mut ledger, |_, _| {
                    executions += 1;
                    Ok(())
                })
                .unwrap();
            assert_eq!(status, expected);
        }
        assert_eq!(executions, 1);

        // No vote or cancel can follow a terminal state.
        let err = engine
            .vote_with(id, &addr("0xc0"), &addr("f0"), true, Timestamp::EPOCH, &mut ledger, |_, _| Ok(()))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidState(_)));
        let err = engine
            .cancel(id, &addr("0xc0"), &addr("f0"), &mut ledger)
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidState(_)));
    }

    #[test]
    fn failed_execution_aborts_the_vote() {
        let mut ledger = TokenLedger::new();
        let mut engine: ProposalEngine<()> = ProposalEngine::new("test", addr("custody"));
        let id = engine
            .create(spec(&[("f0", 10_000)], 5000, None), (), Timestamp::EPOCH, &mut ledger)
            .unwrap();

        let err = engine
            .vote_with(id, &addr("0xc0"), &addr("f0"), true, Timestamp::EPOCH, &mut ledger, |_, _| {
                Err(GovernanceError::transfer("transfer amount exceeds balance"))
            })
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Transfer(_)));

        let p = engine.get(id).unwrap();
        assert_eq!(p.status, ProposalStatus::Active);
        assert!(!p.has_voted(&addr("f0")));
    }

    #[test]
    fn no_vote_making_consensus_unreachable_refunds_and_rejects() {
        let mut ledger = TokenLedger::new();
        ledger.mint("TST", &addr("community"), 1_000).unwrap();
        ledger.approve("TST", &addr("community"), &addr("custody"), 1_000);

        let mut engine: ProposalEngine<()> = ProposalEngine::new("test", addr("custody"));
        let roster = [("f0", 5000u64), ("f1", 3000), ("f2", 2000)];
        let funding = FundingPlan::single("TST", &addr("community"), 300);
        let id = engine
            .create(spec(&roster, 9000, Some(funding)), (), Timestamp::EPOCH, &mut ledger)
            .unwrap();
        assert_eq!(ledger.balance_of("TST", &addr("community")), 700);

        let status = engine
            .vote_with(id, &addr("0xc0"), &addr("f2"), false, Timestamp::EPOCH, &mut ledger, |_, _| Ok(()))
            .unwrap();
        assert_eq!(status, ProposalStatus::Rejected);
        assert_eq!(ledger.balance_of("TST", &addr("community")), 1_000);
    }

    #[test]
    fn cancel_refunds_escrow_and_is_creator_only() {
        let mut ledger = TokenLedger::new();
        ledger.mint("TST", &addr("community"), 1_000).unwrap();
        ledger.approve("TST", &addr("community"), &addr("custody"), 1_000);

        let mut engine: ProposalEngine<()> = ProposalEngine::new("test", addr("custody"));
        let funding = FundingPlan::single("TST", &addr("community"), 250);
        let id = engine
            .create(
                spec(&[("f0", 10_000)], 5000, Some(funding)),
                (),
                Timestamp::EPOCH,
                &mut ledger,
            )
            .unwrap();

        let err = engine
            .cancel(id, &addr("0xc0"), &addr("f1"), &mut ledger)
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Authorization(_)));

        engine.cancel(id, &addr("0xc0"), &addr("f0"), &mut ledger).unwrap();
        assert_eq!(ledger.balance_of("TST", &addr("community")), 1_000);
        assert_eq!(engine.get(id).unwrap().status, ProposalStatus::Cancelled);
    }

    #[test]
    fn late_votes_expire_the_proposal_when_enforced() {
        let mut ledger = TokenLedger::new();
        let mut engine: ProposalEngine<()> = ProposalEngine::new("test", addr("custody"));
        engine.set_enforce_voting_window(true);
        let id = engine
            .create(spec(&[("f0", 10_000)], 5000, None), (), Timestamp::EPOCH, &mut ledger)
            .unwrap();

        let late = Timestamp::new(86_400);
        let err = engine
            .vote_with(id, &addr("0xc0"), &addr("f0"), true, late, &mut ledger, |_, _| Ok(()))
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::invalid_state("voting window has closed for this proposal")
        );
        assert_eq!(engine.get(id).unwrap().status, ProposalStatus::Expired);
    }

    #[test]
    fn failed_expiry_refund_keeps_the_receipt_and_the_proposal_active() {
        let mut ledger = TokenLedger::new();
        ledger.mint("TST", &addr("community"), 1_000).unwrap();
        ledger.approve("TST", &addr("community"), &addr("custody"), 1_000);

        let mut engine: ProposalEngine<()> = ProposalEngine::new("test", addr("custody"));
        engine.set_enforce_voting_window(true);
        let funding = FundingPlan::single("TST", &addr("community"), 300);
        let id = engine
            .create(spec(&[("f0", 10_000)], 5000, Some(funding)), (), Timestamp::EPOCH, &mut ledger)
            .unwrap();

        // Drain custody so the refund cannot be paid.
        ledger.transfer("TST", &addr("custody"), &addr("elsewhere"), 300).unwrap();

        let late = Timestamp::new(86_400);
        let err = engine
            .vote_with(id, &addr("0xc0"), &addr("f0"), true, late, &mut ledger, |_, _| Ok(()))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Transfer(_)));
        let p = engine.get(id).unwrap();
        assert_eq!(p.status, ProposalStatus::Active);
        assert!(p.escrow.is_some());

        // Once custody is made whole the expiry path completes normally.
        ledger.mint("TST", &addr("custody"), 300).unwrap();
        let err = engine
            .vote_with(id, &addr("0xc0"), &addr("f0"), true, late, &mut ledger, |_, _| Ok(()))
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::invalid_state("voting window has closed for this proposal")
        );
        let p = engine.get(id).unwrap();
        assert_eq!(p.status, ProposalStatus::Expired);
        assert!(p.escrow.is_none());
        assert_eq!(ledger.balance_of("TST", &addr("community")), 1_000);
    }
}
