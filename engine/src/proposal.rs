//! Proposal records and vote tallying.

use crate::escrow::EscrowReceipt;
use commune_types::{Address, CommunityId, ProposalId, ProposalStatus, Timestamp, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

/// One slot in the voter roster snapshotted at proposal creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub voter: Address,
    /// Voting weight: founder shares in bps, or treasurer shares.
    pub weight: u64,
    pub has_voted: bool,
    pub vote: bool,
}

/// Outcome of a tally over the current approvals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tally {
    /// Threshold not reached, but still reachable.
    Pending,
    /// Cumulative approving weight reached the threshold.
    Approved,
    /// The threshold can no longer be reached with the unvoted weight.
    Rejected,
}

/// A proposal tracked by the engine, parameterized by the module payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal<P> {
    pub id: ProposalId,
    pub community_id: CommunityId,
    pub creator: Address,
    pub payload: P,
    pub created_at: Timestamp,
    /// Per-voter record, fixed at creation (roster snapshot).
    pub approvals: Vec<Approval>,
    /// Consensus threshold in basis points of the total roster weight.
    pub threshold_bps: u32,
    pub status: ProposalStatus,
    /// Votes cast after `created_at + voting_window_secs` are late.
    pub voting_window_secs: u64,
    /// Funds reserved at creation, if the payload required any.
    pub escrow: Option<EscrowReceipt>,
}

impl<P> Proposal<P> {
    pub fn total_weight(&self) -> u128 {
        self.approvals.iter().map(|a| a.weight as u128).sum()
    }

    /// Weight that has approved so far.
    pub fn yes_weight(&self) -> u128 {
        self.approvals
            .iter()
            .filter(|a| a.has_voted && a.vote)
            .map(|a| a.weight as u128)
            .sum()
    }

    /// Weight that has not voted yet.
    pub fn unvoted_weight(&self) -> u128 {
        self.approvals
            .iter()
            .filter(|a| !a.has_voted)
            .map(|a| a.weight as u128)
            .sum()
    }

    /// Minimum approving weight for consensus:
    /// ceil(threshold_bps × total / 10000).
    pub fn required_weight(&self) -> u128 {
        let total = self.total_weight();
        let num = self.threshold_bps as u128 * total;
        let den = BPS_DENOMINATOR as u128;
        num.div_ceil(den)
    }

    pub fn approval_of(&self, voter: &Address) -> Option<&Approval> {
        self.approvals.iter().find(|a| &a.voter == voter)
    }

    pub fn is_eligible_voter(&self, voter: &Address) -> bool {
        self.approval_of(voter).is_some()
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.approval_of(voter).is_some_and(|a| a.has_voted)
    }

    /// The deadline after which votes are late (advisory unless the engine
    /// enforces windows).
    pub fn voting_deadline(&self) -> Timestamp {
        self.created_at.plus(self.voting_window_secs)
    }

    /// Tally the current approvals against the threshold.
    pub fn tally(&self) -> Tally {
        let required = self.required_weight();
        let yes = self.yes_weight();
        if yes >= required {
            Tally::Approved
        } else if yes + self.unvoted_weight() < required {
            Tally::Rejected
        } else {
            Tally::Pending
        }
    }

    /// What the tally would be if `voter` cast `decision` now.
    pub(crate) fn tally_with(&self, voter: &Address, decision: bool) -> Tally {
        let required = self.required_weight();
        let weight = self
            .approval_of(voter)
            .map(|a| a.weight as u128)
            .unwrap_or(0);
        let yes = self.yes_weight() + if decision { weight } else { 0 };
        if yes >= required {
            Tally::Approved
        } else if yes + (self.unvoted_weight() - weight) < required {
            Tally::Rejected
        } else {
            Tally::Pending
        }
    }

    pub(crate) fn record_vote(&mut self, voter: &Address, decision: bool) {
        if let Some(a) = self.approvals.iter_mut().find(|a| &a.voter == voter) {
            a.has_voted = true;
            a.vote = decision;
        }
    }
}
