//! Capability set shared by both oracle round variants.
//!
//! A round owns a stake pool keyed by outcome. Centralized rounds take stake
//! through disputes, decentralized rounds through votes; both finalize into a
//! [`RoundVerdict`] that the escalation chain acts on, and both pay out
//! against the chain's final result.

use soroban_sdk::{Env, Vec};

use crate::error::OracleError;
use crate::settlement;
use crate::types::RoundRecord;

/// What the chain must do after a round accepted stake.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StakeEffect {
    Recorded,
    /// Dissent crossed the threshold; spawn a round seeded with this outcome.
    Escalate(u32),
}

/// What the chain must do after a round finalized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundVerdict {
    /// The outcome is the event's final result.
    Settled(u32),
    /// Not settled; spawn a round seeded with this outcome.
    Escalate(u32),
}

pub trait OracleRound {
    fn event_id(&self) -> u64;
    fn num_outcomes(&self) -> u32;
    fn consensus_threshold(&self) -> i128;
    fn outcome_stakes(&self) -> Vec<i128>;
    fn total_stake(&self) -> i128;
    /// Set once, on finalization. Escalated centralized rounds never set it.
    fn final_outcome(&self) -> Option<u32>;

    /// Records a dispute (centralized) or vote (decentralized) in the pool.
    fn accept_stake(&mut self, now: u64, outcome: u32, amount: i128)
        -> Result<StakeEffect, OracleError>;

    /// Closes an open round. `can_escalate` is false once the chain is at
    /// its round limit. Rounds that are already closed return
    /// `InvalidRoundState`; callers read `final_outcome` instead.
    fn finalize(&mut self, now: u64, can_escalate: bool) -> Result<RoundVerdict, OracleError>;

    fn stake_on(&self, outcome: u32) -> i128 {
        self.outcome_stakes().get(outcome).unwrap_or(0)
    }

    /// Share of this round's pool owed to a participant who staked
    /// `participant_stake` on `final_result`.
    fn earnings(
        &self,
        env: &Env,
        final_result: u32,
        participant_stake: i128,
    ) -> Result<i128, OracleError> {
        settlement::compute_earnings(
            env,
            self.total_stake(),
            self.stake_on(final_result),
            participant_stake,
        )
    }
}

macro_rules! dispatch {
    ($self:expr, $round:ident => $body:expr) => {
        match $self {
            RoundRecord::Centralized($round) => $body,
            RoundRecord::Decentralized($round) => $body,
        }
    };
}

impl OracleRound for RoundRecord {
    fn event_id(&self) -> u64 {
        dispatch!(self, r => r.event_id())
    }

    fn num_outcomes(&self) -> u32 {
        dispatch!(self, r => r.num_outcomes())
    }

    fn consensus_threshold(&self) -> i128 {
        dispatch!(self, r => r.consensus_threshold())
    }

    fn outcome_stakes(&self) -> Vec<i128> {
        dispatch!(self, r => r.outcome_stakes())
    }

    fn total_stake(&self) -> i128 {
        dispatch!(self, r => r.total_stake())
    }

    fn final_outcome(&self) -> Option<u32> {
        dispatch!(self, r => r.final_outcome())
    }

    fn accept_stake(
        &mut self,
        now: u64,
        outcome: u32,
        amount: i128,
    ) -> Result<StakeEffect, OracleError> {
        dispatch!(self, r => r.accept_stake(now, outcome, amount))
    }

    fn finalize(&mut self, now: u64, can_escalate: bool) -> Result<RoundVerdict, OracleError> {
        dispatch!(self, r => r.finalize(now, can_escalate))
    }
}
