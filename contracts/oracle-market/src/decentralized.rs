//! Open stake-weighted voting round.
//!
//! `Voting -> Finalizable -> Finalized`, where `Finalizable` is simply
//! `Voting` with `now >= arbitration_end`.
//!
//! The leading outcome is the one with the largest stake, ties going to the
//! lowest index. A round nobody voted in keeps its seed (`prior_outcome`).

use soroban_sdk::{Env, Vec};

use crate::error::OracleError;
use crate::event_record::{add_stake, empty_stakes};
use crate::round::{OracleRound, RoundVerdict, StakeEffect};
use crate::safe_math::SafeMath;
use crate::types::{DecentralizedRound, DecentralizedStatus};

impl DecentralizedRound {
    pub fn new(
        env: &Env,
        event_id: u64,
        num_outcomes: u32,
        prior_outcome: u32,
        arbitration_end: u64,
        consensus_threshold: i128,
    ) -> Result<Self, OracleError> {
        if prior_outcome >= num_outcomes || consensus_threshold <= 0 {
            return Err(OracleError::InvalidArgument);
        }
        Ok(DecentralizedRound {
            event_id,
            num_outcomes,
            prior_outcome,
            arbitration_end,
            consensus_threshold,
            status: DecentralizedStatus::Voting,
            stake_by_outcome: empty_stakes(env, num_outcomes),
            total_stake: 0,
            final_outcome: None,
        })
    }

    pub fn leading_outcome(&self) -> u32 {
        if self.total_stake == 0 {
            return self.prior_outcome;
        }
        let mut leader = 0u32;
        let mut best = i128::MIN;
        for (index, stake) in self.stake_by_outcome.iter().enumerate() {
            // Strict comparison keeps the lowest index on ties.
            if stake > best {
                best = stake;
                leader = index as u32;
            }
        }
        leader
    }

    pub fn is_finalizable(&self, now: u64) -> bool {
        self.status == DecentralizedStatus::Voting && now >= self.arbitration_end
    }
}

impl OracleRound for DecentralizedRound {
    fn event_id(&self) -> u64 {
        self.event_id
    }

    fn num_outcomes(&self) -> u32 {
        self.num_outcomes
    }

    fn consensus_threshold(&self) -> i128 {
        self.consensus_threshold
    }

    fn outcome_stakes(&self) -> Vec<i128> {
        self.stake_by_outcome.clone()
    }

    fn total_stake(&self) -> i128 {
        self.total_stake
    }

    fn final_outcome(&self) -> Option<u32> {
        self.final_outcome
    }

    fn accept_stake(
        &mut self,
        now: u64,
        outcome: u32,
        amount: i128,
    ) -> Result<StakeEffect, OracleError> {
        if self.status != DecentralizedStatus::Voting || now >= self.arbitration_end {
            return Err(OracleError::WindowClosed);
        }
        if amount <= 0 || outcome >= self.num_outcomes {
            return Err(OracleError::InvalidArgument);
        }

        add_stake(&mut self.stake_by_outcome, outcome, amount)?;
        self.total_stake = self.total_stake.safe_add(amount)?;
        Ok(StakeEffect::Recorded)
    }

    fn finalize(&mut self, now: u64, can_escalate: bool) -> Result<RoundVerdict, OracleError> {
        if self.status != DecentralizedStatus::Voting {
            return Err(OracleError::InvalidRoundState);
        }
        if !self.is_finalizable(now) {
            return Err(OracleError::TooEarly);
        }

        let leader = self.leading_outcome();
        self.status = DecentralizedStatus::Finalized;

        // An empty round means nobody contested the seed.
        let settled = self.total_stake == 0 || self.total_stake > self.consensus_threshold;
        let verdict = if settled {
            RoundVerdict::Settled(leader)
        } else if can_escalate {
            RoundVerdict::Escalate(leader)
        } else {
            // No round left to confirm the leader; the seed stands.
            RoundVerdict::Settled(self.prior_outcome)
        };
        self.final_outcome = Some(match verdict {
            RoundVerdict::Settled(outcome) | RoundVerdict::Escalate(outcome) => outcome,
        });
        Ok(verdict)
    }
}
