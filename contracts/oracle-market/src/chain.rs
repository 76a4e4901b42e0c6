//! Per-event sequence of oracle rounds.
//!
//! The chain is the only place rounds are created. It opens with a
//! centralized round and appends a decentralized round on every escalation,
//! each with a strictly higher threshold than the one before. Only the last
//! round of a chain can be open, and once `final_result` is set the chain
//! never changes again.

use soroban_sdk::{Address, Env, Vec};

use crate::error::OracleError;
use crate::events::RoundEscalated;
use crate::safe_math::{mul_div_floor, SafeMath};
use crate::storage;
use crate::types::{
    CentralizedRound, DecentralizedRound, EscalationChain, EventRecord, OracleSettings,
    RoundRecord, ThresholdPolicy,
};

const BPS_DENOMINATOR: i128 = 10_000;

impl ThresholdPolicy {
    /// Threshold of the round after one with `current`. Always `> current`.
    pub fn next_threshold(&self, env: &Env, current: i128) -> Result<i128, OracleError> {
        match *self {
            ThresholdPolicy::Additive(step) => {
                if step <= 0 {
                    return Err(OracleError::InvalidArgument);
                }
                current.safe_add(step)
            }
            ThresholdPolicy::Geometric(bps) => {
                if bps == 0 {
                    return Err(OracleError::InvalidArgument);
                }
                let increase = mul_div_floor(env, current, i128::from(bps), BPS_DENOMINATOR)?;
                current.safe_add(increase.max(1))
            }
        }
    }
}

impl EscalationChain {
    /// Opens the chain for a freshly created event with its centralized
    /// round, reporting from the end of betting until `result_setting_end`.
    pub fn bootstrap(
        env: &Env,
        event_id: u64,
        event: &EventRecord,
        oracle: Address,
        settings: OracleSettings,
    ) -> Result<Self, OracleError> {
        let round = CentralizedRound::new(
            env,
            event_id,
            event.num_outcomes(),
            oracle,
            event.betting_end,
            event.result_setting_end,
            settings.dispute_window,
            settings.initial_threshold,
        )?;
        let next_threshold = settings
            .threshold_policy
            .next_threshold(env, settings.initial_threshold)?;

        let round_id = storage::next_round_id(env);
        storage::save_round(env, round_id, &RoundRecord::Centralized(round));

        let mut rounds = Vec::new(env);
        rounds.push_back(round_id);
        Ok(EscalationChain {
            event_id,
            rounds,
            next_threshold,
            settings,
            final_result: None,
        })
    }

    pub fn current_round(&self) -> Result<u64, OracleError> {
        self.rounds.last().ok_or(OracleError::RoundNotFound)
    }

    pub fn is_current(&self, round_id: u64) -> bool {
        self.rounds.last() == Some(round_id)
    }

    pub fn can_escalate(&self) -> bool {
        self.rounds.len() < self.settings.max_rounds
    }

    /// Appends a decentralized round seeded with `seed` and returns its id.
    ///
    /// `from_round` must be the chain's current round and already closed.
    pub fn advance(
        &mut self,
        env: &Env,
        from_round: u64,
        num_outcomes: u32,
        seed: u32,
    ) -> Result<u64, OracleError> {
        if self.final_result.is_some() || !self.is_current(from_round) {
            return Err(OracleError::InvalidRoundState);
        }

        let threshold = self.next_threshold;
        let arbitration_end = env
            .ledger()
            .timestamp()
            .safe_add(self.settings.arbitration_window)?;
        let round = DecentralizedRound::new(
            env,
            self.event_id,
            num_outcomes,
            seed,
            arbitration_end,
            threshold,
        )?;
        self.next_threshold = self
            .settings
            .threshold_policy
            .next_threshold(env, threshold)?;

        let round_id = storage::next_round_id(env);
        storage::save_round(env, round_id, &RoundRecord::Decentralized(round));
        self.rounds.push_back(round_id);

        RoundEscalated {
            from_round,
            to_round: round_id,
            threshold,
        }
        .publish(env);

        Ok(round_id)
    }

    /// Records the authoritative result. Set exactly once.
    pub fn settle(&mut self, outcome: u32) -> Result<(), OracleError> {
        if self.final_result.is_some() {
            return Err(OracleError::InvalidRoundState);
        }
        self.final_result = Some(outcome);
        Ok(())
    }

    pub fn final_result(&self) -> Result<u32, OracleError> {
        self.final_result.ok_or(OracleError::NotYetFinal)
    }
}
