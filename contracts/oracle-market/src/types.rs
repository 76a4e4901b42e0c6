use soroban_sdk::{contracttype, Address, String, Vec};

use crate::error::OracleError;

/// Storage keys. Counters, config and the pause flag live in `instance()`;
/// everything keyed by an id lives in `persistent()`.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    Paused,
    EventIdCounter,
    RoundIdCounter,
    Event(u64),
    Chain(u64),
    Round(u64),
    /// (event_id, bettor, outcome) -> staked amount. Zeroed on withdrawal.
    BetStake(u64, Address, u32),
    /// (round_id, participant, outcome) -> staked amount. Zeroed on withdrawal.
    RoundStake(u64, Address, u32),
    /// (round_id, voter) -> true once the voter has voted in a decentralized round.
    Voted(u64, Address),
}

/// How the consensus threshold grows from one round to the next.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ThresholdPolicy {
    /// next = current + step
    Additive(i128),
    /// next = current + max(current * bps / 10_000, 1)
    Geometric(u32),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleSettings {
    /// Threshold of the centralized round that opens every event.
    pub initial_threshold: i128,
    pub threshold_policy: ThresholdPolicy,
    /// Seconds a centralized report stays open to disputes.
    pub dispute_window: u64,
    /// Seconds a decentralized round accepts votes.
    pub arbitration_window: u64,
    /// Maximum number of rounds in one chain, the centralized round included.
    pub max_rounds: u32,
}

impl OracleSettings {
    pub fn validate(&self) -> Result<(), OracleError> {
        let step_ok = match self.threshold_policy {
            ThresholdPolicy::Additive(step) => step > 0,
            ThresholdPolicy::Geometric(bps) => bps > 0,
        };
        if self.initial_threshold <= 0
            || !step_ok
            || self.dispute_window == 0
            || self.arbitration_window == 0
            || self.max_rounds < 2
        {
            return Err(OracleError::InvalidArgument);
        }
        Ok(())
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    /// Asset bettors stake on event outcomes.
    pub bet_token: Address,
    /// Asset staked in oracle rounds (disputes, open reports, votes).
    pub vote_token: Address,
    pub settings: OracleSettings,
}

/// A single market: outcome labels, betting window and the betting pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    /// Informational; carries no privilege after creation.
    pub owner: Address,
    pub outcome_names: Vec<String>,
    pub betting_start: u64,
    pub betting_end: u64,
    pub result_setting_end: u64,
    pub stake_by_outcome: Vec<i128>,
    /// Always equals the sum of `stake_by_outcome`.
    pub total_stake: i128,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CentralizedStatus {
    AwaitingReport = 0,
    Reported = 1,
    Finalized = 2,
    Escalated = 3,
}

/// First-stage oracle: one designated reporter, then a dispute window.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CentralizedRound {
    pub event_id: u64,
    pub num_outcomes: u32,
    pub reporter: Address,
    pub reporting_start: u64,
    pub reporting_end: u64,
    pub dispute_window: u64,
    /// Zero until a result is reported.
    pub dispute_end: u64,
    pub consensus_threshold: i128,
    pub status: CentralizedStatus,
    pub reported_outcome: Option<u32>,
    pub stake_by_outcome: Vec<i128>,
    pub total_stake: i128,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecentralizedStatus {
    Voting = 0,
    Finalized = 1,
}

/// Open stake-weighted voting round spawned by an escalation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecentralizedRound {
    pub event_id: u64,
    pub num_outcomes: u32,
    /// Outcome proposed by the previous round; wins when nobody votes.
    pub prior_outcome: u32,
    pub arbitration_end: u64,
    pub consensus_threshold: i128,
    pub status: DecentralizedStatus,
    pub stake_by_outcome: Vec<i128>,
    pub total_stake: i128,
    pub final_outcome: Option<u32>,
}

/// The round arena entry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoundRecord {
    Centralized(CentralizedRound),
    Decentralized(DecentralizedRound),
}

/// Ordered rounds of one event plus its authoritative result.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscalationChain {
    pub event_id: u64,
    /// Round ids in creation order; only the last one can be open.
    pub rounds: Vec<u64>,
    /// Threshold for the next round to be created.
    pub next_threshold: i128,
    /// Settings snapshot taken when the event was created.
    pub settings: OracleSettings,
    pub final_result: Option<u32>,
}

/// Independent withdrawal domains.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StakePool {
    Event(u64),
    Round(u64),
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventPhase {
    Upcoming = 0,
    Betting = 1,
    Resolving = 2,
    Final = 3,
}
