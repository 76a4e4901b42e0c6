use soroban_sdk::{contractevent, Address, String, Vec};

use crate::types::{OracleSettings, StakePool};

// ── Configuration ─────────────────────────────────────────────────────────────

#[contractevent(topics = ["init"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitEvent {
    pub admin: Address,
    pub bet_token: Address,
    pub vote_token: Address,
    pub settings: OracleSettings,
}

#[contractevent(topics = ["pause"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseEvent {
    pub admin: Address,
}

#[contractevent(topics = ["unpause"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnpauseEvent {
    pub admin: Address,
}

#[contractevent(topics = ["settings_update"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettingsUpdateEvent {
    pub admin: Address,
    pub settings: OracleSettings,
}

// ── Betting ──────────────────────────────────────────────────────────────────

#[contractevent(topics = ["event_created"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EventCreated {
    pub event_id: u64,
    pub creator: Address,
    pub outcomes: Vec<String>,
    pub betting_end: u64,
}

#[contractevent(topics = ["bet_placed"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BetPlaced {
    pub event_id: u64,
    pub outcome: u32,
    pub amount: i128,
    pub bettor: Address,
}

// ── Oracle rounds ────────────────────────────────────────────────────────────

#[contractevent(topics = ["result_reported"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultReported {
    pub round_id: u64,
    pub outcome: u32,
    pub reporter: Address,
}

#[contractevent(topics = ["dispute_staked"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeStaked {
    pub round_id: u64,
    pub outcome: u32,
    pub amount: i128,
    pub disputer: Address,
}

#[contractevent(topics = ["vote_cast"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteCast {
    pub round_id: u64,
    pub outcome: u32,
    pub amount: i128,
    pub voter: Address,
}

#[contractevent(topics = ["round_escalated"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundEscalated {
    pub from_round: u64,
    pub to_round: u64,
    pub threshold: i128,
}

#[contractevent(topics = ["round_finalized"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundFinalized {
    pub round_id: u64,
    pub outcome: u32,
}

/// Emitted alongside `RoundFinalized` with the numbers monitors need to
/// estimate payouts. `winning_stake == 0` means the round pool is unclaimable.
#[contractevent(topics = ["round_finalized_diag"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundFinalizedDiag {
    pub round_id: u64,
    pub outcome: u32,
    pub total_stake: i128,
    pub winning_stake: i128,
    pub timestamp: u64,
}

#[contractevent(topics = ["result_finalized"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultFinalized {
    pub event_id: u64,
    pub outcome: u32,
    /// Number of rounds the chain needed.
    pub rounds: u32,
}

// ── Settlement ───────────────────────────────────────────────────────────────

#[contractevent(topics = ["earnings_withdrawn"])]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EarningsWithdrawn {
    pub who: Address,
    pub pool: StakePool,
    pub amount: i128,
}
