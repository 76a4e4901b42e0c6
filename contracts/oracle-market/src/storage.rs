//! Typed access to contract storage.
//!
//! | Key                                  | Tier           |
//! |--------------------------------------|----------------|
//! | `Config`, `Paused`, id counters      | `instance()`   |
//! | `Event(id)`, `Chain(id)`, `Round(id)`| `persistent()` |
//! | `BetStake`, `RoundStake`, `Voted`    | `persistent()` |
//!
//! Every read or write of a persistent entry bumps its TTL.

use soroban_sdk::{Address, Env};

use crate::error::OracleError;
use crate::types::{Config, DataKey, EscalationChain, EventRecord, RoundRecord};

const DAY_IN_LEDGERS: u32 = 17280;
const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);
}

fn extend_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, BUMP_THRESHOLD, BUMP_AMOUNT);
}

fn set_persistent<V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>>(
    env: &Env,
    key: &DataKey,
    value: &V,
) {
    env.storage().persistent().set(key, value);
    extend_persistent(env, key);
}

// ── Config ───────────────────────────────────────────────────────────────────

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<Config, OracleError> {
    let config = env
        .storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(OracleError::NotInitialized)?;
    extend_instance(env);
    Ok(config)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance(env);
}

pub fn is_paused(env: &Env) -> bool {
    let paused = env
        .storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false);
    extend_instance(env);
    paused
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
    extend_instance(env);
}

/// Returns the next id from `counter` and advances it.
fn next_id(env: &Env, counter: DataKey) -> u64 {
    let id: u64 = env.storage().instance().get(&counter).unwrap_or(0);
    env.storage().instance().set(&counter, &(id + 1));
    extend_instance(env);
    id
}

pub fn next_event_id(env: &Env) -> u64 {
    next_id(env, DataKey::EventIdCounter)
}

pub fn next_round_id(env: &Env) -> u64 {
    next_id(env, DataKey::RoundIdCounter)
}

pub fn event_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::EventIdCounter)
        .unwrap_or(0)
}

// ── Aggregates ───────────────────────────────────────────────────────────────

pub fn load_event(env: &Env, event_id: u64) -> Result<EventRecord, OracleError> {
    let key = DataKey::Event(event_id);
    let event = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(OracleError::EventNotFound)?;
    extend_persistent(env, &key);
    Ok(event)
}

pub fn save_event(env: &Env, event_id: u64, event: &EventRecord) {
    set_persistent(env, &DataKey::Event(event_id), event);
}

pub fn load_chain(env: &Env, event_id: u64) -> Result<EscalationChain, OracleError> {
    let key = DataKey::Chain(event_id);
    let chain = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(OracleError::EventNotFound)?;
    extend_persistent(env, &key);
    Ok(chain)
}

pub fn save_chain(env: &Env, chain: &EscalationChain) {
    set_persistent(env, &DataKey::Chain(chain.event_id), chain);
}

pub fn load_round(env: &Env, round_id: u64) -> Result<RoundRecord, OracleError> {
    let key = DataKey::Round(round_id);
    let round = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(OracleError::RoundNotFound)?;
    extend_persistent(env, &key);
    Ok(round)
}

pub fn save_round(env: &Env, round_id: u64, round: &RoundRecord) {
    set_persistent(env, &DataKey::Round(round_id), round);
}

// ── Participant ledgers ──────────────────────────────────────────────────────

/// Reads a per-participant stake entry; missing entries read as zero.
pub fn get_stake(env: &Env, key: &DataKey) -> i128 {
    let storage = env.storage().persistent();
    match storage.get::<DataKey, i128>(key) {
        Some(amount) => {
            extend_persistent(env, key);
            amount
        }
        None => 0,
    }
}

pub fn set_stake(env: &Env, key: &DataKey, amount: i128) {
    set_persistent(env, key, &amount);
}

pub fn has_voted(env: &Env, round_id: u64, voter: &Address) -> bool {
    let key = DataKey::Voted(round_id, voter.clone());
    let voted = env.storage().persistent().has(&key);
    if voted {
        extend_persistent(env, &key);
    }
    voted
}

pub fn mark_voted(env: &Env, round_id: u64, voter: &Address) {
    set_persistent(env, &DataKey::Voted(round_id, voter.clone()), &true);
}
