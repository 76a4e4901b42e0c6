#![no_std]

mod centralized;
mod chain;
mod decentralized;
mod error;
mod event_record;
mod events;
mod round;
mod safe_math;
mod settlement;
mod storage;
mod types;

#[cfg(test)]
mod test_utils;

use soroban_sdk::{contract, contractimpl, token, Address, Env, String, Vec};

pub use error::OracleError;
pub use event_record::{MAX_OUTCOMES, MAX_OUTCOME_NAME_LEN, MIN_OUTCOMES};
pub use round::{OracleRound, RoundVerdict, StakeEffect};
pub use safe_math::{mul_div_floor, SafeMath};
pub use settlement::compute_earnings;
pub use types::{
    CentralizedRound, CentralizedStatus, Config, DecentralizedRound, DecentralizedStatus,
    EscalationChain, EventPhase, EventRecord, OracleSettings, RoundRecord, StakePool,
    ThresholdPolicy,
};

use events::{
    BetPlaced, DisputeStaked, EventCreated, InitEvent, PauseEvent, ResultFinalized,
    ResultReported, RoundFinalized, RoundFinalizedDiag, SettingsUpdateEvent, UnpauseEvent,
    VoteCast,
};
use types::DataKey;

// ═══════════════════════════════════════════════════════════════════════════
// PROTOCOL INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════
//
// INV-1: EventRecord.total_stake = Σ stake_by_outcome; same for every round
// INV-2: Bets only while betting_start <= now < betting_end
// INV-3: A chain has at most one open round, its last one
// INV-4: round[i+1].consensus_threshold > round[i].consensus_threshold
// INV-5: EscalationChain.final_result and a round's final outcome are set once
// INV-6: A stake entry pays out at most once (zeroed on withdrawal)
// INV-7: Σ withdrawals from a pool <= total deposited into that pool
//
// ═══════════════════════════════════════════════════════════════════════════

#[contract]
pub struct OracleMarketContract;

#[contractimpl]
impl OracleMarketContract {
    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_not_paused(env: &Env) -> Result<(), OracleError> {
        if storage::is_paused(env) {
            return Err(OracleError::Paused);
        }
        Ok(())
    }

    fn require_admin(env: &Env, admin: &Address) -> Result<Config, OracleError> {
        admin.require_auth();
        let config = storage::get_config(env)?;
        if *admin != config.admin {
            return Err(OracleError::Unauthorized);
        }
        Ok(config)
    }

    fn load_centralized(env: &Env, round_id: u64) -> Result<CentralizedRound, OracleError> {
        match storage::load_round(env, round_id)? {
            RoundRecord::Centralized(round) => Ok(round),
            RoundRecord::Decentralized(_) => Err(OracleError::InvalidRoundState),
        }
    }

    fn load_decentralized(env: &Env, round_id: u64) -> Result<DecentralizedRound, OracleError> {
        match storage::load_round(env, round_id)? {
            RoundRecord::Decentralized(round) => Ok(round),
            RoundRecord::Centralized(_) => Err(OracleError::InvalidRoundState),
        }
    }

    /// Pulls pre-approved oracle stake from `from` into the contract.
    fn pull_vote_stake(env: &Env, config: &Config, from: &Address, amount: i128) {
        let token_client = token::Client::new(env, &config.vote_token);
        let contract = env.current_contract_address();
        token_client.transfer_from(&contract, from, &contract, &amount);
    }

    fn add_round_stake(
        env: &Env,
        round_id: u64,
        who: &Address,
        outcome: u32,
        amount: i128,
    ) -> Result<(), OracleError> {
        let key = DataKey::RoundStake(round_id, who.clone(), outcome);
        let updated = storage::get_stake(env, &key).safe_add(amount)?;
        storage::set_stake(env, &key, updated);
        Ok(())
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    /// Initialize the contract. Later calls are no-ops.
    pub fn init(
        env: Env,
        admin: Address,
        bet_token: Address,
        vote_token: Address,
        settings: OracleSettings,
    ) -> Result<(), OracleError> {
        if storage::has_config(&env) {
            return Ok(());
        }
        settings.validate()?;

        storage::set_config(
            &env,
            &Config {
                admin: admin.clone(),
                bet_token: bet_token.clone(),
                vote_token: vote_token.clone(),
                settings: settings.clone(),
            },
        );

        InitEvent {
            admin,
            bet_token,
            vote_token,
            settings,
        }
        .publish(&env);
        Ok(())
    }

    /// Replace the oracle settings used by events created from now on.
    /// Existing chains keep the snapshot they were created with.
    pub fn set_settings(
        env: Env,
        admin: Address,
        settings: OracleSettings,
    ) -> Result<(), OracleError> {
        Self::require_not_paused(&env)?;
        let mut config = Self::require_admin(&env, &admin)?;
        settings.validate()?;

        config.settings = settings.clone();
        storage::set_config(&env, &config);

        SettingsUpdateEvent { admin, settings }.publish(&env);
        Ok(())
    }

    /// Stop all state-changing entry points. Admin only.
    pub fn pause(env: Env, admin: Address) -> Result<(), OracleError> {
        Self::require_admin(&env, &admin)?;
        storage::set_paused(&env, true);
        PauseEvent { admin }.publish(&env);
        Ok(())
    }

    pub fn unpause(env: Env, admin: Address) -> Result<(), OracleError> {
        Self::require_admin(&env, &admin)?;
        storage::set_paused(&env, false);
        UnpauseEvent { admin }.publish(&env);
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<Config, OracleError> {
        storage::get_config(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    // ── Events and betting ────────────────────────────────────────────────────

    /// Create a new event and its oracle chain. Returns the event id.
    ///
    /// # Arguments
    /// * `creator`            - Informational owner (must provide auth).
    /// * `oracle`             - Designated reporter of the centralized round.
    /// * `outcome_names`      - 2..=10 non-empty labels; extra entries are dropped.
    /// * `betting_start`      - First timestamp at which bets are accepted.
    /// * `betting_end`        - Betting closes and reporting opens here.
    /// * `result_setting_end` - Reporting window of the designated oracle closes here.
    ///
    /// # Errors
    /// `InvalidArgument` for bad outcome lists or window ordering.
    pub fn create_event(
        env: Env,
        creator: Address,
        oracle: Address,
        outcome_names: Vec<String>,
        betting_start: u64,
        betting_end: u64,
        result_setting_end: u64,
    ) -> Result<u64, OracleError> {
        Self::require_not_paused(&env)?;
        creator.require_auth();
        let config = storage::get_config(&env)?;

        let event = EventRecord::new(
            &env,
            creator.clone(),
            outcome_names,
            betting_start,
            betting_end,
            result_setting_end,
            env.ledger().timestamp(),
        )?;

        let event_id = storage::next_event_id(&env);
        let chain = EscalationChain::bootstrap(&env, event_id, &event, oracle, config.settings)?;
        storage::save_event(&env, event_id, &event);
        storage::save_chain(&env, &chain);

        EventCreated {
            event_id,
            creator,
            outcomes: event.outcome_names,
            betting_end,
        }
        .publish(&env);

        Ok(event_id)
    }

    /// Stake `amount` of the bet token on `outcome`. Funds move from the
    /// bettor to the contract in the same invocation.
    pub fn bet(
        env: Env,
        bettor: Address,
        event_id: u64,
        outcome: u32,
        amount: i128,
    ) -> Result<(), OracleError> {
        Self::require_not_paused(&env)?;
        bettor.require_auth();
        let config = storage::get_config(&env)?;

        let mut event = storage::load_event(&env, event_id)?;
        event.record_bet(env.ledger().timestamp(), outcome, amount)?;

        let token_client = token::Client::new(&env, &config.bet_token);
        token_client.transfer(&bettor, &env.current_contract_address(), &amount);

        let key = DataKey::BetStake(event_id, bettor.clone(), outcome);
        let updated = storage::get_stake(&env, &key).safe_add(amount)?;
        storage::set_stake(&env, &key, updated);
        storage::save_event(&env, event_id, &event);

        BetPlaced {
            event_id,
            outcome,
            amount,
            bettor,
        }
        .publish(&env);
        Ok(())
    }

    pub fn get_event(env: Env, event_id: u64) -> Result<EventRecord, OracleError> {
        storage::load_event(&env, event_id)
    }

    pub fn get_event_count(env: Env) -> u64 {
        storage::event_count(&env)
    }

    pub fn get_event_phase(env: Env, event_id: u64) -> Result<EventPhase, OracleError> {
        let event = storage::load_event(&env, event_id)?;
        let chain = storage::load_chain(&env, event_id)?;
        Ok(event.phase(env.ledger().timestamp(), chain.final_result))
    }

    /// Total staked on `outcome` by all bettors.
    pub fn get_result_balance(env: Env, event_id: u64, outcome: u32) -> Result<i128, OracleError> {
        storage::load_event(&env, event_id)?.result_balance(outcome)
    }

    /// What `who` currently has staked on `outcome` (zero after withdrawal).
    pub fn get_bet_balance(
        env: Env,
        event_id: u64,
        outcome: u32,
        who: Address,
    ) -> Result<i128, OracleError> {
        let event = storage::load_event(&env, event_id)?;
        if outcome >= event.num_outcomes() {
            return Err(OracleError::InvalidArgument);
        }
        Ok(storage::get_stake(&env, &DataKey::BetStake(event_id, who, outcome)))
    }

    pub fn get_total_balance(env: Env, event_id: u64) -> Result<i128, OracleError> {
        Ok(storage::load_event(&env, event_id)?.total_stake)
    }

    // ── Centralized round ─────────────────────────────────────────────────────

    /// Report the event result. Only the designated oracle, only inside the
    /// reporting window, only once.
    pub fn report(
        env: Env,
        reporter: Address,
        round_id: u64,
        outcome: u32,
    ) -> Result<(), OracleError> {
        Self::require_not_paused(&env)?;
        reporter.require_auth();

        let mut round = Self::load_centralized(&env, round_id)?;
        round.report(env.ledger().timestamp(), &reporter, outcome)?;
        storage::save_round(&env, round_id, &RoundRecord::Centralized(round));

        ResultReported {
            round_id,
            outcome,
            reporter,
        }
        .publish(&env);
        Ok(())
    }

    /// Report on behalf of a silent oracle after its window closed. The caller
    /// escrows the round threshold in vote tokens (pre-approved) as stake on
    /// the reported outcome.
    pub fn open_report(
        env: Env,
        reporter: Address,
        round_id: u64,
        outcome: u32,
    ) -> Result<(), OracleError> {
        Self::require_not_paused(&env)?;
        reporter.require_auth();
        let config = storage::get_config(&env)?;

        let mut round = Self::load_centralized(&env, round_id)?;
        let bond = round.open_report(env.ledger().timestamp(), outcome)?;

        Self::pull_vote_stake(&env, &config, &reporter, bond);
        Self::add_round_stake(&env, round_id, &reporter, outcome, bond)?;
        storage::save_round(&env, round_id, &RoundRecord::Centralized(round));

        ResultReported {
            round_id,
            outcome,
            reporter,
        }
        .publish(&env);
        Ok(())
    }

    /// Stake vote tokens (pre-approved) on an outcome during the dispute
    /// window. Escalates to a decentralized round once dissent exceeds the
    /// round threshold.
    pub fn dispute(
        env: Env,
        disputer: Address,
        round_id: u64,
        outcome: u32,
        amount: i128,
    ) -> Result<(), OracleError> {
        Self::require_not_paused(&env)?;
        disputer.require_auth();
        let config = storage::get_config(&env)?;

        let mut round = Self::load_centralized(&env, round_id)?;
        let effect = round.accept_stake(env.ledger().timestamp(), outcome, amount)?;

        Self::pull_vote_stake(&env, &config, &disputer, amount);
        Self::add_round_stake(&env, round_id, &disputer, outcome, amount)?;

        let event_id = round.event_id;
        let num_outcomes = round.num_outcomes;
        storage::save_round(&env, round_id, &RoundRecord::Centralized(round));

        DisputeStaked {
            round_id,
            outcome,
            amount,
            disputer,
        }
        .publish(&env);

        if let StakeEffect::Escalate(seed) = effect {
            let mut chain = storage::load_chain(&env, event_id)?;
            chain.advance(&env, round_id, num_outcomes, seed)?;
            storage::save_chain(&env, &chain);
        }
        Ok(())
    }

    // ── Decentralized round ───────────────────────────────────────────────────

    /// Stake vote tokens (pre-approved) on an outcome. One vote per voter
    /// per round.
    pub fn vote_result(
        env: Env,
        voter: Address,
        round_id: u64,
        outcome: u32,
        amount: i128,
    ) -> Result<(), OracleError> {
        Self::require_not_paused(&env)?;
        voter.require_auth();
        let config = storage::get_config(&env)?;

        let mut round = Self::load_decentralized(&env, round_id)?;
        if storage::has_voted(&env, round_id, &voter) {
            return Err(OracleError::AlreadyVoted);
        }
        round.accept_stake(env.ledger().timestamp(), outcome, amount)?;

        Self::pull_vote_stake(&env, &config, &voter, amount);
        storage::set_stake(
            &env,
            &DataKey::RoundStake(round_id, voter.clone(), outcome),
            amount,
        );
        storage::mark_voted(&env, round_id, &voter);
        storage::save_round(&env, round_id, &RoundRecord::Decentralized(round));

        VoteCast {
            round_id,
            outcome,
            amount,
            voter,
        }
        .publish(&env);
        Ok(())
    }

    // ── Finalization ──────────────────────────────────────────────────────────

    /// Close a round whose window has elapsed and return its outcome. Either
    /// settles the event or escalates to a new round. Calling it again on a
    /// finalized round returns the same outcome without side effects.
    pub fn finalize_round(env: Env, round_id: u64) -> Result<u32, OracleError> {
        Self::require_not_paused(&env)?;

        let mut record = storage::load_round(&env, round_id)?;
        if let Some(outcome) = record.final_outcome() {
            return Ok(outcome);
        }

        let mut chain = storage::load_chain(&env, record.event_id())?;
        let now = env.ledger().timestamp();
        let verdict = record.finalize(now, chain.can_escalate())?;
        let outcome = record
            .final_outcome()
            .ok_or(OracleError::InvalidRoundState)?;
        storage::save_round(&env, round_id, &record);

        RoundFinalized { round_id, outcome }.publish(&env);
        RoundFinalizedDiag {
            round_id,
            outcome,
            total_stake: record.total_stake(),
            winning_stake: record.stake_on(outcome),
            timestamp: now,
        }
        .publish(&env);

        match verdict {
            RoundVerdict::Settled(result) => {
                chain.settle(result)?;
                ResultFinalized {
                    event_id: chain.event_id,
                    outcome: result,
                    rounds: chain.rounds.len(),
                }
                .publish(&env);
            }
            RoundVerdict::Escalate(seed) => {
                chain.advance(&env, round_id, record.num_outcomes(), seed)?;
            }
        }
        storage::save_chain(&env, &chain);

        Ok(outcome)
    }

    pub fn get_final_result(env: Env, event_id: u64) -> Result<u32, OracleError> {
        storage::load_chain(&env, event_id)?.final_result()
    }

    pub fn get_chain(env: Env, event_id: u64) -> Result<EscalationChain, OracleError> {
        storage::load_chain(&env, event_id)
    }

    pub fn get_current_round(env: Env, event_id: u64) -> Result<u64, OracleError> {
        storage::load_chain(&env, event_id)?.current_round()
    }

    pub fn get_round(env: Env, round_id: u64) -> Result<RoundRecord, OracleError> {
        storage::load_round(&env, round_id)
    }

    pub fn get_round_stake(env: Env, round_id: u64, outcome: u32) -> Result<i128, OracleError> {
        let record = storage::load_round(&env, round_id)?;
        if outcome >= record.num_outcomes() {
            return Err(OracleError::InvalidArgument);
        }
        Ok(record.stake_on(outcome))
    }

    pub fn get_vote_balance(
        env: Env,
        round_id: u64,
        outcome: u32,
        who: Address,
    ) -> Result<i128, OracleError> {
        let record = storage::load_round(&env, round_id)?;
        if outcome >= record.num_outcomes() {
            return Err(OracleError::InvalidArgument);
        }
        Ok(storage::get_stake(&env, &DataKey::RoundStake(round_id, who, outcome)))
    }

    pub fn has_voted(env: Env, round_id: u64, who: Address) -> bool {
        storage::has_voted(&env, round_id, &who)
    }

    // ── Settlement ────────────────────────────────────────────────────────────

    /// Withdraw winnings from the event's betting pool.
    ///
    /// # Errors
    /// * `NotYetFinal`       - the chain has no final result yet
    /// * `NothingToWithdraw` - no stake on the winning outcome, or already withdrawn
    pub fn withdraw_event_earnings(
        env: Env,
        who: Address,
        event_id: u64,
    ) -> Result<i128, OracleError> {
        Self::require_not_paused(&env)?;
        who.require_auth();
        let config = storage::get_config(&env)?;

        let result = storage::load_chain(&env, event_id)?.final_result()?;
        let event = storage::load_event(&env, event_id)?;
        let winning_pool = event.result_balance(result)?;
        let total_pool = event.total_stake;

        settlement::withdraw(
            &env,
            &who,
            StakePool::Event(event_id),
            &config.bet_token,
            &DataKey::BetStake(event_id, who.clone(), result),
            |stake| settlement::compute_earnings(&env, total_pool, winning_pool, stake),
        )
    }

    /// Withdraw winnings from one oracle round's stake pool. Winners are the
    /// participants who staked on the event's final result.
    ///
    /// # Errors
    /// * `NothingToWithdraw` - no final result yet, no winning stake, or already withdrawn
    pub fn withdraw_round_earnings(
        env: Env,
        who: Address,
        round_id: u64,
    ) -> Result<i128, OracleError> {
        Self::require_not_paused(&env)?;
        who.require_auth();
        let config = storage::get_config(&env)?;

        let record = storage::load_round(&env, round_id)?;
        let result = storage::load_chain(&env, record.event_id())?
            .final_result
            .ok_or(OracleError::NothingToWithdraw)?;

        settlement::withdraw(
            &env,
            &who,
            StakePool::Round(round_id),
            &config.vote_token,
            &DataKey::RoundStake(round_id, who.clone(), result),
            |stake| record.earnings(&env, result, stake),
        )
    }

    /// Amount `withdraw_event_earnings` would pay `who` right now.
    pub fn preview_event_earnings(
        env: Env,
        event_id: u64,
        who: Address,
    ) -> Result<i128, OracleError> {
        let result = storage::load_chain(&env, event_id)?.final_result()?;
        let event = storage::load_event(&env, event_id)?;
        let stake = storage::get_stake(&env, &DataKey::BetStake(event_id, who, result));
        if stake == 0 {
            return Ok(0);
        }
        settlement::compute_earnings(&env, event.total_stake, event.result_balance(result)?, stake)
    }
}
