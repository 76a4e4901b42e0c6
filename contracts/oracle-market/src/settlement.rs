//! Proportional payouts from a stake pool.
//!
//! A winner who staked `s` on the winning outcome receives
//! `floor(total_pool * s / winning_pool)`. Pool totals are never decreased by
//! withdrawals; the participant's own entry is zeroed instead, so every share
//! is computed against the same denominators and a second withdrawal finds
//! nothing. Rounding leaves at most one unit per winner in the pool.

use soroban_sdk::{token, Address, Env};

use crate::error::OracleError;
use crate::events::EarningsWithdrawn;
use crate::safe_math::mul_div_floor;
use crate::storage;
use crate::types::{DataKey, StakePool};

/// POST: result <= total_pool
pub fn compute_earnings(
    env: &Env,
    total_pool: i128,
    winning_pool: i128,
    participant_stake: i128,
) -> Result<i128, OracleError> {
    if winning_pool <= 0 {
        return Err(OracleError::DivisionByZero);
    }
    if participant_stake < 0 || participant_stake > winning_pool || total_pool < winning_pool {
        return Err(OracleError::InvalidArgument);
    }
    mul_div_floor(env, total_pool, participant_stake, winning_pool)
}

/// Pays `who` their share of `pool` exactly once.
///
/// `stake_key` is the participant's entry on the winning outcome and `payout`
/// turns that stake into an amount. The entry is zeroed before the transfer.
pub fn withdraw<F>(
    env: &Env,
    who: &Address,
    pool: StakePool,
    token: &Address,
    stake_key: &DataKey,
    payout: F,
) -> Result<i128, OracleError>
where
    F: FnOnce(i128) -> Result<i128, OracleError>,
{
    let stake = storage::get_stake(env, stake_key);
    if stake <= 0 {
        return Err(OracleError::NothingToWithdraw);
    }

    let amount = payout(stake)?;
    storage::set_stake(env, stake_key, 0);

    if amount > 0 {
        let token_client = token::Client::new(env, token);
        token_client.transfer(&env.current_contract_address(), who, &amount);
    }

    EarningsWithdrawn {
        who: who.clone(),
        pool,
        amount,
    }
    .publish(env);

    Ok(amount)
}
