use soroban_sdk::{Address, Env, String, Vec};

use crate::error::OracleError;
use crate::safe_math::SafeMath;
use crate::types::{EventPhase, EventRecord};

/// Outcome lists longer than this are truncated, not rejected.
pub const MAX_OUTCOMES: u32 = 10;
pub const MIN_OUTCOMES: u32 = 2;
/// Maximum length of a single outcome label in bytes.
pub const MAX_OUTCOME_NAME_LEN: u32 = 64;

/// Zero-filled per-outcome stake vector.
pub fn empty_stakes(env: &Env, num_outcomes: u32) -> Vec<i128> {
    let mut stakes = Vec::new(env);
    for _ in 0..num_outcomes {
        stakes.push_back(0);
    }
    stakes
}

/// Adds `amount` to `stakes[outcome]` and returns the new per-outcome total.
pub fn add_stake(stakes: &mut Vec<i128>, outcome: u32, amount: i128) -> Result<i128, OracleError> {
    let current = stakes.get(outcome).ok_or(OracleError::InvalidArgument)?;
    let updated = current.safe_add(amount)?;
    stakes.set(outcome, updated);
    Ok(updated)
}

impl EventRecord {
    /// Validates and builds a new event with an empty betting pool.
    ///
    /// Only the first `MAX_OUTCOMES` names are kept.
    pub fn new(
        env: &Env,
        owner: Address,
        outcome_names: Vec<String>,
        betting_start: u64,
        betting_end: u64,
        result_setting_end: u64,
        now: u64,
    ) -> Result<Self, OracleError> {
        let outcome_names = if outcome_names.len() > MAX_OUTCOMES {
            outcome_names.slice(0..MAX_OUTCOMES)
        } else {
            outcome_names
        };

        if outcome_names.len() < MIN_OUTCOMES {
            return Err(OracleError::InvalidArgument);
        }
        for name in outcome_names.iter() {
            if name.is_empty() || name.len() > MAX_OUTCOME_NAME_LEN {
                return Err(OracleError::InvalidArgument);
            }
        }

        if betting_start >= betting_end
            || result_setting_end <= betting_end
            || betting_end <= now
        {
            return Err(OracleError::InvalidArgument);
        }

        let stake_by_outcome = empty_stakes(env, outcome_names.len());
        Ok(EventRecord {
            owner,
            outcome_names,
            betting_start,
            betting_end,
            result_setting_end,
            stake_by_outcome,
            total_stake: 0,
        })
    }

    pub fn num_outcomes(&self) -> u32 {
        self.outcome_names.len()
    }

    /// Adds a bet to the pool totals. The caller records the bettor's own
    /// entry and moves the funds.
    pub fn record_bet(&mut self, now: u64, outcome: u32, amount: i128) -> Result<(), OracleError> {
        if now >= self.betting_end {
            return Err(OracleError::WindowClosed);
        }
        if now < self.betting_start {
            return Err(OracleError::TooEarly);
        }
        if amount <= 0 || outcome >= self.num_outcomes() {
            return Err(OracleError::InvalidArgument);
        }

        add_stake(&mut self.stake_by_outcome, outcome, amount)?;
        self.total_stake = self.total_stake.safe_add(amount)?;
        Ok(())
    }

    pub fn result_balance(&self, outcome: u32) -> Result<i128, OracleError> {
        self.stake_by_outcome
            .get(outcome)
            .ok_or(OracleError::InvalidArgument)
    }

    pub fn phase(&self, now: u64, final_result: Option<u32>) -> EventPhase {
        if final_result.is_some() {
            EventPhase::Final
        } else if now < self.betting_start {
            EventPhase::Upcoming
        } else if now < self.betting_end {
            EventPhase::Betting
        } else {
            EventPhase::Resolving
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    fn names(env: &Env, count: u32) -> Vec<String> {
        let labels = [
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l",
        ];
        let mut out = Vec::new(env);
        for label in labels.iter().take(count as usize) {
            out.push_back(String::from_str(env, label));
        }
        out
    }

    fn event(env: &Env, count: u32) -> Result<EventRecord, OracleError> {
        EventRecord::new(env, Address::generate(env), names(env, count), 0, 100, 200, 0)
    }

    #[test]
    fn test_outcome_count_bounds() {
        let env = Env::default();
        assert_eq!(event(&env, 0), Err(OracleError::InvalidArgument));
        assert_eq!(event(&env, 1), Err(OracleError::InvalidArgument));
        assert_eq!(event(&env, 2).unwrap().num_outcomes(), 2);
        assert_eq!(event(&env, 10).unwrap().num_outcomes(), 10);

        let truncated = event(&env, 11).unwrap();
        assert_eq!(truncated.num_outcomes(), 10);
        assert_eq!(
            truncated.outcome_names.get(9).unwrap(),
            String::from_str(&env, "j")
        );
        assert_eq!(truncated.stake_by_outcome.len(), 10);
    }

    #[test]
    fn test_rejects_empty_and_oversized_names() {
        let env = Env::default();
        let owner = Address::generate(&env);

        let mut with_empty = names(&env, 2);
        with_empty.push_back(String::from_str(&env, ""));
        assert_eq!(
            EventRecord::new(&env, owner.clone(), with_empty, 0, 100, 200, 0),
            Err(OracleError::InvalidArgument)
        );

        let mut with_long = names(&env, 2);
        with_long.push_back(String::from_str(
            &env,
            "an outcome label that is clearly far longer than sixty-four bytes in total",
        ));
        assert_eq!(
            EventRecord::new(&env, owner, with_long, 0, 100, 200, 0),
            Err(OracleError::InvalidArgument)
        );
    }

    #[test]
    fn test_window_ordering() {
        let env = Env::default();
        let owner = Address::generate(&env);
        let make = |start, end, rse, now| {
            EventRecord::new(&env, owner.clone(), names(&env, 2), start, end, rse, now)
        };
        assert_eq!(make(100, 100, 200, 0), Err(OracleError::InvalidArgument));
        assert_eq!(make(0, 100, 100, 0), Err(OracleError::InvalidArgument));
        assert_eq!(make(0, 100, 200, 100), Err(OracleError::InvalidArgument));
        assert!(make(0, 100, 101, 99).is_ok());
    }

    #[test]
    fn test_record_bet_gating() {
        let env = Env::default();
        let mut ev = EventRecord::new(
            &env,
            Address::generate(&env),
            names(&env, 3),
            10,
            100,
            200,
            0,
        )
        .unwrap();

        assert_eq!(ev.record_bet(5, 0, 1), Err(OracleError::TooEarly));
        assert_eq!(ev.record_bet(100, 0, 1), Err(OracleError::WindowClosed));
        assert_eq!(ev.record_bet(50, 3, 1), Err(OracleError::InvalidArgument));
        assert_eq!(ev.record_bet(50, 0, 0), Err(OracleError::InvalidArgument));
        assert_eq!(ev.record_bet(50, 0, -5), Err(OracleError::InvalidArgument));
        assert_eq!(ev.total_stake, 0);

        ev.record_bet(10, 0, 1).unwrap();
        ev.record_bet(99, 1, 2).unwrap();
        ev.record_bet(99, 1, 3).unwrap();
        assert_eq!(ev.result_balance(0), Ok(1));
        assert_eq!(ev.result_balance(1), Ok(5));
        assert_eq!(ev.result_balance(2), Ok(0));
        assert_eq!(ev.result_balance(3), Err(OracleError::InvalidArgument));
        assert_eq!(ev.total_stake, 6);
    }

    #[test]
    fn test_phase() {
        let env = Env::default();
        let ev = EventRecord::new(
            &env,
            Address::generate(&env),
            names(&env, 2),
            10,
            100,
            200,
            0,
        )
        .unwrap();
        assert_eq!(ev.phase(0, None), EventPhase::Upcoming);
        assert_eq!(ev.phase(10, None), EventPhase::Betting);
        assert_eq!(ev.phase(100, None), EventPhase::Resolving);
        assert_eq!(ev.phase(100, Some(1)), EventPhase::Final);
    }
}
