//! First-stage oracle round.
//!
//! `AwaitingReport -> Reported -> {Finalized | Escalated}`
//!
//! The designated reporter reports inside `[reporting_start, reporting_end)`.
//! If it stays silent, anyone may report after `reporting_end` by bonding the
//! round threshold. A report opens a dispute window of `dispute_window`
//! seconds during which anyone may stake on any outcome; when stake on
//! outcomes other than the reported one exceeds the threshold the round is
//! escalated. A report that survives the window finalizes.

use soroban_sdk::{Address, Env, Vec};

use crate::error::OracleError;
use crate::event_record::{add_stake, empty_stakes};
use crate::round::{OracleRound, RoundVerdict, StakeEffect};
use crate::safe_math::SafeMath;
use crate::types::{CentralizedRound, CentralizedStatus};

impl CentralizedRound {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        env: &Env,
        event_id: u64,
        num_outcomes: u32,
        reporter: Address,
        reporting_start: u64,
        reporting_end: u64,
        dispute_window: u64,
        consensus_threshold: i128,
    ) -> Result<Self, OracleError> {
        if reporting_start >= reporting_end || consensus_threshold <= 0 || dispute_window == 0 {
            return Err(OracleError::InvalidArgument);
        }
        Ok(CentralizedRound {
            event_id,
            num_outcomes,
            reporter,
            reporting_start,
            reporting_end,
            dispute_window,
            dispute_end: 0,
            consensus_threshold,
            status: CentralizedStatus::AwaitingReport,
            reported_outcome: None,
            stake_by_outcome: empty_stakes(env, num_outcomes),
            total_stake: 0,
        })
    }

    /// Report by the designated reporter, inside the reporting window.
    pub fn report(&mut self, now: u64, from: &Address, outcome: u32) -> Result<(), OracleError> {
        if self.status != CentralizedStatus::AwaitingReport {
            return Err(OracleError::AlreadyReported);
        }
        if *from != self.reporter {
            return Err(OracleError::Unauthorized);
        }
        if now < self.reporting_start || now >= self.reporting_end {
            return Err(OracleError::WindowClosed);
        }
        if outcome >= self.num_outcomes {
            return Err(OracleError::InvalidArgument);
        }
        self.open_dispute_window(now, outcome)
    }

    /// Report by anyone once the designated reporter missed its window.
    ///
    /// Returns the bond the caller must escrow; it is recorded as stake on
    /// `outcome` in this round's pool.
    pub fn open_report(&mut self, now: u64, outcome: u32) -> Result<i128, OracleError> {
        if self.status != CentralizedStatus::AwaitingReport {
            return Err(OracleError::AlreadyReported);
        }
        if now < self.reporting_end {
            return Err(OracleError::TooEarly);
        }
        if outcome >= self.num_outcomes {
            return Err(OracleError::InvalidArgument);
        }

        let bond = self.consensus_threshold;
        add_stake(&mut self.stake_by_outcome, outcome, bond)?;
        self.total_stake = self.total_stake.safe_add(bond)?;
        self.open_dispute_window(now, outcome)?;
        Ok(bond)
    }

    fn open_dispute_window(&mut self, now: u64, outcome: u32) -> Result<(), OracleError> {
        self.dispute_end = now.safe_add(self.dispute_window)?;
        self.reported_outcome = Some(outcome);
        self.status = CentralizedStatus::Reported;
        Ok(())
    }

    /// Stake on outcomes other than the reported one.
    pub fn dissenting_stake(&self) -> Result<i128, OracleError> {
        match self.reported_outcome {
            Some(reported) => self.total_stake.safe_sub(self.stake_on(reported)),
            None => Ok(0),
        }
    }
}

impl OracleRound for CentralizedRound {
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
        match self.status {
            CentralizedStatus::Finalized => self.reported_outcome,
            _ => None,
        }
    }

    fn accept_stake(
        &mut self,
        now: u64,
        outcome: u32,
        amount: i128,
    ) -> Result<StakeEffect, OracleError> {
        let reported = match (self.status, self.reported_outcome) {
            (CentralizedStatus::Reported, Some(reported)) => reported,
            _ => return Err(OracleError::InvalidRoundState),
        };
        if now >= self.dispute_end {
            return Err(OracleError::WindowClosed);
        }
        if amount <= 0 || outcome >= self.num_outcomes {
            return Err(OracleError::InvalidArgument);
        }

        add_stake(&mut self.stake_by_outcome, outcome, amount)?;
        self.total_stake = self.total_stake.safe_add(amount)?;

        if self.dissenting_stake()? > self.consensus_threshold {
            self.status = CentralizedStatus::Escalated;
            return Ok(StakeEffect::Escalate(reported));
        }
        Ok(StakeEffect::Recorded)
    }

    fn finalize(&mut self, now: u64, _can_escalate: bool) -> Result<RoundVerdict, OracleError> {
        match (self.status, self.reported_outcome) {
            (CentralizedStatus::Reported, Some(reported)) => {
                if now < self.dispute_end {
                    return Err(OracleError::TooEarly);
                }
                self.status = CentralizedStatus::Finalized;
                Ok(RoundVerdict::Settled(reported))
            }
            (CentralizedStatus::AwaitingReport, _) => Err(OracleError::TooEarly),
            _ => Err(OracleError::InvalidRoundState),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    const THRESHOLD: i128 = 100;

    fn round(env: &Env, reporter: &Address) -> CentralizedRound {
        // reporting window [100, 200), dispute window 50s
        CentralizedRound::new(env, 0, 3, reporter.clone(), 100, 200, 50, THRESHOLD).unwrap()
    }

    #[test]
    fn test_new_validates_window_and_threshold() {
        let env = Env::default();
        let reporter = Address::generate(&env);
        assert_eq!(
            CentralizedRound::new(&env, 0, 2, reporter.clone(), 200, 200, 50, 1),
            Err(OracleError::InvalidArgument)
        );
        assert_eq!(
            CentralizedRound::new(&env, 0, 2, reporter.clone(), 100, 200, 50, 0),
            Err(OracleError::InvalidArgument)
        );
        assert_eq!(
            CentralizedRound::new(&env, 0, 2, reporter, 100, 200, 0, 1),
            Err(OracleError::InvalidArgument)
        );
    }

    #[test]
    fn test_report_rules() {
        let env = Env::default();
        let reporter = Address::generate(&env);
        let stranger = Address::generate(&env);
        let mut r = round(&env, &reporter);

        assert_eq!(r.report(150, &stranger, 1), Err(OracleError::Unauthorized));
        assert_eq!(r.report(99, &reporter, 1), Err(OracleError::WindowClosed));
        assert_eq!(r.report(200, &reporter, 1), Err(OracleError::WindowClosed));
        assert_eq!(r.report(150, &reporter, 3), Err(OracleError::InvalidArgument));
        assert_eq!(r.status, CentralizedStatus::AwaitingReport);

        r.report(150, &reporter, 2).unwrap();
        assert_eq!(r.status, CentralizedStatus::Reported);
        assert_eq!(r.reported_outcome, Some(2));
        assert_eq!(r.dispute_end, 200);
        assert_eq!(r.final_outcome(), None);

        assert_eq!(r.report(160, &reporter, 1), Err(OracleError::AlreadyReported));
        assert_eq!(r.reported_outcome, Some(2));
    }

    #[test]
    fn test_unchallenged_report_finalizes_after_window() {
        let env = Env::default();
        let reporter = Address::generate(&env);
        let mut r = round(&env, &reporter);

        assert_eq!(r.finalize(150, true), Err(OracleError::TooEarly));
        r.report(150, &reporter, 2).unwrap();
        assert_eq!(r.finalize(199, true), Err(OracleError::TooEarly));
        assert_eq!(r.finalize(200, true), Ok(RoundVerdict::Settled(2)));
        assert_eq!(r.final_outcome(), Some(2));
        assert_eq!(r.finalize(500, true), Err(OracleError::InvalidRoundState));
        assert_eq!(r.final_outcome(), Some(2));
    }

    #[test]
    fn test_dispute_escalates_only_when_dissent_exceeds_threshold() {
        let env = Env::default();
        let reporter = Address::generate(&env);
        let mut r = round(&env, &reporter);

        assert_eq!(r.accept_stake(120, 0, 10), Err(OracleError::InvalidRoundState));
        r.report(150, &reporter, 2).unwrap();

        assert_eq!(r.accept_stake(160, 0, 0), Err(OracleError::InvalidArgument));
        assert_eq!(r.accept_stake(160, 7, 10), Err(OracleError::InvalidArgument));

        // Support for the reported outcome is not dissent.
        assert_eq!(r.accept_stake(160, 2, 500), Ok(StakeEffect::Recorded));
        assert_eq!(r.accept_stake(160, 0, 60), Ok(StakeEffect::Recorded));
        // 60 + 40 == threshold, not above it.
        assert_eq!(r.accept_stake(170, 1, 40), Ok(StakeEffect::Recorded));
        assert_eq!(r.dissenting_stake(), Ok(THRESHOLD));
        assert_eq!(r.accept_stake(180, 1, 1), Ok(StakeEffect::Escalate(2)));
        assert_eq!(r.status, CentralizedStatus::Escalated);
        assert_eq!(r.total_stake, 601);

        assert_eq!(r.accept_stake(181, 1, 1), Err(OracleError::InvalidRoundState));
        assert_eq!(r.finalize(300, true), Err(OracleError::InvalidRoundState));
        assert_eq!(r.final_outcome(), None);
    }

    #[test]
    fn test_dispute_after_window_is_rejected() {
        let env = Env::default();
        let reporter = Address::generate(&env);
        let mut r = round(&env, &reporter);
        r.report(150, &reporter, 2).unwrap();
        assert_eq!(r.accept_stake(200, 0, 500), Err(OracleError::WindowClosed));
    }

    #[test]
    fn test_open_report_after_silent_reporter() {
        let env = Env::default();
        let reporter = Address::generate(&env);
        let mut r = round(&env, &reporter);

        assert_eq!(r.open_report(199, 1), Err(OracleError::TooEarly));
        assert_eq!(r.open_report(200, 3), Err(OracleError::InvalidArgument));
        assert_eq!(r.open_report(200, 1), Ok(THRESHOLD));
        assert_eq!(r.status, CentralizedStatus::Reported);
        assert_eq!(r.stake_on(1), THRESHOLD);
        assert_eq!(r.dissenting_stake(), Ok(0));
        assert_eq!(r.dispute_end, 250);
        assert_eq!(r.open_report(210, 0), Err(OracleError::AlreadyReported));
        assert_eq!(r.report(210, &reporter, 0), Err(OracleError::AlreadyReported));
    }
}
