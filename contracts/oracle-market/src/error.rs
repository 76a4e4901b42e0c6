use soroban_sdk::contracterror;

/// Error codes surfaced to callers. Codes are part of the contract ABI and
/// must never be renumbered.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum OracleError {
    /// Malformed input: empty name, zero amount, out-of-range index, bad window.
    InvalidArgument = 1,
    /// The window for this operation has already closed.
    WindowClosed = 2,
    /// The window for this operation has not opened yet.
    TooEarly = 3,
    Unauthorized = 4,
    AlreadyVoted = 5,
    AlreadyReported = 6,
    /// Zero entitlement, losing side, or a repeated withdrawal.
    NothingToWithdraw = 7,
    NotYetFinal = 8,
    /// Nobody staked on the winning outcome.
    DivisionByZero = 9,
    EventNotFound = 10,
    RoundNotFound = 11,
    /// The round is in a state that does not accept this operation.
    InvalidRoundState = 12,
    Overflow = 13,
    NotInitialized = 14,
    Paused = 15,
}
