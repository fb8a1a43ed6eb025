pub mod balance;
pub mod exchange;
pub mod settlement;
pub mod simplify;
pub mod split;

pub use balance::{BalanceAccumulator, compute_balances};
pub use exchange::{RATE_TTL_HOURS, RateSnapshot, apply_rate};
pub use settlement::{
    SettlementError, SettlementMode, pairwise_settlements, settlements_for_mode,
    simplified_settlements,
};
pub use simplify::simplification_trace;
pub use split::{SplitSpec, equal_split, normalize_exact_split, percentage_split, split_amount};
