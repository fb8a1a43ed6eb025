#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;
pub mod validate;

pub use model::{
    Expense, ExpenseId, ExpenseShare, GroupId, Ledger, Member, MemberBalances, MemberId,
    PaymentKind, Settlement, SimplificationStep, SplitKind,
};
pub use services::{
    BalanceAccumulator, RateSnapshot, SettlementError, SettlementMode, SplitSpec, apply_rate,
    compute_balances, equal_split, normalize_exact_split, pairwise_settlements, percentage_split,
    settlements_for_mode, simplification_trace, simplified_settlements, split_amount,
};
pub use validate::ValidationError;
