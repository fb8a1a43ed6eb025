//! Precondition guards for externally supplied input.
//!
//! Every guard is a pure function returning a typed failure with a stable
//! machine-readable code plus the offending field, so callers can map a
//! rejection to a precise message. Callers decide whether a failure is fatal
//! or recoverable; nothing here has side effects.

use fxhash::FxHashSet;
use splitpot_money::{Money, Percent, Rate};
use thiserror::Error;

use crate::model::MemberId;

/// Absolute tolerance for a percentage allocation: the parts must sum to
/// 100% within 0.01 percentage points.
pub const PERCENT_SUM_TOLERANCE: Percent = Percent::from_scaled(100);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate id {id} in {field}")]
    DuplicateId { field: &'static str, id: u64 },
    #[error("{field} references unknown member {member:?}")]
    UnresolvedMember {
        field: &'static str,
        member: MemberId,
    },
    #[error("{field} must not be negative (found {amount})")]
    NegativeAmount { field: &'static str, amount: Money },
    #[error("{field} must lie within 0..=100 (found {percent})")]
    PercentOutOfRange {
        field: &'static str,
        percent: Percent,
    },
    #[error("{field} must sum to 100% (found {sum})")]
    PercentSumMismatch { field: &'static str, sum: Percent },
    #[error("{field} shares sum to {actual}, expected {expected}")]
    ShareSumMismatch {
        field: &'static str,
        actual: Money,
        expected: Money,
    },
    #[error("{field} must not be empty")]
    EmptyString { field: &'static str },
    #[error("{field} is not a plausible email address")]
    MalformedEmail { field: &'static str },
    #[error("{field} exceeds the representable amount range")]
    AmountOutOfRange { field: &'static str },
    #[error("{field} must be a positive rate (found {rate})")]
    NonPositiveRate { field: &'static str, rate: Rate },
}

impl ValidationError {
    /// Stable error code, one per variant. Part of the caller contract;
    /// never reworded.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. } => "duplicate-id",
            Self::UnresolvedMember { .. } => "unresolved-reference",
            Self::NegativeAmount { .. } => "negative-value",
            Self::PercentOutOfRange { .. } => "percentage-out-of-range",
            Self::PercentSumMismatch { .. } => "percentage-sum-mismatch",
            Self::ShareSumMismatch { .. } => "share-sum-mismatch",
            Self::EmptyString { .. } => "empty-string",
            Self::MalformedEmail { .. } => "malformed-email",
            Self::AmountOutOfRange { .. } => "amount-out-of-range",
            Self::NonPositiveRate { .. } => "non-positive-rate",
        }
    }

    /// The offending field name supplied at the check site.
    pub fn field(&self) -> &'static str {
        match self {
            Self::DuplicateId { field, .. }
            | Self::UnresolvedMember { field, .. }
            | Self::NegativeAmount { field, .. }
            | Self::PercentOutOfRange { field, .. }
            | Self::PercentSumMismatch { field, .. }
            | Self::ShareSumMismatch { field, .. }
            | Self::EmptyString { field }
            | Self::MalformedEmail { field }
            | Self::AmountOutOfRange { field }
            | Self::NonPositiveRate { field, .. } => field,
        }
    }
}

pub fn ensure_non_negative(field: &'static str, amount: Money) -> Result<(), ValidationError> {
    if amount < Money::ZERO {
        return Err(ValidationError::NegativeAmount { field, amount });
    }
    Ok(())
}

pub fn ensure_positive_rate(field: &'static str, rate: Rate) -> Result<(), ValidationError> {
    if rate.raw() <= 0 {
        return Err(ValidationError::NonPositiveRate { field, rate });
    }
    Ok(())
}

pub fn ensure_unique_ids(
    field: &'static str,
    ids: impl IntoIterator<Item = u64>,
) -> Result<(), ValidationError> {
    let mut seen = FxHashSet::default();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId { field, id });
        }
    }
    Ok(())
}

pub fn ensure_known_member(
    field: &'static str,
    member: MemberId,
    known: &FxHashSet<MemberId>,
) -> Result<(), ValidationError> {
    if !known.contains(&member) {
        return Err(ValidationError::UnresolvedMember { field, member });
    }
    Ok(())
}

pub fn ensure_percent_in_range(
    field: &'static str,
    percent: Percent,
) -> Result<(), ValidationError> {
    if percent < Percent::ZERO || percent > Percent::ONE_HUNDRED {
        return Err(ValidationError::PercentOutOfRange { field, percent });
    }
    Ok(())
}

pub fn ensure_percent_sum(
    field: &'static str,
    percents: impl IntoIterator<Item = Percent>,
) -> Result<(), ValidationError> {
    let sum: Percent = percents.into_iter().sum();
    let deviation = (sum - Percent::ONE_HUNDRED).abs();
    if deviation > PERCENT_SUM_TOLERANCE {
        return Err(ValidationError::PercentSumMismatch { field, sum });
    }
    Ok(())
}

pub fn ensure_share_sum(
    field: &'static str,
    actual: Money,
    expected: Money,
) -> Result<(), ValidationError> {
    if actual != expected {
        return Err(ValidationError::ShareSumMismatch {
            field,
            actual,
            expected,
        });
    }
    Ok(())
}

pub fn ensure_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyString { field });
    }
    Ok(())
}

/// Syntactic shape check only: one `@`, a non-empty local part, a dotted
/// domain, no whitespace. Deliverability is the mailer's problem.
pub fn ensure_email_shape(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let malformed = ValidationError::MalformedEmail { field };
    let Some((local, domain)) = value.split_once('@') else {
        return Err(malformed);
    };
    let domain_ok = domain.contains('.')
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok || value.chars().any(char::is_whitespace) {
        return Err(malformed);
    }
    Ok(())
}
