//! Share splitting: turns a total and a split specification into
//! per-participant shares that sum to the total exactly.
//!
//! Remainder handling is deterministic and stable: truncation leftovers are
//! handed out one 0.0001 unit at a time, front-first for additions and
//! back-first for subtractions. Never random, never proportional.

use splitpot_money::{Money, Percent};

use crate::{
    model::{MemberId, SplitKind},
    validate::{self, ValidationError},
};

/// How an expense total is divided among its participants. Dispatch is an
/// explicit match on the variant; the tag is retained on the expense as
/// [`SplitKind`] so it can be re-edited later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitSpec {
    Equal { participants: Vec<MemberId> },
    Percentage { allocations: Vec<(MemberId, Percent)> },
    Exact { allocations: Vec<(MemberId, Money)> },
}

impl SplitSpec {
    pub fn kind(&self) -> SplitKind {
        match self {
            Self::Equal { .. } => SplitKind::Equal,
            Self::Percentage { .. } => SplitKind::Percentage,
            Self::Exact { .. } => SplitKind::Exact,
        }
    }

    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        let ids: Vec<MemberId> = match self {
            Self::Equal { participants } => participants.clone(),
            Self::Percentage { allocations } => allocations.iter().map(|(id, _)| *id).collect(),
            Self::Exact { allocations } => allocations.iter().map(|(id, _)| *id).collect(),
        };
        ids.into_iter()
    }
}

/// Validates the specification and produces per-member shares summing
/// exactly to `total`.
pub fn split_amount(
    total: Money,
    spec: &SplitSpec,
) -> Result<Vec<(MemberId, Money)>, ValidationError> {
    validate::ensure_non_negative("split.total", total)?;
    validate::ensure_unique_ids("split.participants", spec.members().map(|id| id.0))?;

    match spec {
        SplitSpec::Equal { participants } => {
            let shares = equal_split(total, participants.len());
            Ok(participants.iter().copied().zip(shares).collect())
        }
        SplitSpec::Percentage { allocations } => {
            for (_, percent) in allocations {
                validate::ensure_percent_in_range("split.percentages", *percent)?;
            }
            validate::ensure_percent_sum(
                "split.percentages",
                allocations.iter().map(|(_, percent)| *percent),
            )?;
            let percents: Vec<Percent> = allocations.iter().map(|(_, p)| *p).collect();
            let shares = percentage_split(total, &percents);
            Ok(allocations
                .iter()
                .map(|(id, _)| *id)
                .zip(shares)
                .collect())
        }
        SplitSpec::Exact { allocations } => {
            for (_, share) in allocations {
                validate::ensure_non_negative("split.shares", *share)?;
            }
            let shares: Vec<Money> = allocations.iter().map(|(_, share)| *share).collect();
            let shares = normalize_exact_split(shares, total);
            Ok(allocations
                .iter()
                .map(|(id, _)| *id)
                .zip(shares)
                .collect())
        }
    }
}

/// Equal split: base share is the truncated quotient, the remainder goes to
/// the first `remainder` participants one unit each, in their given order.
pub fn equal_split(total: Money, participants: usize) -> Vec<Money> {
    if participants == 0 {
        return Vec::new();
    }

    let count = participants as i64;
    let base = total.raw() / count;
    let remainder = total.raw() - base * count;
    let unit = remainder.signum();
    let compensated = remainder.unsigned_abs() as usize;

    (0..participants)
        .map(|idx| {
            let extra = if idx < compensated { unit } else { 0 };
            Money::from_scaled(base + extra)
        })
        .collect()
}

/// Percentage split: each raw share is the truncated percentage of the
/// total; the leftover is front-loaded exactly like the equal split.
/// Percentage-sum validation happens upstream (see [`split_amount`]), not
/// here.
pub fn percentage_split(total: Money, percents: &[Percent]) -> Vec<Money> {
    let mut shares: Vec<Money> = percents
        .iter()
        .map(|percent| total.percent_of(*percent))
        .collect();
    let leftover = total - shares.iter().sum();
    front_load(&mut shares, leftover);
    shares
}

/// Exact split: takes the caller's shares as given and closes any gap with
/// the total. A short ledger is topped up front-first; an overage is taken
/// back one unit at a time starting from the last participant, skipping
/// shares that are not positive so no share is ever driven negative.
pub fn normalize_exact_split(shares: Vec<Money>, total: Money) -> Vec<Money> {
    let mut shares = shares;
    let gap = total - shares.iter().sum();

    if gap > Money::ZERO {
        front_load(&mut shares, gap);
    } else if gap < Money::ZERO {
        take_back(&mut shares, -gap);
    }
    shares
}

fn front_load(shares: &mut [Money], leftover: Money) {
    if shares.is_empty() {
        return;
    }

    let unit = Money::from_scaled(leftover.signum());
    let mut remaining = leftover;
    while !remaining.is_zero() {
        for share in shares.iter_mut() {
            *share += unit;
            remaining -= unit;
            if remaining.is_zero() {
                break;
            }
        }
    }
}

fn take_back(shares: &mut [Money], mut overage: Money) {
    let unit = Money::from_scaled(1);
    while overage > Money::ZERO {
        let mut progressed = false;
        for share in shares.iter_mut().rev() {
            if *share <= Money::ZERO {
                continue;
            }
            *share -= unit;
            overage -= unit;
            progressed = true;
            if overage.is_zero() {
                break;
            }
        }
        // Nothing positive left to reclaim from; validated input cannot get
        // here because a positive overage implies a positive share.
        if !progressed {
            debug_assert!(false, "overage with no positive shares");
            break;
        }
    }
}
