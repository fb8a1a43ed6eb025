//! Ledger data model: members, expenses, shares, and the computed
//! settlement shapes derived from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fxhash::FxHashSet;
use splitpot_money::{Money, Rate};

use crate::{
    services::split::{self, SplitSpec},
    validate::{self, ValidationError},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u64);

/// Net balance per member in the group's main currency.
///
/// Backed by a BTreeMap keyed by `MemberId`, so iteration order is stable;
/// the settlement solver's tie-breaking relies on this.
pub type MemberBalances = BTreeMap<MemberId, Money>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
}

impl Member {
    pub fn new(id: MemberId, display_name: impl ToString) -> Self {
        Self {
            id,
            display_name: display_name.to_string(),
        }
    }
}

/// Distinguishes ordinary shared expenses from direct person-to-person
/// transfers. Transfers flow through balance aggregation identically; the
/// tag exists for presentation and editing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentKind {
    Expense,
    Transfer,
}

/// The split method an expense was created with, retained for later
/// editing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitKind {
    Equal,
    Percentage,
    Exact,
}

/// One participant's slice of an expense, in the expense's original
/// currency and converted to the group's main currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpenseShare {
    pub member: MemberId,
    pub original_amount: Money,
    pub main_amount: Money,
}

/// A payment event. Construction computes the main-currency total and the
/// per-member shares once, from the snapshot rate captured at that moment;
/// neither is ever re-derived from a fresher rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    id: ExpenseId,
    group: GroupId,
    payer: MemberId,
    currency_code: String,
    original_total: Money,
    rate: Rate,
    main_total: Money,
    kind: PaymentKind,
    split_kind: SplitKind,
    created_at: DateTime<Utc>,
    shares: Vec<ExpenseShare>,
}

impl Expense {
    /// Builds a shared expense, splitting the total according to `split`.
    ///
    /// Both share columns sum exactly to their totals: original-currency
    /// shares come straight from the split engine, and the converted shares
    /// are re-normalized so rate truncation cannot leak units.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ExpenseId,
        group: GroupId,
        payer: MemberId,
        currency_code: impl ToString,
        original_total: Money,
        rate: Rate,
        split: &SplitSpec,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let currency_code = currency_code.to_string();
        validate::ensure_non_empty("expense.currency_code", &currency_code)?;
        validate::ensure_non_negative("expense.original_total", original_total)?;
        validate::ensure_positive_rate("expense.rate", rate)?;

        let original_shares = split::split_amount(original_total, split)?;
        let main_total = convert("expense.original_total", original_total, rate)?;

        let converted: Vec<Money> = original_shares
            .iter()
            .map(|(_, share)| convert("expense.shares", *share, rate))
            .collect::<Result<_, _>>()?;
        let main_shares = split::normalize_exact_split(converted, main_total);

        let shares = original_shares
            .into_iter()
            .zip(main_shares)
            .map(|((member, original_amount), main_amount)| ExpenseShare {
                member,
                original_amount,
                main_amount,
            })
            .collect();

        Ok(Self {
            id,
            group,
            payer,
            currency_code,
            original_total,
            rate,
            main_total,
            kind: PaymentKind::Expense,
            split_kind: split.kind(),
            created_at,
            shares,
        })
    }

    /// Builds a direct person-to-person transfer: a single share crediting
    /// the recipient. Materializing a computed settlement as a ledger entry
    /// goes through here, which is what makes the settlement round-trip
    /// converge.
    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        id: ExpenseId,
        group: GroupId,
        from: MemberId,
        to: MemberId,
        currency_code: impl ToString,
        amount: Money,
        rate: Rate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let currency_code = currency_code.to_string();
        validate::ensure_non_empty("transfer.currency_code", &currency_code)?;
        validate::ensure_non_negative("transfer.amount", amount)?;
        validate::ensure_positive_rate("transfer.rate", rate)?;

        let main_amount = convert("transfer.amount", amount, rate)?;
        Ok(Self {
            id,
            group,
            payer: from,
            currency_code,
            original_total: amount,
            rate,
            main_total: main_amount,
            kind: PaymentKind::Transfer,
            split_kind: SplitKind::Exact,
            created_at,
            shares: vec![ExpenseShare {
                member: to,
                original_amount: amount,
                main_amount,
            }],
        })
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn payer(&self) -> MemberId {
        self.payer
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn original_total(&self) -> Money {
        self.original_total
    }

    /// The snapshot rate captured when the expense was recorded.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn main_total(&self) -> Money {
        self.main_total
    }

    pub fn kind(&self) -> PaymentKind {
        self.kind
    }

    pub fn split_kind(&self) -> SplitKind {
        self.split_kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn shares(&self) -> &[ExpenseShare] {
        &self.shares
    }
}

fn convert(field: &'static str, amount: Money, rate: Rate) -> Result<Money, ValidationError> {
    amount
        .checked_mul_rate(rate)
        .ok_or(ValidationError::AmountOutOfRange { field })
}

/// A validated snapshot of a group's members and expenses.
///
/// `try_new` is the only way in, so everything downstream (balances,
/// settlements) can assume referential integrity and exact share sums.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    members: Vec<Member>,
    expenses: Vec<Expense>,
}

impl Ledger {
    pub fn try_new(members: Vec<Member>, expenses: Vec<Expense>) -> Result<Self, ValidationError> {
        let result = Self::validate(&members, &expenses);
        if let Err(err) = &result {
            tracing::warn!(
                reject_reason = err.code(),
                field = err.field(),
                member_count = members.len(),
                expense_count = expenses.len(),
                "Ledger rejected during validation"
            );
        }
        result?;
        Ok(Self { members, expenses })
    }

    fn validate(members: &[Member], expenses: &[Expense]) -> Result<(), ValidationError> {
        validate::ensure_unique_ids("ledger.members", members.iter().map(|m| m.id.0))?;
        for member in members {
            validate::ensure_non_empty("member.display_name", &member.display_name)?;
        }
        validate::ensure_unique_ids("ledger.expenses", expenses.iter().map(|e| e.id.0))?;

        let known: FxHashSet<MemberId> = members.iter().map(|m| m.id).collect();
        for expense in expenses {
            validate::ensure_known_member("expense.payer", expense.payer, &known)?;
            validate::ensure_unique_ids(
                "expense.shares",
                expense.shares.iter().map(|share| share.member.0),
            )?;
            for share in &expense.shares {
                validate::ensure_known_member("share.member", share.member, &known)?;
                validate::ensure_non_negative("share.original_amount", share.original_amount)?;
            }
            validate::ensure_share_sum(
                "expense.shares",
                expense.shares.iter().map(|s| s.original_amount).sum(),
                expense.original_total,
            )?;
            validate::ensure_share_sum(
                "expense.shares",
                expense.shares.iter().map(|s| s.main_amount).sum(),
                expense.main_total,
            )?;
        }
        Ok(())
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn member_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.iter().map(|member| member.id)
    }
}

/// A computed transfer recommendation: `from` owes `to` the given amount.
/// Never materialized with a zero or negative amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// One frame of the debt-netting animation: the settlement list at this
/// point, the indices about to be merged, and the indices a merge just
/// produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimplificationStep {
    pub settlements: Vec<Settlement>,
    pub highlighted: Vec<usize>,
    pub result: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use splitpot_money::Percent;

    fn at_epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn members() -> Vec<Member> {
        vec![
            Member::new(MemberId(1), "Alice"),
            Member::new(MemberId(2), "Bob"),
            Member::new(MemberId(3), "Charlie"),
        ]
    }

    #[test]
    fn expense_shares_sum_exactly_in_both_currencies() {
        // 100.00 at 0.8567: per-share conversion truncates, normalization
        // closes the gap against the converted total.
        let expense = Expense::new(
            ExpenseId(1),
            GroupId(1),
            MemberId(1),
            "EUR",
            Money::from_scaled(1_000_000),
            Rate::from_scaled(8_567),
            &SplitSpec::Equal {
                participants: vec![MemberId(1), MemberId(2), MemberId(3)],
            },
            at_epoch(),
        )
        .unwrap();

        assert_eq!(expense.main_total(), Money::from_scaled(856_700));
        assert_eq!(
            expense
                .shares()
                .iter()
                .map(|s| s.original_amount)
                .sum::<Money>(),
            expense.original_total()
        );
        assert_eq!(
            expense
                .shares()
                .iter()
                .map(|s| s.main_amount)
                .sum::<Money>(),
            expense.main_total()
        );
    }

    #[test]
    fn expense_keeps_split_kind_for_editing() {
        let expense = Expense::new(
            ExpenseId(1),
            GroupId(1),
            MemberId(1),
            "USD",
            Money::from_scaled(10_000),
            Rate::IDENTITY,
            &SplitSpec::Percentage {
                allocations: vec![
                    (MemberId(1), Percent::from_scaled(333_333)),
                    (MemberId(2), Percent::from_scaled(666_667)),
                ],
            },
            at_epoch(),
        )
        .unwrap();

        assert_eq!(expense.split_kind(), SplitKind::Percentage);
        assert_eq!(expense.kind(), PaymentKind::Expense);
    }

    #[test]
    fn transfer_has_exactly_one_share_crediting_the_recipient() {
        let transfer = Expense::transfer(
            ExpenseId(7),
            GroupId(1),
            MemberId(2),
            MemberId(1),
            "USD",
            Money::from_scaled(30_000),
            Rate::IDENTITY,
            at_epoch(),
        )
        .unwrap();

        assert_eq!(transfer.kind(), PaymentKind::Transfer);
        assert_eq!(transfer.payer(), MemberId(2));
        assert_eq!(transfer.shares().len(), 1);
        assert_eq!(transfer.shares()[0].member, MemberId(1));
        assert_eq!(transfer.shares()[0].main_amount, Money::from_scaled(30_000));
    }

    #[test]
    fn ledger_rejects_unknown_share_members() {
        let expense = Expense::new(
            ExpenseId(1),
            GroupId(1),
            MemberId(1),
            "USD",
            Money::from_scaled(10_000),
            Rate::IDENTITY,
            &SplitSpec::Equal {
                participants: vec![MemberId(1), MemberId(99)],
            },
            at_epoch(),
        )
        .unwrap();

        let err = Ledger::try_new(members(), vec![expense]).unwrap_err();
        assert_eq!(err.code(), "unresolved-reference");
    }

    #[test]
    fn ledger_rejects_duplicate_expense_ids() {
        let make = || {
            Expense::new(
                ExpenseId(1),
                GroupId(1),
                MemberId(1),
                "USD",
                Money::from_scaled(10_000),
                Rate::IDENTITY,
                &SplitSpec::Equal {
                    participants: vec![MemberId(1), MemberId(2)],
                },
                at_epoch(),
            )
            .unwrap()
        };

        let err = Ledger::try_new(members(), vec![make(), make()]).unwrap_err();
        assert_eq!(err.code(), "duplicate-id");
    }

    #[test]
    fn expense_rejects_non_positive_rates() {
        let err = Expense::new(
            ExpenseId(1),
            GroupId(1),
            MemberId(1),
            "EUR",
            Money::from_scaled(10_000),
            Rate::from_scaled(0),
            &SplitSpec::Equal {
                participants: vec![MemberId(1)],
            },
            at_epoch(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "non-positive-rate");
    }

    #[test]
    fn ledger_rejects_blank_display_names() {
        let err = Ledger::try_new(vec![Member::new(MemberId(1), " ")], Vec::new()).unwrap_err();
        assert_eq!(err.code(), "empty-string");
    }

    #[test]
    fn empty_ledger_is_valid() {
        let ledger = Ledger::try_new(Vec::new(), Vec::new()).unwrap();
        assert!(ledger.members().is_empty());
        assert!(ledger.expenses().is_empty());
    }
}
