//! Net balance aggregation over a ledger snapshot.

use splitpot_money::Money;

use crate::model::{Expense, Ledger, MemberBalances, MemberId};

/// Folds expenses into per-member net balances in the main currency.
///
/// The payer is credited the full converted total (they are owed it back);
/// every share debits its member. A member's net balance is therefore what
/// they paid minus what they were allocated, their own shares included.
pub struct BalanceAccumulator {
    balances: MemberBalances,
}

impl BalanceAccumulator {
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = MemberId>,
    {
        let balances = members
            .into_iter()
            .map(|member| (member, Money::ZERO))
            .collect();
        Self { balances }
    }

    pub fn apply(&mut self, expense: &Expense) {
        *self
            .balances
            .entry(expense.payer())
            .or_insert(Money::ZERO) += expense.main_total();
        for share in expense.shares() {
            *self.balances.entry(share.member).or_insert(Money::ZERO) -= share.main_amount;
        }
    }

    pub fn balances(&self) -> &MemberBalances {
        &self.balances
    }

    pub fn into_balances(self) -> MemberBalances {
        self.balances
    }
}

/// One net balance per member for the whole ledger. Transfers participate
/// identically to ordinary expenses, which is what nets a real-world payment
/// against the payer's owed balance.
///
/// Invariant: the balances sum to exactly zero for any valid ledger.
pub fn compute_balances(ledger: &Ledger) -> MemberBalances {
    tracing::debug!(
        member_count = ledger.members().len(),
        expense_count = ledger.expenses().len(),
        "Computing net balances"
    );

    let mut accumulator = BalanceAccumulator::new(ledger.member_ids());
    for expense in ledger.expenses() {
        accumulator.apply(expense);
    }
    let balances = accumulator.into_balances();

    debug_assert!(balances.values().sum::<Money>().is_zero());
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Expense, ExpenseId, GroupId, Member},
        services::split::SplitSpec,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use splitpot_money::Rate;

    fn at_epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn dinner_ledger() -> Ledger {
        let members = vec![
            Member::new(MemberId(1), "Alice"),
            Member::new(MemberId(2), "Bob"),
            Member::new(MemberId(3), "Charlie"),
        ];
        let dinner = Expense::new(
            ExpenseId(1),
            GroupId(1),
            MemberId(1),
            "USD",
            Money::from_scaled(90_000),
            Rate::IDENTITY,
            &SplitSpec::Equal {
                participants: vec![MemberId(1), MemberId(2), MemberId(3)],
            },
            at_epoch(),
        )
        .unwrap();
        Ledger::try_new(members, vec![dinner]).unwrap()
    }

    #[test]
    fn payer_is_credited_and_sharers_debited() {
        let balances = compute_balances(&dinner_ledger());

        assert_eq!(balances.get(&MemberId(1)), Some(&Money::from_scaled(60_000)));
        assert_eq!(balances.get(&MemberId(2)), Some(&Money::from_scaled(-30_000)));
        assert_eq!(balances.get(&MemberId(3)), Some(&Money::from_scaled(-30_000)));
    }

    #[test]
    fn balances_conserve_to_zero() {
        let balances = compute_balances(&dinner_ledger());
        assert!(balances.values().sum::<Money>().is_zero());
    }

    #[test]
    fn members_without_expenses_stay_at_zero() {
        let ledger = Ledger::try_new(vec![Member::new(MemberId(5), "Dora")], Vec::new()).unwrap();
        let balances = compute_balances(&ledger);
        assert_eq!(balances.get(&MemberId(5)), Some(&Money::ZERO));
    }

    #[test]
    fn a_transfer_nets_out_an_owed_balance() {
        let members = vec![
            Member::new(MemberId(1), "Alice"),
            Member::new(MemberId(2), "Bob"),
        ];
        let lunch = Expense::new(
            ExpenseId(1),
            GroupId(1),
            MemberId(1),
            "USD",
            Money::from_scaled(40_000),
            Rate::IDENTITY,
            &SplitSpec::Equal {
                participants: vec![MemberId(1), MemberId(2)],
            },
            at_epoch(),
        )
        .unwrap();
        let repayment = Expense::transfer(
            ExpenseId(2),
            GroupId(1),
            MemberId(2),
            MemberId(1),
            "USD",
            Money::from_scaled(20_000),
            Rate::IDENTITY,
            at_epoch(),
        )
        .unwrap();

        let ledger = Ledger::try_new(members, vec![lunch, repayment]).unwrap();
        let balances = compute_balances(&ledger);

        assert_eq!(balances.get(&MemberId(1)), Some(&Money::ZERO));
        assert_eq!(balances.get(&MemberId(2)), Some(&Money::ZERO));
    }
}
