//! Settlement solvers: pairwise debt listing and greedy debt netting.
//!
//! Both are pure functions of a ledger snapshot; an empty ledger, a single
//! member, or an already-settled group all produce empty results rather
//! than errors.

use fxhash::FxHashMap;
use splitpot_money::Money;
use thiserror::Error;

use crate::{
    model::{Ledger, MemberBalances, MemberId, Settlement},
    services::balance,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SettlementError {
    #[error("sum of balances must be zero (found {0})")]
    ImbalancedTotal(Money),
}

/// Which solver a caller wants. The underlying preference is a per-user
/// boolean persisted outside the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementMode {
    Pairwise,
    Simplified,
}

impl SettlementMode {
    pub fn from_preference(prefer_simplified: bool) -> Self {
        if prefer_simplified {
            Self::Simplified
        } else {
            Self::Pairwise
        }
    }
}

/// Runs the solver selected by `mode` over the ledger.
pub fn settlements_for_mode(
    ledger: &Ledger,
    mode: SettlementMode,
) -> Result<Vec<Settlement>, SettlementError> {
    match mode {
        SettlementMode::Pairwise => Ok(pairwise_settlements(ledger)),
        SettlementMode::Simplified => simplified_settlements(&balance::compute_balances(ledger)),
    }
}

/// The literal per-expense view of who owes whom.
///
/// For every share whose member is not the payer, the member owes the payer
/// the share's main-currency amount. Debts between the same ordered pair
/// accumulate into one settlement (listed at the pair's first encounter);
/// debts in opposite directions between two members are kept as two
/// entries, never canceled against each other. Zero shares and the payer's
/// own share create no debt.
pub fn pairwise_settlements(ledger: &Ledger) -> Vec<Settlement> {
    let mut by_pair: FxHashMap<(MemberId, MemberId), usize> = FxHashMap::default();
    let mut settlements: Vec<Settlement> = Vec::new();

    for expense in ledger.expenses() {
        for share in expense.shares() {
            if share.member == expense.payer() || share.main_amount.is_zero() {
                continue;
            }

            let pair = (share.member, expense.payer());
            match by_pair.get(&pair) {
                Some(&idx) => settlements[idx].amount += share.main_amount,
                None => {
                    by_pair.insert(pair, settlements.len());
                    settlements.push(Settlement {
                        from: share.member,
                        to: expense.payer(),
                        amount: share.main_amount,
                    });
                }
            }
        }
    }

    settlements
}

/// Greedy netting of the balance vector into a short list of transfers.
///
/// Members are partitioned into debtors and creditors, each ordered by
/// descending magnitude with ties kept in balance-map (member id) order.
/// The current largest debtor pays the current largest creditor
/// `min(debt, credit)`; whoever reaches zero is advanced past. The result
/// is a positive-transfer factorization of the balance vector; the transfer
/// count is a heuristic minimum, not a proven one.
pub fn simplified_settlements(
    balances: &MemberBalances,
) -> Result<Vec<Settlement>, SettlementError> {
    let total: Money = balances.values().sum();
    if !total.is_zero() {
        tracing::error!(
            reject_reason = "imbalanced_total",
            member_count = balances.len(),
            total = %total,
            "Settlement rejected: balances do not sum to zero"
        );
        return Err(SettlementError::ImbalancedTotal(total));
    }

    let mut debtors: Vec<(MemberId, Money)> = balances
        .iter()
        .filter(|(_, amount)| **amount < Money::ZERO)
        .map(|(member, amount)| (*member, amount.abs()))
        .collect();
    let mut creditors: Vec<(MemberId, Money)> = balances
        .iter()
        .filter(|(_, amount)| **amount > Money::ZERO)
        .map(|(member, amount)| (*member, *amount))
        .collect();

    // Stable sorts: equal magnitudes keep their ascending-id encounter
    // order from the BTreeMap.
    debtors.sort_by(|a, b| b.1.cmp(&a.1));
    creditors.sort_by(|a, b| b.1.cmp(&a.1));

    tracing::debug!(
        debtor_count = debtors.len(),
        creditor_count = creditors.len(),
        "Greedy settlement started"
    );

    let mut settlements = Vec::new();
    let mut debtor_idx = 0;
    let mut creditor_idx = 0;
    while debtor_idx < debtors.len() && creditor_idx < creditors.len() {
        let debtor = &mut debtors[debtor_idx];
        let amount = debtor.1.min(creditors[creditor_idx].1);
        settlements.push(Settlement {
            from: debtor.0,
            to: creditors[creditor_idx].0,
            amount,
        });

        debtor.1 -= amount;
        creditors[creditor_idx].1 -= amount;
        if debtors[debtor_idx].1.is_zero() {
            debtor_idx += 1;
        }
        if creditors[creditor_idx].1.is_zero() {
            creditor_idx += 1;
        }
    }

    debug_assert!(debtor_idx == debtors.len() && creditor_idx == creditors.len());
    Ok(settlements)
}
