//! Step-by-step trace of pairwise debts collapsing into the simplified
//! list, for UI animation.
//!
//! The trace is produced by a reducer over settlement snapshots, not by
//! diffing the two final lists. Two local rules fire in priority order,
//! each recorded as a highlight step followed by a result step:
//!
//! 1. reciprocal netting: debts in both directions between the same two
//!    members collapse into one directed transfer (or vanish outright);
//! 2. chain rerouting: when one member both receives and pays, the smaller
//!    leg is rerouted past them.
//!
//! Every rule application strictly lowers the total transferred flow, so
//! the reduction terminates. A purely local fixpoint can still be a
//! different factorization of the balance vector than the greedy solver's,
//! in which case one final realignment step is recorded so the terminal
//! snapshot always equals the simplified list.

use fxhash::FxHashMap;
use splitpot_money::Money;

use crate::model::{Settlement, SimplificationStep};

/// Records the reduction from `pairwise` to `simplified`.
///
/// Step 0 is the pairwise list with nothing highlighted. When the two lists
/// already agree there is nothing to explain and the trace is that single
/// trivial step.
pub fn simplification_trace(
    pairwise: &[Settlement],
    simplified: &[Settlement],
) -> Vec<SimplificationStep> {
    let mut steps = vec![SimplificationStep {
        settlements: pairwise.to_vec(),
        highlighted: Vec::new(),
        result: Vec::new(),
    }];

    let mut current = pairwise.to_vec();
    if same_settlements(&current, simplified) {
        return steps;
    }

    loop {
        if let Some((first, second)) = find_reciprocal(&current) {
            steps.push(SimplificationStep {
                settlements: current.clone(),
                highlighted: vec![first, second],
                result: Vec::new(),
            });
            let (next, produced) = net_reciprocal(&current, first, second);
            steps.push(SimplificationStep {
                settlements: next.clone(),
                highlighted: Vec::new(),
                result: produced,
            });
            current = next;
            continue;
        }

        if let Some((incoming, outgoing)) = find_chain(&current) {
            steps.push(SimplificationStep {
                settlements: current.clone(),
                highlighted: vec![incoming, outgoing],
                result: Vec::new(),
            });
            let (next, produced) = reroute_chain(&current, incoming, outgoing);
            steps.push(SimplificationStep {
                settlements: next.clone(),
                highlighted: Vec::new(),
                result: produced,
            });
            current = next;
            continue;
        }

        break;
    }

    if !same_settlements(&current, simplified) {
        steps.push(SimplificationStep {
            settlements: current.clone(),
            highlighted: unmatched_indices(&current, simplified),
            result: Vec::new(),
        });
        steps.push(SimplificationStep {
            settlements: simplified.to_vec(),
            highlighted: Vec::new(),
            result: unmatched_indices(simplified, &current),
        });
    }

    steps
}

/// First pair of settlements running in opposite directions between the
/// same two members.
fn find_reciprocal(settlements: &[Settlement]) -> Option<(usize, usize)> {
    for (i, a) in settlements.iter().enumerate() {
        for (j, b) in settlements.iter().enumerate().skip(i + 1) {
            if a.from == b.to && a.to == b.from {
                return Some((i, j));
            }
        }
    }
    None
}

/// First pair where the first settlement pays into a member who pays the
/// second. Reciprocal pairs are resolved before this runs, so the chain
/// endpoints are always distinct members.
fn find_chain(settlements: &[Settlement]) -> Option<(usize, usize)> {
    for (i, a) in settlements.iter().enumerate() {
        for (j, b) in settlements.iter().enumerate() {
            if i != j && a.to == b.from {
                return Some((i, j));
            }
        }
    }
    None
}

fn net_reciprocal(
    settlements: &[Settlement],
    first: usize,
    second: usize,
) -> (Vec<Settlement>, Vec<usize>) {
    let a = settlements[first];
    let b = settlements[second];
    let survivor = match a.amount.cmp(&b.amount) {
        std::cmp::Ordering::Greater => Some(Settlement {
            amount: a.amount - b.amount,
            ..a
        }),
        std::cmp::Ordering::Less => Some(Settlement {
            amount: b.amount - a.amount,
            ..b
        }),
        std::cmp::Ordering::Equal => None,
    };

    let mut next = Vec::with_capacity(settlements.len());
    let mut produced = Vec::new();
    for (idx, settlement) in settlements.iter().enumerate() {
        if idx == second {
            continue;
        }
        if idx == first {
            // The netted remainder takes the earlier slot.
            if let Some(merged) = survivor {
                produced.push(next.len());
                next.push(merged);
            }
            continue;
        }
        next.push(*settlement);
    }
    (next, produced)
}

fn reroute_chain(
    settlements: &[Settlement],
    incoming: usize,
    outgoing: usize,
) -> (Vec<Settlement>, Vec<usize>) {
    let upstream = settlements[incoming];
    let downstream = settlements[outgoing];
    let rerouted = upstream.amount.min(downstream.amount);
    let bypass = Settlement {
        from: upstream.from,
        to: downstream.to,
        amount: rerouted,
    };

    let mut next = Vec::with_capacity(settlements.len() + 1);
    let mut produced = Vec::new();
    let mut absorbed = false;
    for (idx, settlement) in settlements.iter().enumerate() {
        if idx == incoming {
            let leftover = upstream.amount - rerouted;
            if leftover > Money::ZERO {
                produced.push(next.len());
                next.push(Settlement {
                    amount: leftover,
                    ..upstream
                });
            }
            continue;
        }
        if idx == outgoing {
            let leftover = downstream.amount - rerouted;
            if leftover > Money::ZERO {
                produced.push(next.len());
                next.push(Settlement {
                    amount: leftover,
                    ..downstream
                });
            }
            continue;
        }
        if !absorbed && settlement.from == bypass.from && settlement.to == bypass.to {
            absorbed = true;
            produced.push(next.len());
            next.push(Settlement {
                amount: settlement.amount + bypass.amount,
                ..*settlement
            });
            continue;
        }
        next.push(*settlement);
    }
    if !absorbed {
        produced.push(next.len());
        next.push(bypass);
    }
    (next, produced)
}

/// Multiset equality over (from, to, amount).
fn same_settlements(a: &[Settlement], b: &[Settlement]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted = a.to_vec();
    let mut b_sorted = b.to_vec();
    a_sorted.sort_unstable();
    b_sorted.sort_unstable();
    a_sorted == b_sorted
}

/// Indices in `settlements` with no multiset match in `other`.
fn unmatched_indices(settlements: &[Settlement], other: &[Settlement]) -> Vec<usize> {
    let mut available: FxHashMap<Settlement, usize> = FxHashMap::default();
    for settlement in other {
        *available.entry(*settlement).or_insert(0) += 1;
    }

    settlements
        .iter()
        .enumerate()
        .filter_map(|(idx, settlement)| match available.get_mut(settlement) {
            Some(count) if *count > 0 => {
                *count -= 1;
                None
            }
            _ => Some(idx),
        })
        .collect()
}
