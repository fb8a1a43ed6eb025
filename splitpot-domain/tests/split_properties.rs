use proptest::prelude::*;
use splitpot_domain::{equal_split, normalize_exact_split, percentage_split};
use splitpot_money::{Money, Percent};

/// Turns arbitrary positive weights into scaled percentages that sum to
/// exactly 100%: truncated proportional parts, leftover front-loaded, the
/// same shape real allocation UIs produce.
fn percents_from_weights(weights: &[u32]) -> Vec<Percent> {
    let total: i64 = weights.iter().map(|w| i64::from(*w)).sum();
    let mut parts: Vec<i64> = weights
        .iter()
        .map(|w| i64::from(*w) * 1_000_000 / total)
        .collect();
    let mut leftover = 1_000_000 - parts.iter().sum::<i64>();
    for part in parts.iter_mut() {
        if leftover == 0 {
            break;
        }
        *part += 1;
        leftover -= 1;
    }
    parts.into_iter().map(Percent::from_scaled).collect()
}

proptest! {
    #[test]
    fn equal_split_sums_exactly(
        total in 0i64..=10_000_000,
        participants in 1usize..=40,
    ) {
        let total = Money::from_scaled(total);
        let shares = equal_split(total, participants);

        prop_assert_eq!(shares.len(), participants);
        prop_assert_eq!(shares.iter().sum::<Money>(), total);
    }

    #[test]
    fn equal_split_shares_differ_by_at_most_one_unit(
        total in 0i64..=10_000_000,
        participants in 1usize..=40,
    ) {
        let shares = equal_split(Money::from_scaled(total), participants);
        let largest = shares.iter().max().unwrap();
        let smallest = shares.iter().min().unwrap();

        prop_assert!(*largest - *smallest <= Money::from_scaled(1));
        // Larger shares come first: the remainder is front-loaded.
        let mut sorted = shares.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        prop_assert_eq!(shares, sorted);
    }

    #[test]
    fn percentage_split_sums_exactly(
        total in 0i64..=10_000_000,
        weights in prop::collection::vec(1u32..=1_000, 1..=12),
    ) {
        let total = Money::from_scaled(total);
        let percents = percents_from_weights(&weights);
        prop_assert_eq!(percents.iter().copied().sum::<Percent>(), Percent::ONE_HUNDRED);

        let shares = percentage_split(total, &percents);
        prop_assert_eq!(shares.len(), weights.len());
        prop_assert_eq!(shares.iter().sum::<Money>(), total);
    }

    #[test]
    fn normalize_exact_split_sums_exactly(
        shares in prop::collection::vec(0i64..=100_000, 1..=12),
        total in 0i64..=1_200_000,
    ) {
        let given: Vec<Money> = shares.iter().copied().map(Money::from_scaled).collect();
        let total = Money::from_scaled(total);
        let normalized = normalize_exact_split(given.clone(), total);

        prop_assert_eq!(normalized.len(), given.len());
        prop_assert_eq!(normalized.iter().sum::<Money>(), total);
        for share in &normalized {
            prop_assert!(*share >= Money::ZERO);
        }
    }

    #[test]
    fn normalize_exact_split_is_identity_when_already_exact(
        shares in prop::collection::vec(0i64..=100_000, 1..=12),
    ) {
        let given: Vec<Money> = shares.iter().copied().map(Money::from_scaled).collect();
        let total: Money = given.iter().sum();

        prop_assert_eq!(normalize_exact_split(given.clone(), total), given);
    }
}
