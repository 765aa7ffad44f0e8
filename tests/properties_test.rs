use proptest::prelude::*;
use rust_decimal::Decimal;
use split_ledger::{
    compute_balances, compute_split, suggest_settlements, Expense, Money, Payment, Percent, Person,
    PersonId, Split,
};

type RawExpense = (i128, usize, u8);
type RawPayment = (i128, usize, usize);

fn member(idx: usize) -> PersonId {
    PersonId::new(format!("m{}", idx))
}

fn roster(count: usize) -> Vec<Person> {
    (0..count).map(|idx| Person::new(format!("m{}", idx))).collect()
}

fn raw_expenses() -> impl Strategy<Value = Vec<RawExpense>> {
    prop::collection::vec((1i128..=100_000, 0usize..=5, 1u8..=63), 0..=20)
}

fn raw_payments() -> impl Strategy<Value = Vec<RawPayment>> {
    prop::collection::vec((1i128..=50_000, 0usize..=5, 0usize..=5), 0..=10)
}

fn build_splits(member_count: usize, raw: &[RawExpense]) -> Vec<Split> {
    raw.iter()
        .enumerate()
        .map(|(idx, &(cents, payer_idx, mask))| {
            let mask = mask as usize % (1 << member_count);
            let mut participants: Vec<PersonId> = (0..member_count)
                .filter(|&bit| mask & (1 << bit) != 0)
                .map(member)
                .collect();
            if participants.is_empty() {
                participants = (0..member_count).map(member).collect();
            }

            let payer = member(payer_idx % member_count);
            let expense = Expense::equal(
                &format!("e{}", idx + 1),
                payer.as_str(),
                Money::from_minor(cents),
                participants,
            );
            compute_split(&expense).expect("generated expense is valid")
        })
        .collect()
}

fn build_payments(member_count: usize, raw: &[RawPayment]) -> Vec<Payment> {
    raw.iter()
        .enumerate()
        .map(|(idx, &(cents, from_idx, to_idx))| {
            Payment::new(
                &format!("p{}", idx + 1),
                member(from_idx % member_count).as_str(),
                member(to_idx % member_count).as_str(),
                Money::from_minor(cents),
            )
        })
        .collect()
}

/// Hundredths of a percent summing to exactly 100%, one per participant.
fn percent_weights(count: usize, mut cuts: Vec<i64>) -> Vec<i64> {
    cuts.truncate(count - 1);
    cuts.sort_unstable();
    let mut bounds = vec![0];
    bounds.extend(cuts);
    bounds.push(10_000);
    bounds.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

proptest! {
    #[test]
    fn equal_split_sums_to_amount(cents in 1i128..=10_000_000, count in 1usize..=12) {
        let participants: Vec<PersonId> = (0..count).map(member).collect();
        let expense = Expense::equal("e1", "m0", Money::from_minor(cents), participants);
        let split = compute_split(&expense).unwrap();

        prop_assert_eq!(split.total(), expense.amount);
        let minors: Vec<i128> = split.shares.iter().map(|s| s.amount.minor_units()).collect();
        let max = minors.iter().max().copied().unwrap_or_default();
        let min = minors.iter().min().copied().unwrap_or_default();
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn percent_split_sums_to_amount(
        cents in 1i128..=10_000_000,
        count in 1usize..=8,
        cuts in prop::collection::vec(0i64..=10_000, 7),
    ) {
        let weights = percent_weights(count, cuts);
        let shares = weights
            .iter()
            .enumerate()
            .map(|(idx, &hundredths)| (member(idx), Percent::new(Decimal::new(hundredths, 2))));
        let expense = Expense::percent("e1", "m0", Money::from_minor(cents), shares);
        let split = compute_split(&expense).unwrap();

        prop_assert_eq!(split.total(), expense.amount);
        for (share, hundredths) in split.shares.iter().zip(&weights) {
            let exact = cents * i128::from(*hundredths);
            let floor = exact / 10_000;
            let units = share.amount.minor_units();
            prop_assert!(units == floor || (units == floor + 1 && exact % 10_000 != 0));
        }
    }

    #[test]
    fn balances_sum_to_zero(
        member_count in 1usize..=6,
        expenses in raw_expenses(),
        payments in raw_payments(),
    ) {
        let balances = compute_balances(
            &roster(member_count),
            &build_splits(member_count, &expenses),
            &build_payments(member_count, &payments),
        )
        .unwrap();

        prop_assert_eq!(balances.len(), member_count);
        prop_assert!(balances.total().is_zero());
    }

    #[test]
    fn balances_ignore_fact_order(
        (member_count, expenses, shuffled_expenses, payments, shuffled_payments) in
            (1usize..=6, raw_expenses(), raw_payments()).prop_flat_map(|(count, expenses, payments)| {
                (
                    Just(count),
                    Just(expenses.clone()),
                    Just(expenses).prop_shuffle(),
                    Just(payments.clone()),
                    Just(payments).prop_shuffle(),
                )
            }),
    ) {
        let people = roster(member_count);
        let before = compute_balances(
            &people,
            &build_splits(member_count, &expenses),
            &build_payments(member_count, &payments),
        )
        .unwrap();
        let after = compute_balances(
            &people,
            &build_splits(member_count, &shuffled_expenses),
            &build_payments(member_count, &shuffled_payments),
        )
        .unwrap();

        prop_assert_eq!(before, after);
    }

    #[test]
    fn settlement_plan_clears_every_balance(
        member_count in 1usize..=6,
        expenses in raw_expenses(),
        payments in raw_payments(),
    ) {
        let people = roster(member_count);
        let splits = build_splits(member_count, &expenses);
        let mut recorded = build_payments(member_count, &payments);

        let balances = compute_balances(&people, &splits, &recorded).unwrap();
        let plan = suggest_settlements(&balances).unwrap();

        prop_assert!(plan.len() <= balances.unsettled().saturating_sub(1));
        for transfer in &plan {
            prop_assert!(transfer.amount.is_positive());
            prop_assert!(transfer.from != transfer.to);
        }

        let base = recorded.len();
        recorded.extend(plan.iter().enumerate().map(|(idx, transfer)| {
            Payment::new(
                &format!("p{}", base + idx + 1),
                transfer.from.as_str(),
                transfer.to.as_str(),
                transfer.amount,
            )
        }));

        let settled = compute_balances(&people, &splits, &recorded).unwrap();
        prop_assert_eq!(settled.unsettled(), 0);
        prop_assert!(suggest_settlements(&settled).unwrap().is_empty());
    }
}
