// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Property-based tests for allocation, netting, and the ledger.
//!
//! These tests verify conservation invariants that should hold for any
//! valid input.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use split_ledger::{
    Allocator, DebtEntry, DebtLedger, DebtStatus, EntryId, LedgerConfig, MemoryStore, Participant,
    ParticipantId, SplitMethod, ValidationError, balance, net, net_balance,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Generate a non-negative total (0.00 to 100,000.00).
fn arb_total() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generate a positive amount in whole nickels (0.05 to 500.00).
fn arb_nickels() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000i64).prop_map(|nickels| Decimal::new(nickels * 5, 2))
}

fn participants(n: usize) -> Vec<Participant> {
    (0..n)
        .map(|i| Participant::new(format!("p{i}"), format!("Person {i}")))
        .collect()
}

fn debt(debtor: usize, creditor: usize, amount: Decimal) -> DebtEntry {
    let now = Utc::now();
    DebtEntry {
        id: EntryId(Uuid::new_v4()),
        debtor_id: ParticipantId::new(format!("p{debtor}")),
        creditor_id: ParticipantId::new(format!("p{creditor}")),
        amount,
        description: String::new(),
        status: DebtStatus::Pending,
        created_at: now,
        due_date: now + Duration::days(30),
        paid_at: None,
        reminders: Vec::new(),
    }
}

/// Generate debts among four participants, never self-owed.
fn arb_debts() -> impl Strategy<Value = Vec<DebtEntry>> {
    prop::collection::vec((0usize..4, 1usize..4, arb_nickels()), 0..30).prop_map(|raw| {
        raw.into_iter()
            .map(|(debtor, offset, amount)| debt(debtor, (debtor + offset) % 4, amount))
            .collect()
    })
}

fn sum_shares(allocation: &split_ledger::Allocation) -> Decimal {
    allocation.shares().iter().map(|s| s.amount).sum()
}

// =============================================================================
// Allocation Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Equal split shares always add up to the total to the cent.
    #[test]
    fn equal_split_conserves_total(total in arb_total(), n in 1usize..=50) {
        let allocation = Allocator::compute(total, &participants(n), &SplitMethod::Equal).unwrap();
        prop_assert_eq!(sum_shares(&allocation), total);
        prop_assert_eq!(allocation.shares().len(), n);
    }

    /// All shares except the first are the same rounded amount.
    #[test]
    fn equal_split_only_first_differs(total in arb_total(), n in 2usize..=50) {
        let allocation = Allocator::compute(total, &participants(n), &SplitMethod::Equal).unwrap();
        let rest: HashSet<Decimal> = allocation.shares()[1..].iter().map(|s| s.amount).collect();
        prop_assert_eq!(rest.len(), 1);
    }

    /// Percentages summing to exactly 100 always succeed and conserve the total.
    #[test]
    fn percentage_split_conserves_total(
        total in arb_total(),
        weights in prop::collection::vec(1u32..1000, 1..12),
    ) {
        let people = participants(weights.len());
        let weight_sum: u32 = weights.iter().sum();
        let mut percentages: HashMap<ParticipantId, Decimal> = HashMap::new();
        let mut assigned = Decimal::ZERO;
        for (person, weight) in people.iter().zip(&weights).skip(1) {
            let pct = (Decimal::from(*weight) * Decimal::ONE_HUNDRED / Decimal::from(weight_sum))
                .round_dp(4);
            assigned += pct;
            percentages.insert(person.id.clone(), pct);
        }
        percentages.insert(people[0].id.clone(), Decimal::ONE_HUNDRED - assigned);

        let allocation =
            Allocator::compute(total, &people, &SplitMethod::Percentage(percentages)).unwrap();
        prop_assert_eq!(sum_shares(&allocation), total);
    }

    /// Percentages off by more than a cent always fail.
    #[test]
    fn percentage_split_rejects_bad_sums(
        total in arb_total(),
        off in prop_oneof![(2i64..5_000).prop_map(|c| -c), 2i64..5_000],
    ) {
        let people = participants(2);
        let pct_sum = Decimal::ONE_HUNDRED + Decimal::new(off, 2);
        let percentages = HashMap::from([
            (people[0].id.clone(), pct_sum - Decimal::from(40)),
            (people[1].id.clone(), Decimal::from(40)),
        ]);
        let result = Allocator::compute(total, &people, &SplitMethod::Percentage(percentages));
        prop_assert_eq!(result, Err(ValidationError::PercentageSum { sum: pct_sum }));
    }

    /// Custom amounts in whole cents that sum to the total come back unchanged.
    #[test]
    fn custom_split_returns_params(
        amounts in prop::collection::vec(0i64..100_000, 1..12),
    ) {
        let people = participants(amounts.len());
        let amounts: Vec<Decimal> = amounts.into_iter().map(|c| Decimal::new(c, 2)).collect();
        let total: Decimal = amounts.iter().sum();
        let params: HashMap<ParticipantId, Decimal> = people
            .iter()
            .zip(&amounts)
            .map(|(p, a)| (p.id.clone(), *a))
            .collect();

        let allocation = Allocator::compute(total, &people, &SplitMethod::Custom(params)).unwrap();
        let shares: Vec<Decimal> = allocation.shares().iter().map(|s| s.amount).collect();
        prop_assert_eq!(shares, amounts);
    }
}

// =============================================================================
// Netting Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Netting never changes anyone's net position.
    #[test]
    fn netting_preserves_net_positions(entries in arb_debts()) {
        let netted = net(&entries);
        for i in 0..4 {
            let who = ParticipantId::new(format!("p{i}"));
            prop_assert_eq!(
                balance(&who, &entries).net,
                net_balance(&who, &netted).net
            );
        }
    }

    /// At most one positive obligation survives per pair.
    #[test]
    fn netting_leaves_one_entry_per_pair(entries in arb_debts()) {
        let netted = net(&entries);
        let pairs: HashSet<_> = netted.iter().map(|e| e.pair.clone()).collect();
        prop_assert_eq!(pairs.len(), netted.len());
        for entry in &netted {
            prop_assert!(entry.amount > Decimal::new(1, 2));
            prop_assert_ne!(&entry.debtor_id, &entry.creditor_id);
        }
    }

    /// Input order does not matter.
    #[test]
    fn netting_is_order_independent(entries in arb_debts()) {
        let mut reversed = entries.clone();
        reversed.reverse();
        prop_assert_eq!(net(&entries), net(&reversed));
    }
}

// =============================================================================
// Ledger Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Recorded debts plus the payer's share make up the total.
    #[test]
    fn recorded_debts_conserve_value(
        amounts in prop::collection::vec(2i64..100_000, 2..10),
        payer in 0usize..10,
    ) {
        let people = participants(amounts.len());
        let payer = people[payer % people.len()].id.clone();
        let amounts: Vec<Decimal> = amounts.into_iter().map(|c| Decimal::new(c, 2)).collect();
        let total: Decimal = amounts.iter().sum();
        let params: HashMap<ParticipantId, Decimal> = people
            .iter()
            .zip(&amounts)
            .map(|(p, a)| (p.id.clone(), *a))
            .collect();
        let allocation = Allocator::compute(total, &people, &SplitMethod::Custom(params)).unwrap();

        let mut ledger = DebtLedger::load(MemoryStore::new(), LedgerConfig::default()).unwrap();
        let entries = ledger.record(&allocation, &payer, "Shared").unwrap();

        let owed: Decimal = entries.iter().map(|e| e.amount).sum();
        prop_assert_eq!(entries.len(), people.len() - 1);
        prop_assert_eq!(owed + allocation.share_of(&payer).unwrap(), total);
        prop_assert_eq!(ledger.balance(&payer).owing, owed);
    }
}
