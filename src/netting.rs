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

//! Pairwise netting of pending debts.
//!
//! Netting is a derived view: it never mutates entries. For each unordered
//! pair of participants both direction totals are accumulated first, then the
//! smaller is subtracted from the larger. A pair whose difference is within
//! one cent is considered settled and produces nothing.
//!
//! # Example
//!
//! `A→B 50` plus `B→A 20` nets to a single `A→B 30`.

use crate::allocation::TOLERANCE;
use crate::base::ParticipantId;
use crate::debt::DebtEntry;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Unordered pair of participants, stored lowest id first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PairKey {
    pub first: ParticipantId,
    pub second: ParticipantId,
}

impl PairKey {
    pub fn new(a: &ParticipantId, b: &ParticipantId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.clone(),
            second: second.clone(),
        }
    }
}

/// Consolidated obligation between one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetEntry {
    pub pair: PairKey,
    pub debtor_id: ParticipantId,
    pub creditor_id: ParticipantId,
    pub amount: Decimal,
}

/// Direction totals for one pair: `forward` is first→second.
#[derive(Debug, Default)]
struct PairFlow {
    forward: Decimal,
    backward: Decimal,
}

/// Reduces pending entries to at most one obligation per pair.
///
/// Paid entries are ignored. The result is ordered by [`PairKey`].
pub fn net(entries: &[DebtEntry]) -> Vec<NetEntry> {
    let mut flows: BTreeMap<PairKey, PairFlow> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.is_pending()) {
        let pair = PairKey::new(&entry.debtor_id, &entry.creditor_id);
        let forward = entry.debtor_id == pair.first;
        let flow = flows.entry(pair).or_default();
        if forward {
            flow.forward += entry.amount;
        } else {
            flow.backward += entry.amount;
        }
    }

    flows
        .into_iter()
        .filter_map(|(pair, flow)| {
            let difference = flow.forward - flow.backward;
            if difference.abs() <= TOLERANCE {
                return None;
            }
            let (debtor_id, creditor_id) = if difference > Decimal::ZERO {
                (pair.first.clone(), pair.second.clone())
            } else {
                (pair.second.clone(), pair.first.clone())
            };
            Some(NetEntry {
                pair,
                debtor_id,
                creditor_id,
                amount: difference.abs(),
            })
        })
        .collect()
}

/// Nets a set of entries; see [`net`].
pub fn net_ledger(entries: &[DebtEntry]) -> Vec<NetEntry> {
    net(entries)
}
