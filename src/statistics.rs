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

//! Monthly ledger statistics.

use crate::base::ParticipantId;
use crate::debt::{DebtEntry, DebtStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates for entries created in one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatistics {
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub entry_count: usize,
    pub paid_count: usize,
    pub pending_count: usize,
    /// Amount owed to each creditor, paid or not.
    pub creditors: BTreeMap<ParticipantId, Decimal>,
    /// Amount owed by each debtor, paid or not.
    pub debtors: BTreeMap<ParticipantId, Decimal>,
}

impl MonthlyStatistics {
    fn add(&mut self, entry: &DebtEntry) {
        self.total_amount += entry.amount;
        self.entry_count += 1;
        match entry.status {
            DebtStatus::Paid => {
                self.paid_amount += entry.amount;
                self.paid_count += 1;
            }
            DebtStatus::Pending => {
                self.pending_amount += entry.amount;
                self.pending_count += 1;
            }
        }
        *self
            .creditors
            .entry(entry.creditor_id.clone())
            .or_default() += entry.amount;
        *self.debtors.entry(entry.debtor_id.clone()).or_default() += entry.amount;
    }
}

/// Groups entries by the `YYYY-MM` of their creation time.
pub fn monthly(entries: &[DebtEntry]) -> BTreeMap<String, MonthlyStatistics> {
    let mut months: BTreeMap<String, MonthlyStatistics> = BTreeMap::new();
    for entry in entries {
        let key = entry.created_at.format("%Y-%m").to_string();
        months.entry(key).or_default().add(entry);
    }
    months
}
