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

//! Ledger configuration.

use serde::{Deserialize, Serialize};

/// Settings for a [`DebtLedger`](crate::DebtLedger).
///
/// Missing fields fall back to [`LedgerConfig::default`] when deserialised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Store key holding the debt entries.
    pub entries_key: String,
    /// Store key holding the payment history.
    pub payments_key: String,
    /// Days between an entry's creation and its due date.
    pub due_in_days: i64,
}

impl LedgerConfig {
    pub const DEFAULT_DUE_IN_DAYS: i64 = 30;

    pub fn with_due_in_days(mut self, days: i64) -> Self {
        self.due_in_days = days;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            entries_key: "debts".to_string(),
            payments_key: "payments".to_string(),
            due_in_days: Self::DEFAULT_DUE_IN_DAYS,
        }
    }
}
