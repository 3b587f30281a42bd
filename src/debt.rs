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

//! Debt entries and payment records.
//!
//! Entries follow a two-state lifecycle:
//! - [`Pending`] → [`Paid`] (via settle)
//!
//! `Paid` is terminal; there is no un-settle.
//!
//! [`Pending`]: DebtStatus::Pending
//! [`Paid`]: DebtStatus::Paid

use crate::base::{EntryId, ParticipantId, PaymentId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    Pending,
    Paid,
}

/// One obligation: `debtor_id` owes `creditor_id` the `amount`.
///
/// # Invariants
///
/// - `debtor_id != creditor_id`
/// - `amount > 0`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtEntry {
    pub id: EntryId,
    pub debtor_id: ParticipantId,
    pub creditor_id: ParticipantId,
    pub amount: Decimal,
    pub description: String,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// When reminders were sent, oldest first.
    #[serde(default)]
    pub reminders: Vec<DateTime<Utc>>,
}

impl DebtEntry {
    pub fn is_pending(&self) -> bool {
        self.status == DebtStatus::Pending
    }

    /// Pending and past its due date at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.due_date < now
    }

    /// Whether `participant_id` is the debtor or the creditor.
    pub fn involves(&self, participant_id: &ParticipantId) -> bool {
        &self.debtor_id == participant_id || &self.creditor_id == participant_id
    }
}

/// History record written when an entry is settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub entry_id: EntryId,
    pub payer_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub description: String,
}

impl Payment {
    pub(crate) fn for_entry(entry: &DebtEntry, paid_at: DateTime<Utc>) -> Self {
        Self {
            id: PaymentId::generate(),
            entry_id: entry.id,
            payer_id: entry.debtor_id.clone(),
            receiver_id: entry.creditor_id.clone(),
            amount: entry.amount,
            paid_at,
            description: format!("Repayment: {}", entry.description),
        }
    }
}
