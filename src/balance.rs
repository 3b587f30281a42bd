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

//! Per-participant balances.
//!
//! [`balance`] aggregates raw pending entries; [`net_balance`] aggregates the
//! netted view. The two agree on `net` but can differ on `owed` and `owing`
//! when opposing debts exist between the same pair.

use crate::base::ParticipantId;
use crate::debt::DebtEntry;
use crate::netting::NetEntry;
use rust_decimal::Decimal;
use serde::Serialize;

/// Which side of the ledger a participant ends up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Creditor,
    Debtor,
    Settled,
}

/// A participant's aggregate position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// What the participant must pay out.
    pub owed: Decimal,
    /// What others must pay the participant.
    pub owing: Decimal,
    /// `owing - owed`.
    pub net: Decimal,
}

impl Balance {
    fn new(owed: Decimal, owing: Decimal) -> Self {
        Self {
            owed,
            owing,
            net: owing - owed,
        }
    }

    pub fn position(&self) -> Position {
        if self.net > Decimal::ZERO {
            Position::Creditor
        } else if self.net < Decimal::ZERO {
            Position::Debtor
        } else {
            Position::Settled
        }
    }
}

/// Balance over pending entries; paid entries are skipped.
pub fn balance(participant_id: &ParticipantId, entries: &[DebtEntry]) -> Balance {
    let mut owed = Decimal::ZERO;
    let mut owing = Decimal::ZERO;
    for entry in entries.iter().filter(|e| e.is_pending()) {
        if &entry.debtor_id == participant_id {
            owed += entry.amount;
        }
        if &entry.creditor_id == participant_id {
            owing += entry.amount;
        }
    }
    Balance::new(owed, owing)
}

/// Balance over netted obligations.
pub fn net_balance(participant_id: &ParticipantId, net_entries: &[NetEntry]) -> Balance {
    let owed = net_entries
        .iter()
        .filter(|e| &e.debtor_id == participant_id)
        .map(|e| e.amount)
        .sum();
    let owing = net_entries
        .iter()
        .filter(|e| &e.creditor_id == participant_id)
        .map(|e| e.amount)
        .sum();
    Balance::new(owed, owing)
}
