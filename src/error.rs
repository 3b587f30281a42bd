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

//! Error types for allocation, ledger state, and persistence.

use crate::base::{EntryId, ParticipantId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed or constraint-violating input to an allocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No participants were supplied
    #[error("at least one participant is required")]
    NoParticipants,

    /// Total amount is below zero
    #[error("total amount must not be negative")]
    NegativeTotal,

    /// Participant name is empty or only whitespace
    #[error("participant {index} needs a non-empty name")]
    EmptyName { index: usize },

    /// Two participants share the exact same name
    #[error("duplicate participant name: {name}")]
    DuplicateName { name: String },

    /// Method parameters reference a participant outside the split
    #[error("unknown participant: {id}")]
    UnknownParticipant { id: ParticipantId },

    /// Percentage, custom amount, or item price is negative
    #[error("negative value supplied for {id}")]
    NegativeValue { id: String },

    /// Percentages do not add up to 100 within tolerance
    #[error("percentages sum to {sum}, expected 100")]
    PercentageSum { sum: Decimal },

    /// Custom amounts do not add up to the total within tolerance
    #[error("custom amounts sum to {sum}, expected {total}")]
    CustomSum { sum: Decimal, total: Decimal },

    /// A line item has nobody assigned to it
    #[error("item '{item}' has no assigned participants")]
    EmptyItemAssignment { item: String },

    /// Line item prices add up to more than the total
    #[error("items sum to {items}, which exceeds the total {total}")]
    ItemsExceedTotal { items: Decimal, total: Decimal },

    /// Amounts too large to add or scale without overflowing
    #[error("amounts are too large to split")]
    AmountOverflow,
}

/// Reference to a payer or ledger entry that does not exist, or an invalid transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Payer has no share in the allocation
    #[error("payer {id} is not a participant of the allocation")]
    UnknownPayer { id: ParticipantId },

    /// Entry ID is not in the ledger
    #[error("debt entry {id} not found")]
    EntryNotFound { id: EntryId },

    /// Entry was settled before
    #[error("debt entry {id} is already paid")]
    AlreadyPaid { id: EntryId },
}

/// Failure reported by a [`PersistenceStore`](crate::PersistenceStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O error for key '{key}': {message}")]
    Io { key: String, message: String },

    #[error("malformed value under key '{key}': {message}")]
    Serialization { key: String, message: String },
}

/// Errors returned by [`DebtLedger`](crate::DebtLedger) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn validation_display_messages() {
        assert_eq!(
            ValidationError::NoParticipants.to_string(),
            "at least one participant is required"
        );
        assert_eq!(
            ValidationError::EmptyName { index: 2 }.to_string(),
            "participant 2 needs a non-empty name"
        );
        assert_eq!(
            ValidationError::DuplicateName {
                name: "Amy".to_string()
            }
            .to_string(),
            "duplicate participant name: Amy"
        );
        assert_eq!(
            ValidationError::PercentageSum { sum: dec!(99.5) }.to_string(),
            "percentages sum to 99.5, expected 100"
        );
        assert_eq!(
            ValidationError::CustomSum {
                sum: dec!(90.00),
                total: dec!(100.00)
            }
            .to_string(),
            "custom amounts sum to 90.00, expected 100.00"
        );
        assert_eq!(
            ValidationError::EmptyItemAssignment {
                item: "Noodles".to_string()
            }
            .to_string(),
            "item 'Noodles' has no assigned participants"
        );
        assert_eq!(
            ValidationError::AmountOverflow.to_string(),
            "amounts are too large to split"
        );
    }

    #[test]
    fn state_display_messages() {
        let id = EntryId(Uuid::nil());
        assert_eq!(
            StateError::UnknownPayer {
                id: ParticipantId::new("p")
            }
            .to_string(),
            "payer p is not a participant of the allocation"
        );
        assert_eq!(
            StateError::EntryNotFound { id }.to_string(),
            "debt entry 00000000-0000-0000-0000-000000000000 not found"
        );
        assert_eq!(
            StateError::AlreadyPaid { id }.to_string(),
            "debt entry 00000000-0000-0000-0000-000000000000 is already paid"
        );
    }

    #[test]
    fn ledger_error_is_transparent() {
        let err: LedgerError = StoreError::Io {
            key: "debts".to_string(),
            message: "disk full".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "I/O error for key 'debts': disk full");
        assert!(matches!(err, LedgerError::Store(_)));
    }

    #[test]
    fn errors_are_cloneable() {
        let error = ValidationError::NegativeTotal;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
