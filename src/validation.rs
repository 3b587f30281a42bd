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

//! Pre-checks for allocation input.
//!
//! [`AllocationValidator::validate`] collects every problem with a proposed
//! split so a caller can show them all at once. [`Allocator::compute`] runs
//! the same checks and stops at the first failure.
//!
//! [`Allocator::compute`]: crate::Allocator::compute

use crate::allocation::{LineItem, SplitMethod, TOLERANCE, checked_sum};
use crate::base::{Participant, ParticipantId};
use crate::error::ValidationError;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the report into the first error found, if any.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Checks participant names and method-specific constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationValidator;

impl AllocationValidator {
    pub fn validate(
        total: Decimal,
        participants: &[Participant],
        method: &SplitMethod,
    ) -> ValidationReport {
        let mut errors = Vec::new();

        if participants.is_empty() {
            errors.push(ValidationError::NoParticipants);
        }
        if total < Decimal::ZERO {
            errors.push(ValidationError::NegativeTotal);
        }
        check_names(participants, &mut errors);

        let known: HashSet<&ParticipantId> = participants.iter().map(|p| &p.id).collect();
        match method {
            SplitMethod::Equal => {}
            SplitMethod::Percentage(percentages) => {
                check_values(&known, percentages, &mut errors);
                match checked_sum(percentages.values().copied()) {
                    Some(sum) => match off_by_more_than_a_cent(sum, Decimal::ONE_HUNDRED) {
                        Some(false) => {}
                        Some(true) => errors.push(ValidationError::PercentageSum { sum }),
                        None => errors.push(ValidationError::AmountOverflow),
                    },
                    None => errors.push(ValidationError::AmountOverflow),
                }
            }
            SplitMethod::Custom(amounts) => {
                check_values(&known, amounts, &mut errors);
                match checked_sum(amounts.values().copied()) {
                    Some(sum) => match off_by_more_than_a_cent(sum, total) {
                        Some(false) => {}
                        Some(true) => errors.push(ValidationError::CustomSum { sum, total }),
                        None => errors.push(ValidationError::AmountOverflow),
                    },
                    None => errors.push(ValidationError::AmountOverflow),
                }
            }
            SplitMethod::Item(items) => check_items(total, &known, items, &mut errors),
        }

        ValidationReport { errors }
    }
}

/// Names must be non-empty and unique (exact, case-sensitive match).
fn check_names(participants: &[Participant], errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for (i, participant) in participants.iter().enumerate() {
        if participant.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index: i + 1 });
            continue;
        }
        if !seen.insert(participant.name.as_str()) && reported.insert(participant.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: participant.name.clone(),
            });
        }
    }
}

fn check_values(
    known: &HashSet<&ParticipantId>,
    values: &HashMap<ParticipantId, Decimal>,
    errors: &mut Vec<ValidationError>,
) {
    // Sorted so the error order doesn't depend on hash order.
    let mut entries: Vec<_> = values.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (id, value) in entries {
        if !known.contains(id) {
            errors.push(ValidationError::UnknownParticipant { id: id.clone() });
        }
        if *value < Decimal::ZERO {
            errors.push(ValidationError::NegativeValue { id: id.to_string() });
        }
    }
}

fn check_items(
    total: Decimal,
    known: &HashSet<&ParticipantId>,
    items: &[LineItem],
    errors: &mut Vec<ValidationError>,
) {
    for item in items {
        if item.price < Decimal::ZERO {
            errors.push(ValidationError::NegativeValue {
                id: item.name.clone(),
            });
        }
        if item.assigned.is_empty() {
            errors.push(ValidationError::EmptyItemAssignment {
                item: item.name.clone(),
            });
        }
        for id in &item.assigned {
            if !known.contains(id) {
                errors.push(ValidationError::UnknownParticipant { id: id.clone() });
            }
        }
    }

    let Some(items_sum) = checked_sum(items.iter().map(|item| item.price)) else {
        errors.push(ValidationError::AmountOverflow);
        return;
    };
    match items_sum.checked_sub(total) {
        Some(excess) if excess > TOLERANCE => errors.push(ValidationError::ItemsExceedTotal {
            items: items_sum,
            total,
        }),
        Some(_) => {}
        None => errors.push(ValidationError::AmountOverflow),
    }
}

/// `None` when the difference itself overflows.
fn off_by_more_than_a_cent(value: Decimal, expected: Decimal) -> Option<bool> {
    value
        .checked_sub(expected)
        .map(|difference| difference.abs() > TOLERANCE)
}
