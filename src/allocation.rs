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

//! Allocation of a bill total across participants.
//!
//! Four methods are supported, one [`SplitMethod`] variant each:
//!
//! | Method | Parameters | Raw share |
//! |--------|------------|-----------|
//! | Equal | none | `total / n` |
//! | Percentage | percentage per participant (sum 100 ± 0.01) | `total * pct / 100` |
//! | Custom | amount per participant (sum total ± 0.01) | the amount |
//! | Item | line items with assigned participants | item price split evenly over its assignees |
//!
//! Every raw share is rounded to the cent, and whatever rounding residual is
//! left is added to the first participant in caller order, so the shares
//! always sum to the total exactly.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use split_ledger::{Allocator, Participant, SplitMethod};
//!
//! let participants = vec![
//!     Participant::new("a", "Amy"),
//!     Participant::new("b", "Ben"),
//!     Participant::new("c", "Cat"),
//! ];
//! let allocation = Allocator::compute(dec!(100.00), &participants, &SplitMethod::Equal).unwrap();
//!
//! let amounts: Vec<_> = allocation.shares().iter().map(|s| s.amount).collect();
//! assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
//! ```

use crate::base::{Participant, ParticipantId};
use crate::error::ValidationError;
use crate::validation::AllocationValidator;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Decimal places of the currency's smallest unit.
pub const CENT_PRECISION: u32 = 2;

/// Tolerance used for every sum comparison (one cent).
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, CENT_PRECISION);

/// Rounds half away from zero to the cent, always carrying two decimal places.
pub fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CENT_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CENT_PRECISION);
    rounded
}

/// Sums amounts, or `None` if the sum leaves the representable range.
pub(crate) fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount))
}

/// Method tag without parameters, as recorded on an [`Allocation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Equal,
    Percentage,
    Custom,
    Item,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Custom => "custom",
            Self::Item => "item",
        };
        f.write_str(name)
    }
}

/// One line of a receipt and the participants who shared it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LineItem {
    pub name: String,
    /// Total price of the line (quantity already applied).
    pub price: Decimal,
    pub assigned: Vec<ParticipantId>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: Decimal, assigned: Vec<ParticipantId>) -> Self {
        Self {
            name: name.into(),
            price,
            assigned,
        }
    }
}

/// How a total is divided, with the parameters each method needs.
///
/// Participants missing from a percentage or custom map contribute zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "method", content = "params", rename_all = "lowercase")]
pub enum SplitMethod {
    Equal,
    Percentage(HashMap<ParticipantId, Decimal>),
    Custom(HashMap<ParticipantId, Decimal>),
    Item(Vec<LineItem>),
}

impl SplitMethod {
    pub fn kind(&self) -> MethodKind {
        match self {
            Self::Equal => MethodKind::Equal,
            Self::Percentage(_) => MethodKind::Percentage,
            Self::Custom(_) => MethodKind::Custom,
            Self::Item(_) => MethodKind::Item,
        }
    }
}

/// A participant's portion of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub participant_id: ParticipantId,
    pub name: String,
    pub amount: Decimal,
}

/// Summary figures of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationStatistics {
    pub participant_count: usize,
    pub average: Decimal,
    pub max: Decimal,
    pub min: Decimal,
}

/// Per-participant shares of a total, reconciled to the cent.
///
/// # Invariants
///
/// - `shares` follow the caller-supplied participant order.
/// - The shares sum to `total` exactly.
/// - Only the first share can be negative, and only when the rounding residual
///   is larger than that share (per-person amounts of about a cent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    total: Decimal,
    method: MethodKind,
    shares: Vec<Share>,
}

impl Allocation {
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn method(&self) -> MethodKind {
        self.method
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// Share of a single participant, if they take part.
    pub fn share_of(&self, participant_id: &ParticipantId) -> Option<Decimal> {
        self.shares
            .iter()
            .find(|share| &share.participant_id == participant_id)
            .map(|share| share.amount)
    }

    pub fn statistics(&self) -> AllocationStatistics {
        let amounts = self.shares.iter().map(|share| share.amount);
        let count = self.shares.len();
        AllocationStatistics {
            participant_count: count,
            average: round_cents(self.total / Decimal::from(count)),
            max: amounts.clone().max().unwrap_or_default(),
            min: amounts.min().unwrap_or_default(),
        }
    }

    fn assert_invariants(&self) {
        debug_assert_eq!(
            self.shares.iter().map(|share| share.amount).sum::<Decimal>(),
            self.total,
            "Invariant violated: shares do not sum to the total"
        );
        debug_assert!(
            self.shares
                .iter()
                .skip(1)
                .all(|share| share.amount >= Decimal::ZERO),
            "Invariant violated: negative share after the first"
        );
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Split: {}", self.method)?;
        writeln!(f, "Total: {:.2}", self.total)?;
        writeln!(f, "Participants: {}", self.shares.len())?;
        for share in &self.shares {
            writeln!(f, "  {}: {:.2}", share.name, share.amount)?;
        }
        Ok(())
    }
}

/// Computes allocations. Stateless; every call is a pure function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allocator;

impl Allocator {
    /// Splits `total` across `participants` according to `method`.
    ///
    /// The total is quantised to the cent before splitting.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found by
    /// [`AllocationValidator::validate`].
    pub fn compute(
        total: Decimal,
        participants: &[Participant],
        method: &SplitMethod,
    ) -> Result<Allocation, ValidationError> {
        if let Err(error) = AllocationValidator::validate(total, participants, method).into_result()
        {
            tracing::debug!(method = %method.kind(), %error, "allocation rejected");
            return Err(error);
        }

        let total = round_cents(total);
        let raw = match method {
            SplitMethod::Equal => Some(equal_shares(total, participants)),
            SplitMethod::Percentage(percentages) => {
                percentage_shares(total, participants, percentages)
            }
            SplitMethod::Custom(amounts) => Some(custom_shares(participants, amounts)),
            SplitMethod::Item(items) => item_shares(total, participants, items),
        };
        let Some(amounts) = raw.and_then(|raw| reconcile(total, raw)) else {
            tracing::debug!(method = %method.kind(), %total, "allocation overflowed");
            return Err(ValidationError::AmountOverflow);
        };

        let allocation = Allocation {
            total,
            method: method.kind(),
            shares: participants
                .iter()
                .zip(amounts)
                .map(|(participant, amount)| Share {
                    participant_id: participant.id.clone(),
                    name: participant.name.clone(),
                    amount,
                })
                .collect(),
        };
        allocation.assert_invariants();

        tracing::debug!(
            method = %allocation.method,
            total = %allocation.total,
            participants = allocation.shares.len(),
            "allocation computed"
        );
        Ok(allocation)
    }
}

fn equal_shares(total: Decimal, participants: &[Participant]) -> Vec<Decimal> {
    let per_person = total / Decimal::from(participants.len());
    vec![per_person; participants.len()]
}

fn percentage_shares(
    total: Decimal,
    participants: &[Participant],
    percentages: &HashMap<ParticipantId, Decimal>,
) -> Option<Vec<Decimal>> {
    participants
        .iter()
        .map(|p| {
            let pct = percentages.get(&p.id).copied().unwrap_or_default();
            total.checked_mul(pct / Decimal::ONE_HUNDRED)
        })
        .collect()
}

fn custom_shares(
    participants: &[Participant],
    amounts: &HashMap<ParticipantId, Decimal>,
) -> Vec<Decimal> {
    participants
        .iter()
        .map(|p| amounts.get(&p.id).copied().unwrap_or_default())
        .collect()
}

/// Accumulates item prices per assignee, then spreads any amount the items
/// don't cover (service fee, tip) equally over everyone.
fn item_shares(
    total: Decimal,
    participants: &[Participant],
    items: &[LineItem],
) -> Option<Vec<Decimal>> {
    let index: HashMap<&ParticipantId, usize> = participants
        .iter()
        .enumerate()
        .map(|(i, p)| (&p.id, i))
        .collect();

    let mut raw = vec![Decimal::ZERO; participants.len()];
    for item in items {
        let per_person = item.price / Decimal::from(item.assigned.len());
        for id in &item.assigned {
            if let Some(&i) = index.get(id) {
                raw[i] = raw[i].checked_add(per_person)?;
            }
        }
    }

    let covered = checked_sum(items.iter().map(|item| item.price))?;
    let remainder = total.checked_sub(covered)?;
    if remainder > Decimal::ZERO {
        let per_person = remainder / Decimal::from(participants.len());
        for share in &mut raw {
            *share = share.checked_add(per_person)?;
        }
    }
    Some(raw)
}

/// Rounds every raw share and puts the whole residual on the first participant.
///
/// `None` if the rounded shares overflow when summed.
fn reconcile(total: Decimal, raw: Vec<Decimal>) -> Option<Vec<Decimal>> {
    let mut rounded: Vec<Decimal> = raw.into_iter().map(round_cents).collect();
    let residual = total.checked_sub(checked_sum(rounded.iter().copied())?)?;

    if let Some(first) = rounded.first_mut() {
        *first = first.checked_add(residual)?;
    }
    Some(rounded)
}

/// Splits a total; see [`Allocator::compute`].
pub fn compute_allocation(
    total: Decimal,
    participants: &[Participant],
    method: &SplitMethod,
) -> Result<Allocation, ValidationError> {
    Allocator::compute(total, participants, method)
}
