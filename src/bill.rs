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

//! Bill totals with service fee and tip.
//!
//! A receipt's subtotal is usually not what gets split: restaurants add a
//! service fee and diners add a tip. Each surcharge is either a percentage of
//! the subtotal or a fixed amount.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use split_ledger::{Bill, Surcharge};
//!
//! let bill = Bill::new(dec!(200.00))
//!     .with_service_fee(Surcharge::Percentage(dec!(10)))
//!     .with_tip(Surcharge::Fixed(dec!(5.00)));
//! assert_eq!(bill.total(), dec!(225.00));
//! ```

use crate::allocation::round_cents;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A charge added on top of the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Surcharge {
    /// Percentage of the subtotal, e.g. `10` for 10%.
    Percentage(Decimal),
    /// Flat amount.
    Fixed(Decimal),
}

impl Surcharge {
    /// Resolves the surcharge against a subtotal, rounded to the cent.
    pub fn amount(&self, subtotal: Decimal) -> Decimal {
        match self {
            Self::Percentage(pct) => round_cents(subtotal * pct / Decimal::ONE_HUNDRED),
            Self::Fixed(amount) => round_cents(*amount),
        }
    }
}

/// Subtotal plus optional service fee and tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bill {
    pub subtotal: Decimal,
    #[serde(default)]
    pub service_fee: Option<Surcharge>,
    #[serde(default)]
    pub tip: Option<Surcharge>,
}

impl Bill {
    pub fn new(subtotal: Decimal) -> Self {
        Self {
            subtotal,
            service_fee: None,
            tip: None,
        }
    }

    pub fn with_service_fee(mut self, fee: Surcharge) -> Self {
        self.service_fee = Some(fee);
        self
    }

    pub fn with_tip(mut self, tip: Surcharge) -> Self {
        self.tip = Some(tip);
        self
    }

    pub fn service_fee_amount(&self) -> Decimal {
        self.service_fee
            .map_or(Decimal::ZERO, |fee| fee.amount(self.subtotal))
    }

    pub fn tip_amount(&self) -> Decimal {
        self.tip.map_or(Decimal::ZERO, |tip| tip.amount(self.subtotal))
    }

    /// Surcharges only, without the subtotal.
    pub fn extras(&self) -> Decimal {
        self.service_fee_amount() + self.tip_amount()
    }

    /// Amount to be split: subtotal plus all surcharges.
    pub fn total(&self) -> Decimal {
        round_cents(self.subtotal) + self.extras()
    }
}
