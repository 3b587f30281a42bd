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

//! # Split Ledger
//!
//! This library provides the allocation and debt-settlement engine of a
//! bill-splitting tool: it divides a total across participants exactly to the
//! cent, records who owes the payer what, and consolidates opposing debts.
//!
//! ## Core Components
//!
//! - [`Allocator`]: Splits a total by equal, percentage, custom, or item method
//! - [`AllocationValidator`]: Reports every problem with a proposed split
//! - [`DebtLedger`]: Persistent collection of debt entries and payments
//! - [`net`]: Collapses opposing debts between each pair of participants
//! - [`balance`]: A participant's owed/owing/net position
//! - [`Bill`]: Subtotal plus service fee and tip
//!
//! ## Example
//!
//! ```
//! use split_ledger::{
//!     Allocator, DebtLedger, LedgerConfig, MemoryStore, Participant, ParticipantId, SplitMethod,
//! };
//! use rust_decimal_macros::dec;
//!
//! let participants = vec![
//!     Participant::new("amy", "Amy"),
//!     Participant::new("ben", "Ben"),
//!     Participant::new("pat", "Pat"),
//! ];
//! let allocation = Allocator::compute(dec!(90.00), &participants, &SplitMethod::Equal).unwrap();
//!
//! let mut ledger = DebtLedger::load(MemoryStore::new(), LedgerConfig::default()).unwrap();
//! let entries = ledger
//!     .record(&allocation, &ParticipantId::new("pat"), "Dinner")
//!     .unwrap();
//! assert_eq!(entries.len(), 2);
//!
//! let balance = ledger.balance(&ParticipantId::new("pat"));
//! assert_eq!(balance.owing, dec!(60.00));
//! ```
//!
//! ## Concurrency
//!
//! Everything is synchronous. Allocation and netting are pure functions; the
//! ledger is the only mutable state and assumes a single writer.

pub mod allocation;
pub mod balance;
mod base;
pub mod bill;
pub mod config;
pub mod debt;
pub mod error;
pub mod ledger;
pub mod netting;
pub mod statistics;
pub mod store;
pub mod validation;

pub use allocation::{
    Allocation, AllocationStatistics, Allocator, LineItem, MethodKind, Share, SplitMethod,
    compute_allocation,
};
pub use balance::{Balance, Position, balance, net_balance};
pub use base::{EntryId, Participant, ParticipantId, PaymentId};
pub use bill::{Bill, Surcharge};
pub use config::LedgerConfig;
pub use debt::{DebtEntry, DebtStatus, Payment};
pub use error::{LedgerError, StateError, StoreError, ValidationError};
pub use ledger::{DebtLedger, ParticipantDebts, ParticipantPayments};
pub use netting::{NetEntry, PairKey, net, net_ledger};
pub use statistics::MonthlyStatistics;
pub use store::{JsonFileStore, MemoryStore, PersistenceStore};
pub use validation::{AllocationValidator, ValidationReport};
