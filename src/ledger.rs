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

//! Persistent debt ledger.
//!
//! The [`DebtLedger`] owns every debt entry and payment record. It is built
//! from a store snapshot and writes the full collections back after each
//! mutation.
//!
//! # Operations
//!
//! - **Record**: turn an [`Allocation`] and its payer into pending entries.
//! - **Settle**: mark an entry paid and append a [`Payment`].
//! - **Remind**: stamp a reminder on a pending entry.
//! - **Clear**: drop all entries and payments.
//!
//! # Single writer
//!
//! Persistence is read-modify-write of whole collections. Two ledgers over
//! the same store will overwrite each other; callers needing several writers
//! must coordinate outside the ledger.

use crate::allocation::{Allocation, TOLERANCE};
use crate::balance::{self, Balance};
use crate::base::{EntryId, ParticipantId};
use crate::config::LedgerConfig;
use crate::debt::{DebtEntry, DebtStatus, Payment};
use crate::error::{LedgerError, StateError, StoreError};
use crate::netting::{self, NetEntry};
use crate::statistics::{self, MonthlyStatistics};
use crate::store::PersistenceStore;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Pending entries touching one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantDebts<'a> {
    /// Entries where the participant is the debtor.
    pub owed_by_me: Vec<&'a DebtEntry>,
    /// Entries where the participant is the creditor.
    pub owed_to_me: Vec<&'a DebtEntry>,
}

/// Payment history of one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantPayments<'a> {
    pub made: Vec<&'a Payment>,
    pub received: Vec<&'a Payment>,
}

/// Debt ledger backed by a [`PersistenceStore`].
///
/// # Invariants
///
/// - Every entry has `debtor_id != creditor_id` and `amount > 0`.
/// - A failed write leaves the in-memory state as it was before the call.
/// - Entries are only removed by [`DebtLedger::clear`].
pub struct DebtLedger<S> {
    store: S,
    config: LedgerConfig,
    entries: Vec<DebtEntry>,
    payments: Vec<Payment>,
}

impl<S: PersistenceStore> DebtLedger<S> {
    /// Loads the ledger snapshot from `store`. Absent keys mean an empty ledger.
    pub fn load(store: S, config: LedgerConfig) -> Result<Self, LedgerError> {
        let entries: Vec<DebtEntry> = read_collection(&store, &config.entries_key)?;
        check_entries(&config.entries_key, &entries)?;
        let payments = read_collection(&store, &config.payments_key)?;
        tracing::debug!(
            entries = entries.len(),
            payments = payments.len(),
            "ledger loaded"
        );
        Ok(Self {
            store,
            config,
            entries,
            payments,
        })
    }

    /// Records what every participant owes the payer; see [`DebtLedger::record_at`].
    pub fn record(
        &mut self,
        allocation: &Allocation,
        payer_id: &ParticipantId,
        description: &str,
    ) -> Result<Vec<DebtEntry>, LedgerError> {
        self.record_at(allocation, payer_id, description, Utc::now())
    }

    /// Creates one pending entry per non-payer share above one cent, owed to
    /// the payer, and persists the ledger.
    ///
    /// The payer's own share is treated as already paid. An allocation where
    /// only the payer has a share yields no entries.
    ///
    /// # Errors
    ///
    /// - [`StateError::UnknownPayer`] - The payer has no share in the allocation.
    /// - [`LedgerError::Store`] - The write failed; nothing was recorded.
    pub fn record_at(
        &mut self,
        allocation: &Allocation,
        payer_id: &ParticipantId,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<DebtEntry>, LedgerError> {
        if allocation.share_of(payer_id).is_none() {
            return Err(StateError::UnknownPayer {
                id: payer_id.clone(),
            }
            .into());
        }

        let due_date = now + Duration::days(self.config.due_in_days);
        let recorded: Vec<DebtEntry> = allocation
            .shares()
            .iter()
            .filter(|share| &share.participant_id != payer_id && share.amount > TOLERANCE)
            .map(|share| DebtEntry {
                id: EntryId::generate(),
                debtor_id: share.participant_id.clone(),
                creditor_id: payer_id.clone(),
                amount: share.amount,
                description: description.to_string(),
                status: DebtStatus::Pending,
                created_at: now,
                due_date,
                paid_at: None,
                reminders: Vec::new(),
            })
            .collect();

        if recorded.is_empty() {
            return Ok(recorded);
        }

        let previous_len = self.entries.len();
        self.entries.extend(recorded.iter().cloned());
        if let Err(error) = self.flush_entries() {
            self.entries.truncate(previous_len);
            return Err(error.into());
        }

        tracing::debug!(
            payer = %payer_id,
            entries = recorded.len(),
            total = %allocation.total(),
            "debts recorded"
        );
        Ok(recorded)
    }

    /// Marks an entry paid now; see [`DebtLedger::settle_at`].
    pub fn settle(&mut self, entry_id: EntryId) -> Result<DebtEntry, LedgerError> {
        self.settle_at(entry_id, Utc::now())
    }

    /// Marks an entry paid, appends a [`Payment`], and persists both collections.
    ///
    /// Settling is not idempotent: the second call fails so a payment can
    /// never be counted twice.
    ///
    /// # Errors
    ///
    /// - [`StateError::EntryNotFound`] - No entry with this ID.
    /// - [`StateError::AlreadyPaid`] - The entry was settled before.
    /// - [`LedgerError::Store`] - The write failed; the entry stays pending.
    pub fn settle_at(
        &mut self,
        entry_id: EntryId,
        now: DateTime<Utc>,
    ) -> Result<DebtEntry, LedgerError> {
        let index = self.pending_index(entry_id)?;
        let previous = self.entries[index].clone();

        let entry = &mut self.entries[index];
        entry.status = DebtStatus::Paid;
        entry.paid_at = Some(now);
        let payment = Payment::for_entry(entry, now);
        self.payments.push(payment);

        // Payments first, so the store never holds a paid entry without its payment.
        if let Err(error) = self.flush_payments() {
            self.entries[index] = previous;
            self.payments.pop();
            return Err(error.into());
        }
        if let Err(error) = self.flush_entries() {
            self.entries[index] = previous;
            self.payments.pop();
            if let Err(rollback) = self.flush_payments() {
                tracing::warn!(
                    entry = %entry_id,
                    %rollback,
                    "payments not restored after failed settle"
                );
            }
            return Err(error.into());
        }

        let settled = self.entries[index].clone();
        tracing::debug!(
            entry = %entry_id,
            debtor = %settled.debtor_id,
            creditor = %settled.creditor_id,
            amount = %settled.amount,
            "debt settled"
        );
        Ok(settled)
    }

    /// Stamps a reminder now; see [`DebtLedger::remind_at`].
    pub fn remind(&mut self, entry_id: EntryId) -> Result<DebtEntry, LedgerError> {
        self.remind_at(entry_id, Utc::now())
    }

    /// Stamps a reminder on a pending entry and persists the ledger.
    ///
    /// # Errors
    ///
    /// Same as [`DebtLedger::settle_at`].
    pub fn remind_at(
        &mut self,
        entry_id: EntryId,
        now: DateTime<Utc>,
    ) -> Result<DebtEntry, LedgerError> {
        let index = self.pending_index(entry_id)?;
        self.entries[index].reminders.push(now);

        if let Err(error) = self.flush_entries() {
            self.entries[index].reminders.pop();
            return Err(error.into());
        }
        tracing::debug!(entry = %entry_id, "reminder recorded");
        Ok(self.entries[index].clone())
    }

    /// Removes every entry and payment record.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] - A write failed; the ledger and the store keep
    /// their entries and payments.
    pub fn clear(&mut self) -> Result<(), LedgerError> {
        write_collection::<_, DebtEntry>(&self.store, &self.config.entries_key, &[])?;
        if let Err(error) =
            write_collection::<_, Payment>(&self.store, &self.config.payments_key, &[])
        {
            if let Err(rollback) = self.flush_entries() {
                tracing::warn!(%rollback, "entries not restored after failed clear");
            }
            return Err(error.into());
        }
        self.entries.clear();
        self.payments.clear();
        tracing::debug!("ledger cleared");
        Ok(())
    }

    fn pending_index(&self, entry_id: EntryId) -> Result<usize, StateError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == entry_id)
            .ok_or(StateError::EntryNotFound { id: entry_id })?;
        if !self.entries[index].is_pending() {
            return Err(StateError::AlreadyPaid { id: entry_id });
        }
        Ok(index)
    }

    fn flush_entries(&self) -> Result<(), StoreError> {
        write_collection(&self.store, &self.config.entries_key, &self.entries)
    }

    fn flush_payments(&self) -> Result<(), StoreError> {
        write_collection(&self.store, &self.config.payments_key, &self.payments)
    }
}

impl<S> DebtLedger<S> {
    pub fn entries(&self) -> &[DebtEntry] {
        &self.entries
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get(&self, entry_id: EntryId) -> Option<&DebtEntry> {
        self.entries.iter().find(|entry| entry.id == entry_id)
    }

    /// Pending entries where the participant is debtor or creditor.
    pub fn query_by_participant(&self, participant_id: &ParticipantId) -> ParticipantDebts<'_> {
        let pending = || self.entries.iter().filter(|entry| entry.is_pending());
        ParticipantDebts {
            owed_by_me: pending()
                .filter(|entry| &entry.debtor_id == participant_id)
                .collect(),
            owed_to_me: pending()
                .filter(|entry| &entry.creditor_id == participant_id)
                .collect(),
        }
    }

    pub fn payments_for(&self, participant_id: &ParticipantId) -> ParticipantPayments<'_> {
        ParticipantPayments {
            made: self
                .payments
                .iter()
                .filter(|payment| &payment.payer_id == participant_id)
                .collect(),
            received: self
                .payments
                .iter()
                .filter(|payment| &payment.receiver_id == participant_id)
                .collect(),
        }
    }

    /// Balance over the raw pending entries (not netted).
    pub fn balance(&self, participant_id: &ParticipantId) -> Balance {
        balance::balance(participant_id, &self.entries)
    }

    /// Netted view of the pending entries.
    pub fn net(&self) -> Vec<NetEntry> {
        netting::net(&self.entries)
    }

    /// Pending entries past their due date at `now`.
    pub fn overdue(&self, now: DateTime<Utc>) -> Vec<&DebtEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.is_overdue(now))
            .collect()
    }

    /// Totals per creation month, keyed `YYYY-MM`.
    pub fn monthly_statistics(&self) -> BTreeMap<String, MonthlyStatistics> {
        statistics::monthly(&self.entries)
    }
}

/// Rejects self-debts and non-positive amounts in a loaded snapshot.
fn check_entries(key: &str, entries: &[DebtEntry]) -> Result<(), StoreError> {
    let malformed = |entry: &DebtEntry, reason: &str| StoreError::Serialization {
        key: key.to_string(),
        message: format!("entry {} {reason}", entry.id),
    };
    for entry in entries {
        if entry.debtor_id == entry.creditor_id {
            return Err(malformed(entry, "is owed to its own debtor"));
        }
        if entry.amount <= Decimal::ZERO {
            return Err(malformed(entry, "has a non-positive amount"));
        }
    }
    Ok(())
}

fn read_collection<S, T>(store: &S, key: &str) -> Result<Vec<T>, StoreError>
where
    S: PersistenceStore,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(value) => serde_json::from_value(value).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(Vec::new()),
    }
}

fn write_collection<S, T>(store: &S, key: &str, items: &[T]) -> Result<(), StoreError>
where
    S: PersistenceStore,
    T: Serialize,
{
    let value = serde_json::to_value(items).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, value)
}
