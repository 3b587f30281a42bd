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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use split_ledger::{
    Allocator, DebtLedger, JsonFileStore, LedgerConfig, MemoryStore, NetEntry, Participant,
    ParticipantId, PersistenceStore, SplitMethod,
};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Split Ledger - Record shared expenses and print who owes whom
///
/// Reads expenses from a CSV file, splits each one equally among its
/// participants, and writes the netted transfers (or balances) to stdout.
#[derive(Parser, Debug)]
#[command(name = "split-ledger")]
#[command(about = "Splits shared expenses and nets the resulting debts", long_about = None)]
struct Args {
    /// Path to CSV file with expenses
    ///
    /// Expected format: description,payer,amount,participants
    /// Participants are separated by ';' and must include the payer.
    /// Example: split-ledger expenses.csv > transfers.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Directory to persist the ledger in; in-memory when omitted
    #[arg(long, value_name = "DIR")]
    store: Option<PathBuf>,

    /// Days until a recorded debt falls due
    #[arg(long, default_value_t = LedgerConfig::DEFAULT_DUE_IN_DAYS)]
    due_in_days: i64,

    /// Print per-participant balances instead of net transfers
    #[arg(long)]
    balances: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = LedgerConfig::default().with_due_in_days(args.due_in_days);

    let result = match &args.store {
        Some(dir) => run(JsonFileStore::new(dir), config, &args),
        None => run(MemoryStore::new(), config, &args),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        process::exit(1);
    }
}

fn run<S: PersistenceStore>(
    store: S,
    config: LedgerConfig,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(&args.input)
        .map_err(|e| format!("Error opening file '{}': {}", args.input.display(), e))?;

    let mut ledger = DebtLedger::load(store, config)?;
    let recorded = process_expenses(BufReader::new(file), &mut ledger)?;
    tracing::info!(expenses = recorded, "expenses recorded");

    if args.balances {
        write_balances(&ledger, std::io::stdout())?;
    } else {
        write_transfers(&ledger.net(), std::io::stdout())?;
    }
    Ok(())
}

/// Raw CSV record matching the input format.
///
/// Fields: `description, payer, amount, participants`
#[derive(Debug, Deserialize)]
struct ExpenseRecord {
    description: String,
    payer: String,
    amount: Decimal,
    participants: String,
}

impl ExpenseRecord {
    /// Participant IDs double as display names.
    fn participants(&self) -> Vec<Participant> {
        self.participants
            .split(';')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Participant::new(id, id))
            .collect()
    }
}

/// Records every valid expense from a CSV reader into the ledger.
///
/// Malformed rows, rows that fail validation, and rows whose payer is not a
/// participant are skipped with a warning.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
fn process_expenses<R: Read, S: PersistenceStore>(
    reader: R,
    ledger: &mut DebtLedger<S>,
) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);

    let mut recorded = 0;
    for (row, result) in rdr.deserialize::<ExpenseRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row, "skipping malformed row: {e}");
                continue;
            }
        };

        let participants = record.participants();
        let allocation = match Allocator::compute(record.amount, &participants, &SplitMethod::Equal)
        {
            Ok(allocation) => allocation,
            Err(e) => {
                tracing::warn!(row, "skipping invalid expense: {e}");
                continue;
            }
        };

        let payer = ParticipantId::new(record.payer.as_str());
        match ledger.record(&allocation, &payer, &record.description) {
            Ok(_) => recorded += 1,
            Err(e) => tracing::warn!(row, "skipping expense: {e}"),
        }
    }

    Ok(recorded)
}

#[derive(Debug, Serialize)]
struct TransferRow<'a> {
    debtor: &'a str,
    creditor: &'a str,
    amount: Decimal,
}

/// Writes net transfers as `debtor, creditor, amount`.
fn write_transfers<W: Write>(transfers: &[NetEntry], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for transfer in transfers {
        wtr.serialize(TransferRow {
            debtor: transfer.debtor_id.as_str(),
            creditor: transfer.creditor_id.as_str(),
            amount: transfer.amount,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    participant: &'a str,
    owed: Decimal,
    owing: Decimal,
    net: Decimal,
}

/// Writes one `participant, owed, owing, net` row per participant in the ledger.
fn write_balances<S, W: Write>(ledger: &DebtLedger<S>, writer: W) -> Result<(), csv::Error> {
    let participants: BTreeSet<&ParticipantId> = ledger
        .entries()
        .iter()
        .flat_map(|entry| [&entry.debtor_id, &entry.creditor_id])
        .collect();

    let mut wtr = Writer::from_writer(writer);
    for participant in participants {
        let balance = ledger.balance(participant);
        wtr.serialize(BalanceRow {
            participant: participant.as_str(),
            owed: balance.owed,
            owing: balance.owing,
            net: balance.net,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn ledger() -> DebtLedger<MemoryStore> {
        DebtLedger::load(MemoryStore::new(), LedgerConfig::default()).unwrap()
    }

    #[test]
    fn parse_simple_expense() {
        let csv = "description,payer,amount,participants\nDinner,pat,90.00,amy;ben;pat\n";
        let mut ledger = ledger();

        let recorded = process_expenses(Cursor::new(csv), &mut ledger).unwrap();

        assert_eq!(recorded, 1);
        assert_eq!(ledger.entries().len(), 2);
        assert_eq!(ledger.balance(&ParticipantId::new("pat")).owing, dec!(60.00));
    }

    #[test]
    fn parse_with_whitespace() {
        let csv = "description,payer,amount,participants\n Taxi , amy , 30.00 , amy ; ben \n";
        let mut ledger = ledger();

        process_expenses(Cursor::new(csv), &mut ledger).unwrap();

        let entry = &ledger.entries()[0];
        assert_eq!(entry.debtor_id, ParticipantId::new("ben"));
        assert_eq!(entry.creditor_id, ParticipantId::new("amy"));
        assert_eq!(entry.amount, dec!(15.00));
        assert_eq!(entry.description, "Taxi");
    }

    #[test]
    fn skip_malformed_and_invalid_rows() {
        let csv = "description,payer,amount,participants\n\
                   Dinner,pat,90.00,amy;ben;pat\n\
                   Broken,pat,not-a-number,amy;pat\n\
                   Nobody,pat,10.00,\n\
                   Outsider,zed,10.00,amy;ben\n\
                   Lunch,amy,20.00,amy;ben\n";
        let mut ledger = ledger();

        let recorded = process_expenses(Cursor::new(csv), &mut ledger).unwrap();

        assert_eq!(recorded, 2);
        assert_eq!(ledger.entries().len(), 3);
    }

    #[test]
    fn write_netted_transfers() {
        let csv = "description,payer,amount,participants\n\
                   Dinner,amy,100.00,amy;ben\n\
                   Lunch,ben,40.00,amy;ben\n";
        let mut ledger = ledger();
        process_expenses(Cursor::new(csv), &mut ledger).unwrap();

        let mut output = Vec::new();
        write_transfers(&ledger.net(), &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "debtor,creditor,amount\nben,amy,30.00\n");
    }

    #[test]
    fn write_balances_per_participant() {
        let csv = "description,payer,amount,participants\nDinner,amy,100.00,amy;ben\n";
        let mut ledger = ledger();
        process_expenses(Cursor::new(csv), &mut ledger).unwrap();

        let mut output = Vec::new();
        write_balances(&ledger, &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "participant,owed,owing,net\namy,0,50.00,50.00\nben,50.00,0,-50.00\n"
        );
    }
}
