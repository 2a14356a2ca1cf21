// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite persistence gateway.
//!
//! The ledger engine and scheduler are storage-agnostic; commands load
//! snapshots through the typed functions here, run the core on them, and
//! write the result back. One command invocation works on one connection, so
//! a ledger operation's load-mutate-save sequence is serialized by SQLite's
//! single-writer model.
//!
//! Decimals and dates are stored as TEXT (`Decimal::to_string`, YYYY-MM-DD).

use crate::models::{Account, Frequency, Subscription, Transaction};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.billfold", "Billfold", "billfold"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("billfold.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL,
        balance TEXT NOT NULL DEFAULT '0',
        opening_balance TEXT NOT NULL DEFAULT '0',
        color TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- account is the display name; names are unique so they act as the
    -- foreign-key surrogate (no FK constraint: a dangling name is a doctor
    -- finding, not an insert failure).
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        is_income INTEGER NOT NULL DEFAULT 0,
        account TEXT NOT NULL,
        category TEXT,
        date TEXT NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account);

    CREATE TABLE IF NOT EXISTS subscriptions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        frequency TEXT NOT NULL,
        interval_days INTEGER NOT NULL DEFAULT 30,
        next_charge_date TEXT NOT NULL,
        account TEXT NOT NULL,
        category TEXT,
        note TEXT,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_subscriptions_next ON subscriptions(next_charge_date);
    "#,
    )?;
    Ok(())
}

fn parse_stored_decimal(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid stored decimal '{}' for {}", s, what))
}

fn parse_stored_date(s: &str, what: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date '{}' for {}", s, what))
}

// ---- accounts ----

pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind, balance, opening_balance, color FROM accounts ORDER BY name",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let name: String = r.get(1)?;
        let balance: String = r.get(3)?;
        let opening: String = r.get(4)?;
        out.push(Account {
            id: r.get(0)?,
            kind: r.get(2)?,
            balance: parse_stored_decimal(&balance, &name)?,
            opening_balance: parse_stored_decimal(&opening, &name)?,
            color: r.get(5)?,
            name,
        });
    }
    Ok(out)
}

pub fn get_account(conn: &Connection, name: &str) -> Result<Option<Account>> {
    let row: Option<(i64, String, String, String, Option<String>)> = conn
        .query_row(
            "SELECT id, kind, balance, opening_balance, color FROM accounts WHERE name=?1",
            params![name],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
        )
        .optional()?;
    match row {
        Some((id, kind, balance, opening, color)) => Ok(Some(Account {
            id,
            name: name.to_string(),
            kind,
            balance: parse_stored_decimal(&balance, name)?,
            opening_balance: parse_stored_decimal(&opening, name)?,
            color,
        })),
        None => Ok(None),
    }
}

pub fn insert_account(conn: &Connection, account: &Account) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts(name, kind, balance, opening_balance, color)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            account.name,
            account.kind,
            account.balance.to_string(),
            account.opening_balance.to_string(),
            account.color
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Write every cached balance in the slice back to the store.
pub fn save_balances(conn: &Connection, accounts: &[Account]) -> Result<()> {
    let mut stmt = conn.prepare("UPDATE accounts SET balance=?1 WHERE name=?2")?;
    for account in accounts {
        stmt.execute(params![account.balance.to_string(), account.name])?;
    }
    Ok(())
}

pub fn update_account(conn: &Connection, account: &Account) -> Result<()> {
    conn.execute(
        "UPDATE accounts SET kind=?1, balance=?2, opening_balance=?3, color=?4 WHERE name=?5",
        params![
            account.kind,
            account.balance.to_string(),
            account.opening_balance.to_string(),
            account.color,
            account.name
        ],
    )?;
    Ok(())
}

pub fn delete_account(conn: &Connection, name: &str) -> Result<usize> {
    let n = conn.execute("DELETE FROM accounts WHERE name=?1", params![name])?;
    Ok(n)
}

// ---- transactions ----

fn transaction_from_parts(
    id: i64,
    name: String,
    amount: String,
    is_income: i64,
    account: String,
    category: Option<String>,
    date: String,
    note: Option<String>,
) -> Result<Transaction> {
    Ok(Transaction {
        id,
        amount: parse_stored_decimal(&amount, &name)?,
        is_income: is_income != 0,
        account,
        category,
        date: parse_stored_date(&date, &name)?,
        note,
        name,
    })
}

pub fn list_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, amount, is_income, account, category, date, note
         FROM transactions ORDER BY date, id",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(transaction_from_parts(
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
        )?);
    }
    Ok(out)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let row: Option<(String, String, i64, String, Option<String>, String, Option<String>)> = conn
        .query_row(
            "SELECT name, amount, is_income, account, category, date, note
             FROM transactions WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                ))
            },
        )
        .optional()?;
    match row {
        Some((name, amount, is_income, account, category, date, note)) => Ok(Some(
            transaction_from_parts(id, name, amount, is_income, account, category, date, note)?,
        )),
        None => Ok(None),
    }
}

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(name, amount, is_income, account, category, date, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            tx.name,
            tx.amount.to_string(),
            tx.is_income as i64,
            tx.account,
            tx.category,
            tx.date.to_string(),
            tx.note
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_transaction(conn: &Connection, tx: &Transaction) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET name=?1, amount=?2, is_income=?3, account=?4, category=?5,
         date=?6, note=?7 WHERE id=?8",
        params![
            tx.name,
            tx.amount.to_string(),
            tx.is_income as i64,
            tx.account,
            tx.category,
            tx.date.to_string(),
            tx.note,
            tx.id
        ],
    )?;
    Ok(())
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    Ok(())
}

// ---- subscriptions ----

fn subscription_from_parts(
    id: i64,
    name: String,
    amount: String,
    frequency: String,
    interval_days: i64,
    next_charge_date: String,
    account: String,
    category: Option<String>,
    note: Option<String>,
    active: i64,
) -> Result<Subscription> {
    Ok(Subscription {
        id,
        amount: parse_stored_decimal(&amount, &name)?,
        frequency: frequency.parse::<Frequency>()?,
        interval_days: u32::try_from(interval_days.max(0))
            .with_context(|| format!("Invalid interval {} for {}", interval_days, name))?,
        next_charge_date: parse_stored_date(&next_charge_date, &name)?,
        account,
        category,
        note,
        active: active != 0,
        name,
    })
}

pub fn list_subscriptions(conn: &Connection) -> Result<Vec<Subscription>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, amount, frequency, interval_days, next_charge_date,
                account, category, note, active
         FROM subscriptions ORDER BY next_charge_date, name",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(subscription_from_parts(
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
            r.get(8)?,
            r.get(9)?,
        )?);
    }
    Ok(out)
}

pub fn get_subscription(conn: &Connection, id: i64) -> Result<Option<Subscription>> {
    let row: Option<(
        String,
        String,
        String,
        i64,
        String,
        String,
        Option<String>,
        Option<String>,
        i64,
    )> = conn
        .query_row(
            "SELECT name, amount, frequency, interval_days, next_charge_date,
                    account, category, note, active
             FROM subscriptions WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                    r.get(7)?,
                    r.get(8)?,
                ))
            },
        )
        .optional()?;
    match row {
        Some((name, amount, frequency, interval, next, account, category, note, active)) => {
            Ok(Some(subscription_from_parts(
                id, name, amount, frequency, interval, next, account, category, note, active,
            )?))
        }
        None => Ok(None),
    }
}

pub fn insert_subscription(conn: &Connection, sub: &Subscription) -> Result<i64> {
    conn.execute(
        "INSERT INTO subscriptions(name, amount, frequency, interval_days, next_charge_date,
                                   account, category, note, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            sub.name,
            sub.amount.to_string(),
            sub.frequency.as_str(),
            i64::from(sub.interval_days),
            sub.next_charge_date.to_string(),
            sub.account,
            sub.category,
            sub.note,
            sub.active as i64
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_subscription(conn: &Connection, sub: &Subscription) -> Result<()> {
    conn.execute(
        "UPDATE subscriptions SET name=?1, amount=?2, frequency=?3, interval_days=?4,
         next_charge_date=?5, account=?6, category=?7, note=?8, active=?9 WHERE id=?10",
        params![
            sub.name,
            sub.amount.to_string(),
            sub.frequency.as_str(),
            i64::from(sub.interval_days),
            sub.next_charge_date.to_string(),
            sub.account,
            sub.category,
            sub.note,
            sub.active as i64,
            sub.id
        ],
    )?;
    Ok(())
}

pub fn delete_subscription(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM subscriptions WHERE id=?1", params![id])?;
    Ok(())
}
