// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger::{self, LedgerIssue};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = collect(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Read-only diagnostics. Nothing is repaired here; `account recalc` is the
/// repair path for drift, and dangling names are fixed by adding the missing
/// account or editing the rows.
pub fn collect(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Transactions naming an account that does not exist. These rows are
    // excluded from every balance computation until the name resolves.
    let mut stmt = conn.prepare(
        "SELECT DISTINCT account FROM transactions EXCEPT SELECT name FROM accounts",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let a: String = r.get(0)?;
        rows.push(vec!["tx_account_missing".into(), a]);
    }

    // 2) Same for subscriptions; a charge against one will not move a balance.
    let mut stmt2 = conn.prepare(
        "SELECT DISTINCT account FROM subscriptions EXCEPT SELECT name FROM accounts",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let a: String = r.get(0)?;
        rows.push(vec!["sub_account_missing".into(), a]);
    }

    // 3) Custom subscriptions with a nonsense interval; the form boundary
    // rejects these, so their presence means the row predates validation.
    let mut stmt3 = conn.prepare(
        "SELECT name, interval_days FROM subscriptions WHERE frequency='custom' AND interval_days < 1",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let n: String = r.get(0)?;
        let every: i64 = r.get(1)?;
        rows.push(vec![
            "sub_invalid_interval".into(),
            format!("{} ({} days)", n, every),
        ]);
    }

    // 4) Cached balances that disagree with recomputation (manual overrides
    // or effects lost to dangling names).
    let mut accounts = db::list_accounts(conn)?;
    let transactions = db::list_transactions(conn)?;
    for issue in ledger::recalculate(&mut accounts, &transactions) {
        if let LedgerIssue::Drift {
            account,
            cached,
            computed,
        } = issue
        {
            rows.push(vec![
                "balance_drift".into(),
                format!("{}: cached {}, recomputed {}", account, cached, computed),
            ]);
        }
    }

    Ok(rows)
}
