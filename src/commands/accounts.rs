// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger::{self, LedgerIssue};
use crate::models::Account;
use crate::utils::{fmt_money, get_currency, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("recalc", _)) => recalc(conn)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let kind = sub.get_one::<String>("kind").unwrap();
    let opening = parse_decimal(sub.get_one::<String>("opening").unwrap())?;
    let account = Account {
        id: 0,
        name: name.clone(),
        kind: kind.clone(),
        balance: opening,
        opening_balance: opening,
        color: sub.get_one::<String>("color").cloned(),
    };
    db::insert_account(conn, &account)?;
    println!("Added account '{}' ({}, opening {})", name, kind, opening);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let ccy = get_currency(conn)?;
    let mut stmt = conn.prepare(
        "SELECT name, kind, balance, opening_balance, color, created_at
         FROM accounts ORDER BY name",
    )?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let name: String = r.get(0)?;
        let kind: String = r.get(1)?;
        let balance = parse_decimal(&r.get::<_, String>(2)?)?;
        let opening = parse_decimal(&r.get::<_, String>(3)?)?;
        let color: Option<String> = r.get(4)?;
        let created: String = r.get(5)?;
        data.push(vec![
            name,
            kind,
            fmt_money(&balance, &ccy),
            fmt_money(&opening, &ccy),
            color.unwrap_or_default(),
            created,
        ]);
    }
    if !crate::utils::maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(
                &["Name", "Kind", "Balance", "Opening", "Color", "Created"],
                data
            )
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let Some(mut account) = db::get_account(conn, name)? else {
        bail!("Account '{}' not found", name);
    };
    let mut overrode_balance = false;
    if let Some(b) = sub.get_one::<String>("balance") {
        account.balance = parse_decimal(b)?;
        overrode_balance = true;
    }
    if let Some(o) = sub.get_one::<String>("opening") {
        account.opening_balance = parse_decimal(o)?;
    }
    if let Some(k) = sub.get_one::<String>("kind") {
        account.kind = k.clone();
    }
    if let Some(c) = sub.get_one::<String>("color") {
        account.color = Some(c.clone());
    }
    db::update_account(conn, &account)?;
    println!("Updated account '{}'", name);
    if overrode_balance {
        println!("Balance set manually; 'account recalc' will reconcile it");
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    if db::get_account(conn, name)?.is_none() {
        bail!("Account '{}' not found", name);
    }
    let cascade = sub.get_flag("cascade");
    let tx_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE account=?1",
        params![name],
        |r| r.get(0),
    )?;
    let sub_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM subscriptions WHERE account=?1",
        params![name],
        |r| r.get(0),
    )?;
    if (tx_count > 0 || sub_count > 0) && !cascade {
        bail!(
            "Account '{}' still has {} transaction(s) and {} subscription(s); \
             pass --cascade to delete them too",
            name,
            tx_count,
            sub_count
        );
    }
    if cascade {
        conn.execute("DELETE FROM transactions WHERE account=?1", params![name])?;
        conn.execute("DELETE FROM subscriptions WHERE account=?1", params![name])?;
    }
    db::delete_account(conn, name)?;
    println!("Removed account '{}'", name);
    Ok(())
}

fn recalc(conn: &Connection) -> Result<()> {
    let mut accounts = db::list_accounts(conn)?;
    let transactions = db::list_transactions(conn)?;
    let issues = ledger::recalculate(&mut accounts, &transactions);
    db::save_balances(conn, &accounts)?;
    if issues.is_empty() {
        println!("All {} account(s) reconciled; no drift", accounts.len());
    } else {
        let rows = issues
            .iter()
            .map(|i| match i {
                LedgerIssue::Drift {
                    account,
                    cached,
                    computed,
                } => vec![account.clone(), cached.to_string(), computed.to_string()],
                other => vec!["-".into(), "-".into(), other.to_string()],
            })
            .collect();
        println!("{}", pretty_table(&["Account", "Cached", "Recomputed"], rows));
    }
    Ok(())
}
