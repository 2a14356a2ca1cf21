// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger;
use crate::models::Transaction;
use crate::utils::{maybe_print_json, parse_amount, parse_date, pretty_table, warn_issues};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tx = Transaction {
        id: 0,
        name: sub.get_one::<String>("name").unwrap().clone(),
        amount: parse_amount(sub.get_one::<String>("amount").unwrap())?,
        is_income: sub.get_flag("income"),
        account: sub.get_one::<String>("account").unwrap().clone(),
        category: sub.get_one::<String>("category").cloned(),
        date: parse_date(sub.get_one::<String>("date").unwrap())?,
        note: sub.get_one::<String>("note").cloned(),
    };

    let mut accounts = db::list_accounts(conn)?;
    let issues = ledger::post(&tx, &mut accounts);
    warn_issues(&issues);
    // The row is persisted even when the account lookup failed; the dangling
    // name shows up in `doctor` and is repaired by adding the account and
    // recalculating.
    db::insert_transaction(conn, &tx)?;
    db::save_balances(conn, &accounts)?;
    println!(
        "Recorded {}{} on {} at '{}' (acct: {})",
        if tx.is_income { "+" } else { "-" },
        tx.amount,
        tx.date,
        tx.name,
        tx.account
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let Some(old) = db::get_transaction(conn, id)? else {
        bail!("Transaction {} not found", id);
    };

    let mut new = old.clone();
    if let Some(n) = sub.get_one::<String>("name") {
        new.name = n.clone();
    }
    if let Some(d) = sub.get_one::<String>("date") {
        new.date = parse_date(d)?;
    }
    if let Some(a) = sub.get_one::<String>("account") {
        new.account = a.clone();
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        new.amount = parse_amount(a)?;
    }
    if let Some(dir) = sub.get_one::<String>("direction") {
        new.is_income = dir == "income";
    }
    if let Some(c) = sub.get_one::<String>("category") {
        new.category = Some(c.clone());
    }
    if let Some(n) = sub.get_one::<String>("note") {
        new.note = Some(n.clone());
    }

    let mut accounts = db::list_accounts(conn)?;
    let issues = ledger::update(&old, &new, &mut accounts);
    warn_issues(&issues);
    db::update_transaction(conn, &new)?;
    db::save_balances(conn, &accounts)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let Some(tx) = db::get_transaction(conn, id)? else {
        bail!("Transaction {} not found", id);
    };
    let mut accounts = db::list_accounts(conn)?;
    let issues = ledger::delete(&tx, &mut accounts);
    warn_issues(&issues);
    db::delete_transaction(conn, id)?;
    db::save_balances(conn, &accounts)?;
    println!("Deleted transaction {} ('{}')", id, tx.name);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.account.clone(),
                    r.name.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Account", "Name", "Amount", "Category", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub account: String,
    pub name: String,
    /// Signed display amount: income positive, expense negative.
    pub amount: String,
    pub category: String,
    pub note: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT id, date, account, name, amount, is_income, category, note
         FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.into());
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        sql.push_str(" AND account=?");
        params_vec.push(acct.into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND category=?");
        params_vec.push(cat.into());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = if params_vec.is_empty() {
        stmt.query([])?
    } else {
        let params: Vec<&dyn rusqlite::ToSql> = params_vec
            .iter()
            .map(|s| s as &dyn rusqlite::ToSql)
            .collect();
        stmt.query(rusqlite::params_from_iter(params))?
    };

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let account: String = r.get(2)?;
        let name: String = r.get(3)?;
        let amount: String = r.get(4)?;
        let is_income: i64 = r.get(5)?;
        let category: Option<String> = r.get(6)?;
        let note: Option<String> = r.get(7)?;
        let amount = if is_income != 0 {
            amount
        } else {
            format!("-{}", amount)
        };
        data.push(TransactionRow {
            id,
            date,
            account,
            name,
            amount,
            category: category.unwrap_or_default(),
            note: note.unwrap_or_default(),
        });
    }
    Ok(data)
}
