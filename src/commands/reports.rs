// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{parse_month, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(conn, sub)?,
        Some(("by-category", sub)) => by_category(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let months: usize = *sub.get_one::<usize>("months").unwrap();

    let mut stmt = conn.prepare(
        "SELECT substr(date,1,7) AS month, amount, is_income
         FROM transactions ORDER BY date DESC",
    )?;
    let mut rows = stmt.query([])?;

    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let m: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let is_income: i64 = r.get(2)?;
        let amount = amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in month {}", amount_s, m))?;
        let entry = map.entry(m).or_insert((Decimal::ZERO, Decimal::ZERO));
        if is_income != 0 {
            entry.0 += amount;
        } else {
            entry.1 += amount;
        }
    }

    let mut data = Vec::new();
    for (m, (income, expense)) in map.iter().rev().take(months) {
        data.push(vec![
            m.clone(),
            format!("{:.2}", income),
            format!("{:.2}", expense),
            format!("{:.2}", income - expense),
        ]);
    }
    if !crate::utils::maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Net"], data)
        );
    }
    Ok(())
}

fn by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;

    let mut stmt = conn.prepare(
        "SELECT category, amount FROM transactions
         WHERE substr(date,1,7)=?1 AND is_income=0",
    )?;
    let mut rows = stmt.query([&month])?;

    let mut agg: BTreeMap<String, Decimal> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let cat: Option<String> = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let cat = cat.unwrap_or_else(|| "(uncategorized)".into());
        let amount = amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' for {}", amount_s, cat))?;
        *agg.entry(cat).or_insert(Decimal::ZERO) += amount;
    }

    let mut items: Vec<_> = agg.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    let data: Vec<Vec<String>> = items
        .into_iter()
        .map(|(cat, amt)| vec![cat, format!("{:.2}", amt)])
        .collect();
    if !crate::utils::maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Category", "Spent"], data));
    }
    Ok(())
}
