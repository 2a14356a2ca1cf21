// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        Some(("subscriptions", sub)) => export_subscriptions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT date, account, name, amount, is_income, category, note
         FROM transactions ORDER BY date, id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, i64>(4)?,
            r.get::<_, Option<String>>(5)?,
            r.get::<_, Option<String>>(6)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "account",
                "name",
                "amount",
                "direction",
                "category",
                "note",
            ])?;
            for row in rows {
                let (d, a, n, amt, inc, cat, note) = row?;
                wtr.write_record([
                    d,
                    a,
                    n,
                    amt,
                    if inc != 0 { "income" } else { "expense" }.to_string(),
                    cat.unwrap_or_default(),
                    note.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (d, a, n, amt, inc, cat, note) = row?;
                items.push(json!({
                    "date": d, "account": a, "name": n, "amount": amt,
                    "direction": if inc != 0 { "income" } else { "expense" },
                    "category": cat, "note": note
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported transactions to {}", out);
    Ok(())
}

fn export_subscriptions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT name, amount, frequency, interval_days, next_charge_date, account,
                category, note, active
         FROM subscriptions ORDER BY name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, i64>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, Option<String>>(6)?,
            r.get::<_, Option<String>>(7)?,
            r.get::<_, i64>(8)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "name",
                "amount",
                "frequency",
                "interval_days",
                "next_charge_date",
                "account",
                "category",
                "note",
                "active",
            ])?;
            for row in rows {
                let (n, amt, f, every, next, a, cat, note, active) = row?;
                wtr.write_record([
                    n,
                    amt,
                    f,
                    every.to_string(),
                    next,
                    a,
                    cat.unwrap_or_default(),
                    note.unwrap_or_default(),
                    (active != 0).to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (n, amt, f, every, next, a, cat, note, active) = row?;
                items.push(json!({
                    "name": n, "amount": amt, "frequency": f, "interval_days": every,
                    "next_charge_date": next, "account": a, "category": cat,
                    "note": note, "active": active != 0
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported subscriptions to {}", out);
    Ok(())
}
