// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::models::{Frequency, Subscription};
use crate::schedule;
use crate::utils::{maybe_print_json, parse_amount, parse_date, pretty_table, warn_issues};
use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("charge", sub)) => charge(conn, sub)?,
        Some(("advance", sub)) => advance(conn, sub)?,
        Some(("pause", sub)) => set_active(conn, sub, false)?,
        Some(("resume", sub)) => set_active(conn, sub, true)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("due", sub)) => due(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn require(conn: &Connection, id: i64) -> Result<Subscription> {
    match db::get_subscription(conn, id)? {
        Some(s) => Ok(s),
        None => bail!("Subscription {} not found", id),
    }
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let frequency = sub
        .get_one::<String>("frequency")
        .unwrap()
        .parse::<Frequency>()?;
    // Interval validation lives here at the input boundary; the date math
    // only floors as a last resort.
    let interval_days = match (frequency, sub.get_one::<u32>("every")) {
        (Frequency::Custom, Some(&n)) if n >= 1 => n,
        (Frequency::Custom, Some(_)) => bail!("--every must be at least 1 day"),
        (Frequency::Custom, None) => bail!("custom frequency requires --every <days>"),
        (_, _) => 0,
    };
    let first = match sub.get_one::<String>("first") {
        Some(s) => parse_date(s)?,
        None => Utc::now().date_naive(),
    };
    let record = Subscription {
        id: 0,
        name: name.clone(),
        amount: parse_amount(sub.get_one::<String>("amount").unwrap())?,
        frequency,
        interval_days,
        next_charge_date: first,
        account: sub.get_one::<String>("account").unwrap().clone(),
        category: sub.get_one::<String>("category").cloned(),
        note: sub.get_one::<String>("note").cloned(),
        active: true,
    };
    db::insert_subscription(conn, &record)?;
    println!(
        "Added subscription '{}' ({}, next charge {})",
        name, frequency, first
    );
    Ok(())
}

#[derive(Serialize)]
pub struct SubscriptionRow {
    pub id: i64,
    pub name: String,
    pub amount: String,
    pub frequency: String,
    pub next_charge: String,
    pub account: String,
    pub status: String,
}

fn status_label(s: &Subscription, today: NaiveDate) -> String {
    if !s.active {
        "paused".into()
    } else if schedule::is_overdue(s, today) {
        "overdue".into()
    } else if schedule::is_due_soon(s, today, 7) {
        "due soon".into()
    } else {
        "scheduled".into()
    }
}

fn rows_for(subs: &[Subscription], today: NaiveDate) -> Vec<SubscriptionRow> {
    subs.iter()
        .map(|s| SubscriptionRow {
            id: s.id,
            name: s.name.clone(),
            amount: s.amount.to_string(),
            frequency: match s.frequency {
                Frequency::Custom => format!("every {} days", s.interval_days),
                f => f.to_string(),
            },
            next_charge: s.next_charge_date.to_string(),
            account: s.account.clone(),
            status: status_label(s, today),
        })
        .collect()
}

fn print_rows(sub: &clap::ArgMatches, data: Vec<SubscriptionRow>) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.name,
                    r.amount,
                    r.frequency,
                    r.next_charge,
                    r.account,
                    r.status,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Name", "Amount", "Frequency", "Next charge", "Account", "Status"],
                rows,
            )
        );
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = Utc::now().date_naive();
    let mut subs = db::list_subscriptions(conn)?;
    if !sub.get_flag("all") {
        subs.retain(|s| s.active);
    }
    print_rows(sub, rows_for(&subs, today))
}

fn due(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = Utc::now().date_naive();
    let window = *sub.get_one::<i64>("window").unwrap();
    // Inactive subscriptions never show up here; the scheduler predicates do
    // not filter on the active flag themselves.
    let mut subs = db::list_subscriptions(conn)?;
    subs.retain(|s| {
        s.active && (schedule::is_overdue(s, today) || schedule::is_due_soon(s, today, window))
    });
    print_rows(sub, rows_for(&subs, today))
}

fn charge(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut record = require(conn, id)?;
    if !record.active {
        bail!("Subscription {} is paused; resume it before charging", id);
    }
    let today = Utc::now().date_naive();
    let mut accounts = db::list_accounts(conn)?;
    let (tx, issues) = schedule::charge_now(&mut record, &mut accounts, today);
    warn_issues(&issues);
    db::insert_transaction(conn, &tx)?;
    db::save_balances(conn, &accounts)?;
    db::update_subscription(conn, &record)?;
    println!(
        "Charged '{}' {} on {}; next charge {}",
        record.name, tx.amount, tx.date, record.next_charge_date
    );
    Ok(())
}

fn advance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut record = require(conn, id)?;
    schedule::advance(&mut record);
    db::update_subscription(conn, &record)?;
    println!(
        "Advanced '{}'; next charge {}",
        record.name, record.next_charge_date
    );
    Ok(())
}

fn set_active(conn: &Connection, sub: &clap::ArgMatches, active: bool) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut record = require(conn, id)?;
    record.active = active;
    db::update_subscription(conn, &record)?;
    println!(
        "{} '{}'",
        if active { "Resumed" } else { "Paused" },
        record.name
    );
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let record = require(conn, id)?;
    db::delete_subscription(conn, id)?;
    println!("Removed subscription '{}'", record.name);
    Ok(())
}
