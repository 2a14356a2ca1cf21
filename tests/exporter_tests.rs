// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::models::{Account, Frequency, Subscription, Transaction};
use billfold::{cli, commands::exporter, db};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn seed(conn: &Connection) {
    db::insert_account(
        conn,
        &Account {
            id: 0,
            name: "Checking".into(),
            kind: "bank".into(),
            balance: Decimal::ZERO,
            opening_balance: Decimal::ZERO,
            color: None,
        },
    )
    .unwrap();
    db::insert_transaction(
        conn,
        &Transaction {
            id: 0,
            name: "Corner Shop".into(),
            amount: "12.34".parse().unwrap(),
            is_income: false,
            account: "Checking".into(),
            category: Some("Groceries".into()),
            date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            note: Some("Weekly run".into()),
        },
    )
    .unwrap();
    db::insert_subscription(
        conn,
        &Subscription {
            id: 0,
            name: "Streamly".into(),
            amount: "9.99".parse().unwrap(),
            frequency: Frequency::Monthly,
            interval_days: 0,
            next_charge_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            account: "Checking".into(),
            category: None,
            note: None,
            active: true,
        },
    )
    .unwrap();
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["billfold", "export"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(conn, export_m)
}

#[test]
fn export_transactions_json_shape() {
    let conn = setup();
    seed(&conn);
    let dir = tempdir().unwrap();
    let out = dir.path().join("txs.json");
    let out_str = out.to_string_lossy().to_string();

    run_export(&conn, &["transactions", "--format", "json", "--out", &out_str]).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2025-01-02",
                "account": "Checking",
                "name": "Corner Shop",
                "amount": "12.34",
                "direction": "expense",
                "category": "Groceries",
                "note": "Weekly run"
            }
        ])
    );
}

#[test]
fn export_transactions_csv_has_header_and_rows() {
    let conn = setup();
    seed(&conn);
    let dir = tempdir().unwrap();
    let out = dir.path().join("txs.csv");
    let out_str = out.to_string_lossy().to_string();

    run_export(&conn, &["transactions", "--format", "csv", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "date,account,name,amount,direction,category,note");
    assert!(lines[1].starts_with("2025-01-02,Checking,Corner Shop,12.34,expense"));
}

#[test]
fn export_subscriptions_csv() {
    let conn = setup();
    seed(&conn);
    let dir = tempdir().unwrap();
    let out = dir.path().join("subs.csv");
    let out_str = out.to_string_lossy().to_string();

    run_export(&conn, &["subscriptions", "--format", "csv", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("Streamly"));
    assert!(lines[1].contains("monthly"));
    assert!(lines[1].contains("2025-02-01"));
}

#[test]
fn export_rejects_unknown_format() {
    let conn = setup();
    seed(&conn);
    let dir = tempdir().unwrap();
    let out = dir.path().join("txs.xml");
    let out_str = out.to_string_lossy().to_string();

    assert!(run_export(&conn, &["transactions", "--format", "xml", "--out", &out_str]).is_err());
    assert!(!out.exists());
}
