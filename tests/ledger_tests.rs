// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::ledger::{self, LedgerIssue};
use billfold::models::{Account, Transaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn account(name: &str, balance: &str) -> Account {
    Account {
        id: 0,
        name: name.into(),
        kind: "bank".into(),
        balance: dec(balance),
        opening_balance: Decimal::ZERO,
        color: None,
    }
}

fn tx(name: &str, amount: &str, is_income: bool, acct: &str) -> Transaction {
    Transaction {
        id: 0,
        name: name.into(),
        amount: dec(amount),
        is_income,
        account: acct.into(),
        category: None,
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        note: None,
    }
}

#[test]
fn post_then_revert_restores_balance() {
    let mut accounts = vec![account("Main", "100")];
    let t = tx("Coffee", "3.75", false, "Main");

    assert!(ledger::post(&t, &mut accounts).is_empty());
    assert_eq!(accounts[0].balance, dec("96.25"));

    assert!(ledger::revert(&t, &mut accounts).is_empty());
    assert_eq!(accounts[0].balance, dec("100"));
}

#[test]
fn post_missing_account_reports_and_touches_nothing() {
    let mut accounts = vec![account("Main", "100")];
    let t = tx("Ghost", "50", false, "Nope");

    let issues = ledger::post(&t, &mut accounts);
    assert_eq!(issues, vec![LedgerIssue::AccountNotFound("Nope".into())]);
    assert_eq!(accounts[0].balance, dec("100"));
}

#[test]
fn update_reverts_old_account_and_posts_new_account() {
    let mut accounts = vec![account("X", "0"), account("Y", "0")];
    let old = tx("Gym", "10", false, "X");
    let new = tx("Gym", "15", false, "Y");

    let issues = ledger::update(&old, &new, &mut accounts);
    assert!(issues.is_empty());
    // X gets the old expense back, Y absorbs the new one.
    assert_eq!(accounts[0].balance, dec("10"));
    assert_eq!(accounts[1].balance, dec("-15"));
}

#[test]
fn update_same_account_applies_net_change() {
    let mut accounts = vec![account("Main", "4879.50")];
    let old = tx("Utilities", "120.50", false, "Main");
    let new = tx("Utilities", "200.00", false, "Main");

    let issues = ledger::update(&old, &new, &mut accounts);
    assert!(issues.is_empty());
    assert_eq!(accounts[0].balance, dec("4800.00"));
}

#[test]
fn recalculate_is_idempotent() {
    let mut accounts = vec![account("Main", "123"), account("Side", "9")];
    let txs = vec![
        tx("Pay", "5000", true, "Main"),
        tx("Rent", "1200", false, "Main"),
        tx("Gift", "40", true, "Side"),
    ];

    ledger::recalculate(&mut accounts, &txs);
    let first: Vec<Decimal> = accounts.iter().map(|a| a.balance).collect();
    let issues = ledger::recalculate(&mut accounts, &txs);
    let second: Vec<Decimal> = accounts.iter().map(|a| a.balance).collect();

    assert_eq!(first, second);
    assert!(issues.is_empty());
}

#[test]
fn recalculate_matches_incremental_posts_in_any_order() {
    let txs = vec![
        tx("A", "10.10", true, "Main"),
        tx("B", "2.35", false, "Main"),
        tx("C", "7", false, "Main"),
        tx("D", "100", true, "Side"),
    ];

    let mut forward = vec![account("Main", "0"), account("Side", "0")];
    for t in &txs {
        ledger::post(t, &mut forward);
    }

    let mut backward = vec![account("Main", "0"), account("Side", "0")];
    for t in txs.iter().rev() {
        ledger::post(t, &mut backward);
    }

    let mut recalced = vec![account("Main", "0"), account("Side", "0")];
    ledger::recalculate(&mut recalced, &txs);

    for i in 0..2 {
        assert_eq!(forward[i].balance, recalced[i].balance);
        assert_eq!(backward[i].balance, recalced[i].balance);
    }
}

#[test]
fn recalculate_keeps_opening_balance_as_base_term() {
    let mut acct = account("Savings", "999");
    acct.opening_balance = dec("250");
    let mut accounts = vec![acct];

    let issues = ledger::recalculate(&mut accounts, &[]);
    assert_eq!(accounts[0].balance, dec("250"));
    assert_eq!(
        issues,
        vec![LedgerIssue::Drift {
            account: "Savings".into(),
            cached: dec("999"),
            computed: dec("250"),
        }]
    );
}

#[test]
fn recalculate_reports_drift_after_manual_override() {
    let mut accounts = vec![account("Main", "0")];
    let txs = vec![tx("Pay", "100", true, "Main")];
    ledger::recalculate(&mut accounts, &txs);
    assert_eq!(accounts[0].balance, dec("100"));

    // Manual override diverges until the next recalculation.
    accounts[0].balance = dec("500");
    let issues = ledger::recalculate(&mut accounts, &txs);
    assert_eq!(issues.len(), 1);
    assert_eq!(accounts[0].balance, dec("100"));
}

#[test]
fn end_to_end_scenario() {
    let mut accounts = vec![account("Main", "0")];

    let income = tx("Salary", "5000", true, "Main");
    ledger::post(&income, &mut accounts);
    assert_eq!(accounts[0].balance, dec("5000"));

    let expense = tx("Utilities", "120.50", false, "Main");
    ledger::post(&expense, &mut accounts);
    assert_eq!(accounts[0].balance, dec("4879.50"));

    let bigger = tx("Utilities", "200.00", false, "Main");
    ledger::update(&expense, &bigger, &mut accounts);
    assert_eq!(accounts[0].balance, dec("4800.00"));

    ledger::delete(&income, &mut accounts);
    assert_eq!(accounts[0].balance, dec("-200.00"));

    // Reconciliation over the surviving transaction set reproduces the same
    // balance exactly.
    let survivors = vec![bigger];
    let issues = ledger::recalculate(&mut accounts, &survivors);
    assert_eq!(accounts[0].balance, dec("-200.00"));
    assert!(issues.is_empty());
}
