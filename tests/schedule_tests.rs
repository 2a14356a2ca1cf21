// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::ledger::LedgerIssue;
use billfold::models::{Account, Frequency, Subscription};
use billfold::schedule::{self, CHARGE_NOTE, FALLBACK_CATEGORY};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn sub(frequency: Frequency, interval_days: u32, next: NaiveDate) -> Subscription {
    Subscription {
        id: 1,
        name: "Streamly".into(),
        amount: dec("9.99"),
        frequency,
        interval_days,
        next_charge_date: next,
        account: "Main".into(),
        category: None,
        note: None,
        active: true,
    }
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

#[test]
fn monthly_clamps_to_shorter_month() {
    assert_eq!(
        schedule::next_occurrence(date(2024, 1, 31), Frequency::Monthly, 0),
        date(2024, 2, 29)
    );
    assert_eq!(
        schedule::next_occurrence(date(2023, 1, 31), Frequency::Monthly, 0),
        date(2023, 2, 28)
    );
}

#[test]
fn monthly_preserves_day_and_rolls_year() {
    assert_eq!(
        schedule::next_occurrence(date(2024, 5, 1), Frequency::Monthly, 0),
        date(2024, 6, 1)
    );
    assert_eq!(
        schedule::next_occurrence(date(2024, 12, 15), Frequency::Monthly, 0),
        date(2025, 1, 15)
    );
}

#[test]
fn weekly_adds_seven_days() {
    assert_eq!(
        schedule::next_occurrence(date(2024, 3, 28), Frequency::Weekly, 0),
        date(2024, 4, 4)
    );
}

#[test]
fn yearly_clamps_leap_day() {
    assert_eq!(
        schedule::next_occurrence(date(2024, 2, 29), Frequency::Yearly, 0),
        date(2025, 2, 28)
    );
    assert_eq!(
        schedule::next_occurrence(date(2023, 3, 10), Frequency::Yearly, 0),
        date(2024, 3, 10)
    );
}

#[test]
fn custom_adds_interval_days() {
    assert_eq!(
        schedule::next_occurrence(date(2024, 3, 1), Frequency::Custom, 10),
        date(2024, 3, 11)
    );
}

#[test]
fn custom_interval_floors_at_one_day() {
    assert_eq!(
        schedule::next_occurrence(date(2024, 3, 1), Frequency::Custom, 0),
        date(2024, 3, 2)
    );
}

#[test]
fn next_occurrence_is_deterministic() {
    let a = schedule::next_occurrence(date(2024, 1, 31), Frequency::Monthly, 0);
    let b = schedule::next_occurrence(date(2024, 1, 31), Frequency::Monthly, 0);
    assert_eq!(a, b);
}

#[test]
fn advance_rolls_the_due_date() {
    let mut s = sub(Frequency::Weekly, 0, date(2024, 5, 1));
    schedule::advance(&mut s);
    assert_eq!(s.next_charge_date, date(2024, 5, 8));
}

#[test]
fn charge_now_posts_expense_then_advances() {
    let mut s = sub(Frequency::Monthly, 0, date(2024, 5, 1));
    let mut accounts = vec![account("Main", "100")];
    let today = date(2024, 5, 1);

    let (tx, issues) = schedule::charge_now(&mut s, &mut accounts, today);

    assert!(issues.is_empty());
    assert!(!tx.is_income);
    assert_eq!(tx.amount, dec("9.99"));
    assert_eq!(tx.account, "Main");
    assert_eq!(tx.date, today);
    assert_eq!(tx.note.as_deref(), Some(CHARGE_NOTE));
    assert_eq!(tx.category.as_deref(), Some(FALLBACK_CATEGORY));
    assert_eq!(accounts[0].balance, dec("90.01"));

    // Charge then advance: the posted date is the charge moment, the due date
    // is already the next one.
    assert_eq!(s.next_charge_date, date(2024, 6, 1));
    assert_ne!(tx.date, s.next_charge_date);
}

#[test]
fn charge_now_keeps_subscription_category() {
    let mut s = sub(Frequency::Monthly, 0, date(2024, 5, 1));
    s.category = Some("Entertainment".into());
    let mut accounts = vec![account("Main", "0")];

    let (tx, _) = schedule::charge_now(&mut s, &mut accounts, date(2024, 5, 1));
    assert_eq!(tx.category.as_deref(), Some("Entertainment"));
}

#[test]
fn charge_now_missing_account_still_advances() {
    let mut s = sub(Frequency::Monthly, 0, date(2024, 5, 1));
    s.account = "Gone".into();
    let mut accounts = vec![account("Main", "100")];

    let (tx, issues) = schedule::charge_now(&mut s, &mut accounts, date(2024, 5, 2));

    assert_eq!(issues, vec![LedgerIssue::AccountNotFound("Gone".into())]);
    assert_eq!(accounts[0].balance, dec("100"));
    assert_eq!(tx.account, "Gone");
    assert_eq!(s.next_charge_date, date(2024, 6, 1));
}

#[test]
fn due_soon_and_overdue_boundaries() {
    let today = date(2024, 5, 10);

    let seven_out = sub(Frequency::Monthly, 0, date(2024, 5, 17));
    assert!(schedule::is_due_soon(&seven_out, today, 7));
    assert!(!schedule::is_overdue(&seven_out, today));

    let eight_out = sub(Frequency::Monthly, 0, date(2024, 5, 18));
    assert!(!schedule::is_due_soon(&eight_out, today, 7));
    assert!(!schedule::is_overdue(&eight_out, today));

    let due_today = sub(Frequency::Monthly, 0, today);
    assert!(schedule::is_due_soon(&due_today, today, 7));
    assert!(!schedule::is_overdue(&due_today, today));

    let yesterday = sub(Frequency::Monthly, 0, date(2024, 5, 9));
    assert!(!schedule::is_due_soon(&yesterday, today, 7));
    assert!(schedule::is_overdue(&yesterday, today));
}
