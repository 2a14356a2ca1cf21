// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recurrence date math and the subscription scheduler.
//!
//! `next_occurrence` is pure calendar arithmetic; the scheduler layers the
//! charge/advance operations on top of it and posts charges through the
//! ledger engine. Nothing here fires on its own; charging is always an
//! explicit caller action.

use crate::ledger::{self, LedgerIssue};
use crate::models::{Account, Frequency, Subscription, Transaction};
use chrono::{Datelike, Duration, NaiveDate};

/// Marker note attached to every transaction materialized from a subscription.
pub const CHARGE_NOTE: &str = "Subscription charge";

/// Category used when a subscription has none of its own.
pub const FALLBACK_CATEGORY: &str = "Subscriptions";

/// Next occurrence after `after` for the given frequency.
///
/// Monthly adds one calendar month, clamping the day when the target month is
/// shorter (Jan 31 -> Feb 29 in a leap year, Feb 28 otherwise). Yearly adds
/// one year with the same clamp (Feb 29 -> Feb 28). Weekly adds seven days.
/// Custom adds `interval_days`, floored at one day; interval validation
/// belongs at the input boundary, the floor only keeps the math total.
pub fn next_occurrence(after: NaiveDate, frequency: Frequency, interval_days: u32) -> NaiveDate {
    match frequency {
        Frequency::Monthly => shift_months(after, 1),
        Frequency::Weekly => after + Duration::days(7),
        Frequency::Yearly => shift_years(after, 1),
        Frequency::Custom => after + Duration::days(i64::from(interval_days.max(1))),
    }
}

fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    // Unwrap is fine: year/month are normalized and day is clamped in range.
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day).unwrap()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

/// Roll the subscription forward one cycle. No ledger interaction.
pub fn advance(sub: &mut Subscription) {
    sub.next_charge_date = next_occurrence(sub.next_charge_date, sub.frequency, sub.interval_days);
}

/// Materialize a charge as an expense transaction dated `today`, post it, and
/// only then advance the subscription. On return `next_charge_date` is the
/// following due date, never the date the posted transaction carries.
///
/// The returned transaction has id 0; the store assigns the real id on
/// insert.
pub fn charge_now(
    sub: &mut Subscription,
    accounts: &mut [Account],
    today: NaiveDate,
) -> (Transaction, Vec<LedgerIssue>) {
    let tx = Transaction {
        id: 0,
        name: sub.name.clone(),
        amount: sub.amount,
        is_income: false,
        account: sub.account.clone(),
        category: Some(
            sub.category
                .clone()
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
        ),
        date: today,
        note: Some(CHARGE_NOTE.to_string()),
    };
    let issues = ledger::post(&tx, accounts);
    advance(sub);
    (tx, issues)
}

pub fn days_until_due(sub: &Subscription, reference: NaiveDate) -> i64 {
    (sub.next_charge_date - reference).num_days()
}

/// Due within the lookahead window, today included. Does not filter on
/// `active`; that is the caller's query-time concern.
pub fn is_due_soon(sub: &Subscription, reference: NaiveDate, window_days: i64) -> bool {
    let days = days_until_due(sub, reference);
    days >= 0 && days <= window_days
}

pub fn is_overdue(sub: &Subscription, reference: NaiveDate) -> bool {
    sub.next_charge_date < reference
}
