// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::bail;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub kind: String,
    /// Cached running balance. Reconciled iff it equals
    /// `opening_balance + sum of signed transaction amounts`.
    pub balance: Decimal,
    /// Base term added by recalculation; survives a full recompute.
    pub opening_balance: Decimal,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub name: String,
    /// Non-negative magnitude; direction lives in `is_income`.
    pub amount: Decimal,
    pub is_income: bool,
    /// Account display name. Names are unique, so they double as the
    /// foreign-key surrogate throughout the store.
    pub account: String,
    pub category: Option<String>,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        if self.is_income {
            self.amount
        } else {
            -self.amount
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Weekly,
    Yearly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Weekly => "weekly",
            Frequency::Yearly => "yearly",
            Frequency::Custom => "custom",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Frequency::Monthly),
            "weekly" => Ok(Frequency::Weekly),
            "yearly" => Ok(Frequency::Yearly),
            "custom" => Ok(Frequency::Custom),
            _ => bail!(
                "Invalid frequency '{}' (use monthly|weekly|yearly|custom)",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub name: String,
    /// Magnitude; a charge always posts as an expense.
    pub amount: Decimal,
    pub frequency: Frequency,
    /// Days between charges; meaningful only for `Frequency::Custom`.
    pub interval_days: u32,
    pub next_charge_date: NaiveDate,
    pub account: String,
    pub category: Option<String>,
    pub note: Option<String>,
    pub active: bool,
}
