// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_currency, set_currency};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("currency", sub)) => {
            if let Some(code) = sub.get_one::<String>("code") {
                let code = code.to_uppercase();
                set_currency(conn, &code)?;
                println!("Display currency set to {}", code);
            } else {
                println!("{}", get_currency(conn)?);
            }
        }
        _ => {}
    }
    Ok(())
}
