// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn with_json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand(
            Command::new("add")
                .about("Add an account")
                .arg(Arg::new("name").required(true))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .default_value("bank")
                        .help("Account kind (bank, credit, cash, savings, ...)"),
                )
                .arg(
                    Arg::new("opening")
                        .long("opening")
                        .default_value("0")
                        .help("Opening balance, preserved across recalculation"),
                )
                .arg(Arg::new("color").long("color").help("Display color tag")),
        )
        .subcommand(with_json_flags(
            Command::new("list").about("List accounts with cached balances"),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit an account; --balance overrides the cached balance directly")
                .arg(Arg::new("name").required(true))
                .arg(
                    Arg::new("balance")
                        .long("balance")
                        .help("Set the cached balance (manual override; recalc reconciles it)"),
                )
                .arg(
                    Arg::new("opening")
                        .long("opening")
                        .help("Set the opening balance"),
                )
                .arg(Arg::new("kind").long("kind"))
                .arg(Arg::new("color").long("color")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove an account (blocks while rows still reference it)")
                .arg(Arg::new("name").required(true))
                .arg(
                    Arg::new("cascade")
                        .long("cascade")
                        .action(ArgAction::SetTrue)
                        .help("Also delete transactions and subscriptions naming this account"),
                ),
        )
        .subcommand(
            Command::new("recalc")
                .about("Recompute every balance from the transaction set and report drift"),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Manage transactions")
        .subcommand(
            Command::new("add")
                .about("Record a transaction and post it to its account")
                .arg(Arg::new("name").required(true).help("Label / payee"))
                .arg(Arg::new("date").long("date").required(true))
                .arg(Arg::new("account").long("account").required(true))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .required(true)
                        .help("Non-negative magnitude"),
                )
                .arg(
                    Arg::new("income")
                        .long("income")
                        .action(ArgAction::SetTrue)
                        .help("Credit instead of the default expense"),
                )
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("note").long("note")),
        )
        .subcommand(with_json_flags(
            Command::new("list")
                .about("List transactions")
                .arg(Arg::new("month").long("month").help("Filter YYYY-MM"))
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit a transaction (old effect is reverted, new effect posted)")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("amount").long("amount"))
                .arg(
                    Arg::new("direction")
                        .long("direction")
                        .value_parser(["income", "expense"]),
                )
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("note").long("note")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction, reverting its effect first")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
}

fn sub_cmd() -> Command {
    Command::new("sub")
        .about("Manage recurring subscriptions")
        .subcommand(
            Command::new("add")
                .about("Add a subscription")
                .arg(Arg::new("name").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("account").long("account").required(true))
                .arg(
                    Arg::new("frequency")
                        .long("frequency")
                        .value_parser(["monthly", "weekly", "yearly", "custom"])
                        .default_value("monthly"),
                )
                .arg(
                    Arg::new("every")
                        .long("every")
                        .value_parser(value_parser!(u32))
                        .help("Days between charges (custom frequency only, >= 1)"),
                )
                .arg(
                    Arg::new("first")
                        .long("first")
                        .help("First charge date (default: today)"),
                )
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("note").long("note")),
        )
        .subcommand(with_json_flags(
            Command::new("list").about("List subscriptions").arg(
                Arg::new("all")
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("Include paused subscriptions"),
            ),
        ))
        .subcommand(
            Command::new("charge")
                .about("Charge now: post an expense dated today, then advance the due date")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("advance")
                .about("Skip a cycle: roll the due date forward without posting")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
        .subcommand(Command::new("pause").about("Deactivate a subscription").arg(
            Arg::new("id").required(true).value_parser(value_parser!(i64)),
        ))
        .subcommand(Command::new("resume").about("Reactivate a subscription").arg(
            Arg::new("id").required(true).value_parser(value_parser!(i64)),
        ))
        .subcommand(Command::new("rm").about("Delete a subscription").arg(
            Arg::new("id").required(true).value_parser(value_parser!(i64)),
        ))
        .subcommand(with_json_flags(
            Command::new("due")
                .about("List active subscriptions due within the window, plus overdue ones")
                .arg(
                    Arg::new("window")
                        .long("window")
                        .value_parser(value_parser!(i64))
                        .default_value("7"),
                ),
        ))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Reports")
        .subcommand(with_json_flags(
            Command::new("monthly")
                .about("Income, expense and net per month")
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(usize))
                        .default_value("12"),
                ),
        ))
        .subcommand(with_json_flags(
            Command::new("by-category")
                .about("Spend per category for a month")
                .arg(Arg::new("month").long("month").required(true)),
        ))
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Export data to CSV or JSON")
        .subcommand(
            Command::new("transactions")
                .arg(Arg::new("format").long("format").default_value("csv"))
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(
            Command::new("subscriptions")
                .arg(Arg::new("format").long("format").default_value("csv"))
                .arg(Arg::new("out").long("out").required(true)),
        )
}

fn config_cmd() -> Command {
    Command::new("config").about("Settings").subcommand(
        Command::new("currency")
            .about("Show or set the display currency code")
            .arg(Arg::new("code")),
    )
}

pub fn build_cli() -> Command {
    Command::new("billfold")
        .about("Local personal-finance ledger with accounts, transactions, and subscriptions")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Initialize the database and print its path"))
        .subcommand(account_cmd())
        .subcommand(tx_cmd())
        .subcommand(sub_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(
            Command::new("doctor").about("Report dangling references and balance drift"),
        )
        .subcommand(config_cmd())
}
