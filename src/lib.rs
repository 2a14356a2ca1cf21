// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod db;
pub mod ledger;
pub mod models;
pub mod schedule;
pub mod utils;
pub mod commands;
