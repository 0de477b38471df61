use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::account::{rupiah, Account};
use crate::error::{Error, Result};
use crate::transaction::Transaction;

pub const TITLE: &str = "Transaction Receipt";

/// Renders the receipt for `account`. `last` is the transaction performed in
/// this session, if any; `at` is supplied by the caller so the output is
/// reproducible.
pub fn format(account: &Account, last: Option<&Transaction>, at: NaiveDateTime) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", TITLE);
    let _ = writeln!(out, "Date: {}", at.format("%Y-%m-%d"));
    let _ = writeln!(out, "Time: {}", at.format("%H:%M:%S"));
    let _ = writeln!(out, "Transaction Details:");
    match last {
        Some(tx) => {
            let _ = writeln!(out, "{}: {}", tx.kind(), rupiah(tx.amount()));
        }
        None => {
            let _ = writeln!(out, "Amount: -");
        }
    }
    let _ = writeln!(out, "Remaining Balance: {}", rupiah(account.balance()));
    out
}

/// Overwrites the receipt file with `text`.
pub fn write(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|err| {
        log::error!("could not write receipt {}: {}", path.display(), err);
        Error::Receipt(err)
    })
}
