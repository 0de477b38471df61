//! Codec for the user record file: one `pin|username|balance` line per
//! account, no header, no quoting. Fields must not contain `|` themselves;
//! nothing escapes it.

use std::io;
use std::str::FromStr;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use rust_decimal::Decimal;

use crate::account::Account;
use crate::error::ParseError;

pub const DELIMITER: u8 = b'|';

const FIELDS: usize = 3;

pub fn parse_record(line: &str) -> Result<Account, ParseError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    from_fields(&StringRecord::from(line.split('|').collect::<Vec<_>>()))
}

fn from_fields(record: &StringRecord) -> Result<Account, ParseError> {
    if record.len() != FIELDS {
        return Err(ParseError::FieldCount(record.len()));
    }
    let balance = &record[2];
    let balance = Decimal::from_str(balance.trim())
        .map_err(|_| ParseError::Balance(balance.to_string()))?;

    Ok(Account::new(&record[0], &record[1], balance))
}

/// One record line without its terminator, encoded exactly as
/// [`write_records`] writes it to the user file.
pub fn format_record(account: &Account) -> String {
    let mut line = Vec::new();
    if let Err(err) = write_records(&mut line, std::iter::once(account)) {
        // Three plain strings into memory; only reachable on a csv bug.
        log::error!("could not encode record for {}: {}", account.pin(), err);
    }
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    String::from_utf8_lossy(&line).into_owned()
}

/// Decodes every well-formed line of `rdr` in file order. Bad lines are
/// logged and skipped; a read failure ends the scan with what was decoded so
/// far.
pub fn read_records<R: io::Read>(rdr: R) -> Vec<Account> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(DELIMITER)
        .flexible(true)
        .quoting(false)
        .from_reader(rdr);

    let mut result = Vec::new();
    for r in rdr.records() {
        match r {
            Err(err) if err.is_io_error() => {
                log::error!("could not read user records: {}", err);
                break;
            }
            Err(err) => {
                log::warn!("skipping unreadable user record: {}", err);
                continue;
            }
            Ok(record) => match from_fields(&record) {
                Ok(account) => result.push(account),
                Err(err) => {
                    let line = record.position().map_or(0, |p| p.line());
                    log::warn!("skipping user record on line {}: {}", line, err);
                }
            },
        }
    }
    result
}

pub fn write_records<'a, W, I>(wtr: W, accounts: I) -> Result<(), csv::Error>
where
    W: io::Write,
    I: IntoIterator<Item = &'a Account>,
{
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(wtr);

    for account in accounts {
        wtr.serialize(account)?;
    }
    wtr.flush()?;

    Ok(())
}
