use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tempfile::NamedTempFile;

use crate::account::Account;
use crate::error::{Error, Result};
use crate::record;

/// Every account known to the teller, keyed by PIN, backed by the user record
/// file. Accounts keep the order in which they were first loaded or inserted,
/// and that order is what gets written back.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    accounts: Vec<Account>,
    index: HashMap<String, usize>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Store {
        Store {
            path: path.into(),
            accounts: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Reads the record file at `path`. A missing or unreadable file leaves
    /// the store empty, so every authentication is simply rejected.
    pub fn load(path: impl Into<PathBuf>) -> Store {
        let mut store = Store::new(path);
        match File::open(&store.path) {
            Ok(file) => {
                for account in record::read_records(BufReader::new(file)) {
                    store.insert(account);
                }
                log::info!(
                    "loaded {} accounts from {}",
                    store.len(),
                    store.path.display()
                );
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "{} does not exist yet, starting with no accounts",
                    store.path.display()
                );
            }
            Err(err) => {
                log::error!("could not open {}: {}", store.path.display(), err);
            }
        }
        store
    }

    /// Adds an account in memory only. A PIN that is already present is
    /// overwritten in place.
    pub fn insert(&mut self, account: Account) {
        match self.index.get(account.pin()) {
            Some(&i) => {
                log::warn!("duplicate PIN {}, keeping the later record", account.pin());
                self.accounts[i] = account;
            }
            None => {
                self.index
                    .insert(account.pin().to_string(), self.accounts.len());
                self.accounts.push(account);
            }
        }
    }

    pub fn get(&self, pin: &str) -> Option<&Account> {
        self.index.get(pin).map(|&i| &self.accounts[i])
    }

    pub fn authenticate(&self, pin: &str, username: &str) -> Result<&Account> {
        match self.get(pin) {
            Some(account) if account.is_owned_by(username) => Ok(account),
            _ => Err(Error::AuthFailure),
        }
    }

    pub fn withdraw(&mut self, pin: &str, amount: Decimal) -> Result<&Account> {
        let i = self.position(pin)?;
        let previous = self.accounts[i].balance();
        self.accounts[i].withdrawal(amount).map_err(|rejection| {
            log::warn!("withdrawal of {} rejected for {}: {}", amount, pin, rejection);
            rejection
        })?;
        self.commit(i, previous)
    }

    pub fn deposit(&mut self, pin: &str, amount: Decimal) -> Result<&Account> {
        let i = self.position(pin)?;
        let previous = self.accounts[i].balance();
        self.accounts[i].deposit(amount).map_err(|rejection| {
            log::warn!("deposit of {} rejected for {}: {}", amount, pin, rejection);
            rejection
        })?;
        self.commit(i, previous)
    }

    /// Replaces the record file with the current accounts. The new content is
    /// written to a sibling temporary file first and renamed over the target.
    pub fn persist(&self) -> Result<()> {
        self.write_file().map_err(|err| {
            log::error!("could not write {}: {}", self.path.display(), err);
            Error::Persist(err)
        })
    }

    fn write_file(&self) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        record::write_records(tmp.as_file_mut(), &self.accounts)?;
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;
        match fs::metadata(&self.path) {
            Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    /// Persists after a mutation of account `i`, putting `previous` back when
    /// the file could not be written.
    fn commit(&mut self, i: usize, previous: Decimal) -> Result<&Account> {
        if let Err(err) = self.persist() {
            self.accounts[i].restore_balance(previous);
            return Err(err);
        }
        let account = &self.accounts[i];
        log::debug!("{} balance is now {}", account.pin(), account.balance());
        Ok(account)
    }

    fn position(&self, pin: &str) -> Result<usize> {
        self.index.get(pin).copied().ok_or(Error::AuthFailure)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Rejection;
    use rust_decimal_macros::dec;

    fn store_with(dir: &Path, content: &str) -> Store {
        let path = dir.join("pengguna.txt");
        fs::write(&path, content).unwrap();
        Store::load(path)
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(dir.path().join("pengguna.txt"));
        assert!(store.is_empty());
        assert!(matches!(
            store.authenticate("1111", "alice"),
            Err(Error::AuthFailure)
        ));
    }

    #[test]
    fn load_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(dir.path());
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_pin_last_line_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(
            dir.path(),
            "1234|alice|100000\n5555|bob|0\n1234|carol|250000\n",
        );
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get("1234"),
            Some(&Account::new("1234", "carol", dec!(250000)))
        );
        let pins: Vec<&str> = store.accounts().map(|a| a.pin()).collect();
        assert_eq!(pins, vec!["1234", "5555"]);
    }

    #[test]
    fn authenticate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(dir.path(), "1111|alice|200000\n");
        assert!(store.authenticate("1111", "alice").is_ok());
        assert!(matches!(
            store.authenticate("1111", "Alice"),
            Err(Error::AuthFailure)
        ));
        assert!(matches!(
            store.authenticate("1111", "alice "),
            Err(Error::AuthFailure)
        ));
        assert!(matches!(
            store.authenticate("2222", "alice"),
            Err(Error::AuthFailure)
        ));
    }

    #[test]
    fn withdrawals_until_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with(dir.path(), "1111|alice|200000\n");
        let path = store.path().to_path_buf();

        let account = store.withdraw("1111", dec!(100000)).unwrap();
        assert_eq!(account.balance(), dec!(100000));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1111|alice|100000\n");

        let account = store.withdraw("1111", dec!(100000)).unwrap();
        assert_eq!(account.balance(), dec!(0));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1111|alice|0\n");

        let result = store.withdraw("1111", dec!(50000));
        assert!(matches!(
            result,
            Err(Error::Rejected(Rejection::InsufficientFunds))
        ));
        assert_eq!(store.get("1111").unwrap().balance(), dec!(0));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1111|alice|0\n");
    }

    #[test]
    fn rejected_deposit_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with(dir.path(), "1111|alice|200000.0\n");

        let result = store.deposit("1111", dec!(75000));
        assert!(matches!(
            result,
            Err(Error::Rejected(Rejection::InvalidDenomination))
        ));
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "1111|alice|200000.0\n"
        );
    }

    #[test]
    fn deposit_rewrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with(
            dir.path(),
            "1111|alice|200000\nnot a record\n2222|bob|50000\n",
        );

        let account = store.deposit("2222", dec!(50000)).unwrap();
        assert_eq!(account.balance(), dec!(100000));
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "1111|alice|200000\n2222|bob|100000\n"
        );
    }

    #[test]
    fn overflowing_deposit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let content = "1111|alice|79228162514264337593543900000\n";
        let mut store = store_with(dir.path(), content);

        let result = store.deposit("1111", dec!(100000));
        assert!(matches!(
            result,
            Err(Error::Rejected(Rejection::BalanceOverflow))
        ));
        assert_eq!(
            store.get("1111").unwrap().balance(),
            dec!(79228162514264337593543900000)
        );
        assert_eq!(fs::read_to_string(store.path()).unwrap(), content);
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pengguna.txt");
        fs::write(&path, "1111|alice|200000\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let mut store = Store::load(&path);
        store.deposit("1111", dec!(50000)).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert_eq!(fs::read_to_string(&path).unwrap(), "1111|alice|250000\n");
    }

    #[test]
    fn mutation_of_unknown_pin() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with(dir.path(), "1111|alice|200000\n");
        assert!(matches!(
            store.deposit("9999", dec!(50000)),
            Err(Error::AuthFailure)
        ));
    }

    #[test]
    fn persist_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pengguna.txt");
        let mut store = Store::new(&path);
        store.insert(Account::new("1111", "alice", dec!(200000)));
        store.insert(Account::new("2222", "bob smith", dec!(0)));
        store.insert(Account::new("0007", "Carol", dec!(12.75)));
        store.persist().unwrap();

        let loaded = Store::load(&path);
        assert_eq!(
            loaded.accounts().collect::<Vec<_>>(),
            store.accounts().collect::<Vec<_>>()
        );
    }

    #[test]
    fn failed_persist_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::new(dir.path().join("missing").join("pengguna.txt"));
        store.insert(Account::new("1111", "alice", dec!(200000)));

        let result = store.withdraw("1111", dec!(50000));
        assert!(matches!(result, Err(Error::Persist(_))));
        assert_eq!(store.get("1111").unwrap().balance(), dec!(200000));
    }
}
