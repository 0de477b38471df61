use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;

use crate::account::{rupiah, Account};
use crate::config::Config;
use crate::error::Result;
use crate::receipt;
use crate::store::Store;
use crate::transaction::{parse_amount, Kind, Transaction};

/// What a successful teller action produced: the account as it now stands and
/// the message to show the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    account: Account,
    message: String,
}

impl Outcome {
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

struct State {
    store: Store,
    last: HashMap<String, Transaction>,
}

/// Entry point for a teller front end. Takes the raw text the user typed and
/// runs authenticate, validate, mutate and persist under a single lock.
pub struct Engine {
    state: Mutex<State>,
    receipt_file: PathBuf,
}

impl Engine {
    pub fn new(store: Store, receipt_file: impl Into<PathBuf>) -> Engine {
        Engine {
            state: Mutex::new(State {
                store,
                last: HashMap::new(),
            }),
            receipt_file: receipt_file.into(),
        }
    }

    pub fn open(config: &Config) -> Engine {
        Engine::new(Store::load(&config.users_file), &config.receipt_file)
    }

    pub fn receipt_file(&self) -> &Path {
        &self.receipt_file
    }

    // The store is only changed after a successful persist or rolled back, so
    // a panic elsewhere never leaves it half-mutated.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn check_balance(&self, pin: &str, username: &str) -> Result<Outcome> {
        let state = self.state();
        let account = state.store.authenticate(pin, username)?;
        Ok(Outcome {
            message: format!("Your balance: {}", rupiah(account.balance())),
            account: account.clone(),
        })
    }

    pub fn withdraw(&self, pin: &str, username: &str, amount: &str) -> Result<Outcome> {
        self.transact(
            pin,
            username,
            Transaction::new(Kind::Withdrawal, parse_amount(amount)),
        )
    }

    pub fn deposit(&self, pin: &str, username: &str, amount: &str) -> Result<Outcome> {
        self.transact(
            pin,
            username,
            Transaction::new(Kind::Deposit, parse_amount(amount)),
        )
    }

    fn transact(&self, pin: &str, username: &str, tx: Transaction) -> Result<Outcome> {
        let mut guard = self.state();
        let state = &mut *guard;
        state.store.authenticate(pin, username)?;

        let account = match tx.kind() {
            Kind::Withdrawal => state.store.withdraw(pin, tx.amount()),
            Kind::Deposit => state.store.deposit(pin, tx.amount()),
        }?
        .clone();
        state.last.insert(pin.to_string(), tx);
        log::debug!("{} of {} for {}", tx.kind(), tx.amount(), pin);

        let message = match tx.kind() {
            Kind::Withdrawal => format!(
                "Withdrawal successful. Remaining balance: {}",
                rupiah(account.balance())
            ),
            Kind::Deposit => format!(
                "Deposit successful. New balance: {}",
                rupiah(account.balance())
            ),
        };
        Ok(Outcome { account, message })
    }

    /// Writes the receipt file for the account, showing the last transaction
    /// this engine performed for it.
    pub fn print_receipt(&self, pin: &str, username: &str, at: NaiveDateTime) -> Result<Outcome> {
        let state = self.state();
        let account = state.store.authenticate(pin, username)?;
        let text = receipt::format(account, state.last.get(pin), at);
        receipt::write(&self.receipt_file, &text)?;
        Ok(Outcome {
            account: account.clone(),
            message: format!(
                "Receipt printed. See file {}",
                self.receipt_file.display()
            ),
        })
    }
}
