use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::Rejection;
use crate::transaction;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pin: String,
    username: String,
    balance: Decimal,
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut account = serializer.serialize_struct("Account", 3)?;
        account.serialize_field("pin", &self.pin)?;
        account.serialize_field("username", &self.username)?;
        account.serialize_field("balance", &self.balance.normalize().to_string())?;
        account.end()
    }
}

impl Account {
    pub fn new(pin: impl Into<String>, username: impl Into<String>, balance: Decimal) -> Account {
        Account {
            pin: pin.into(),
            username: username.into(),
            balance,
        }
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Case-sensitive, untrimmed comparison against the stored name.
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.username == username
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), Rejection> {
        transaction::can_deposit(amount)?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(Rejection::BalanceOverflow)?;
        Ok(())
    }

    pub fn withdrawal(&mut self, amount: Decimal) -> Result<(), Rejection> {
        transaction::can_withdraw(self.balance, amount)?;
        self.balance -= amount;
        Ok(())
    }

    pub(crate) fn restore_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}

/// Renders an amount the way the teller screens show money.
pub fn rupiah(amount: Decimal) -> String {
    format!("Rp{}", amount.normalize())
}
