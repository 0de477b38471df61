use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::Rejection;

/// Notes are only dispensed and accepted in this unit.
pub const DENOMINATION: Decimal = dec!(50000);

#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Withdrawal,
    Deposit,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Withdrawal => f.write_str("Withdrawal"),
            Kind::Deposit => f.write_str("Deposit"),
        }
    }
}

/// A mutation that was applied and persisted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transaction {
    kind: Kind,
    amount: Decimal,
}

impl Transaction {
    pub fn new(kind: Kind, amount: Decimal) -> Transaction {
        Transaction { kind, amount }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

fn check_amount(amount: Decimal) -> Result<(), Rejection> {
    if amount <= Decimal::ZERO {
        return Err(Rejection::NonPositiveAmount);
    }
    if !(amount % DENOMINATION).is_zero() {
        return Err(Rejection::InvalidDenomination);
    }

    Ok(())
}

pub fn can_withdraw(balance: Decimal, amount: Decimal) -> Result<(), Rejection> {
    check_amount(amount)?;
    if amount > balance {
        return Err(Rejection::InsufficientFunds);
    }

    Ok(())
}

pub fn can_deposit(amount: Decimal) -> Result<(), Rejection> {
    check_amount(amount)
}

/// Reads an amount typed by the user. Anything that is not a number becomes
/// zero, which the rules then reject as non-positive.
pub fn parse_amount(text: &str) -> Decimal {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or_else(|_| {
            log::debug!("unparseable amount {:?}, using zero", text);
            Decimal::ZERO
        })
}
