use std::path::PathBuf;
use std::process;

use atm_ledger::config::{Config, DEFAULT_RECEIPT_FILE, DEFAULT_USERS_FILE};
use atm_ledger::engine::{Engine, Outcome};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Cash teller backed by a flat user file")]
struct Cli {
    /// User record file (pin|username|balance per line)
    #[arg(long, env = "ATM_USERS_FILE", default_value = DEFAULT_USERS_FILE)]
    users_file: PathBuf,

    /// File the receipt is printed to
    #[arg(long, env = "ATM_RECEIPT_FILE", default_value = DEFAULT_RECEIPT_FILE)]
    receipt_file: PathBuf,

    #[arg(long)]
    pin: String,

    #[arg(long = "user")]
    username: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current balance
    Balance,
    /// Take cash out, in multiples of 50,000
    Withdraw {
        amount: String,
        /// Print a receipt afterwards
        #[arg(long)]
        receipt: bool,
    },
    /// Put cash in, in multiples of 50,000
    Deposit {
        amount: String,
        /// Print a receipt afterwards
        #[arg(long)]
        receipt: bool,
    },
    /// Print a receipt for the account
    Receipt,
}

fn run(cli: Cli) -> anyhow::Result<Vec<Outcome>> {
    let config = Config {
        users_file: cli.users_file,
        receipt_file: cli.receipt_file,
    };
    let engine = Engine::open(&config);
    let (pin, user) = (cli.pin.as_str(), cli.username.as_str());
    let now = || chrono::Local::now().naive_local();

    let mut outcomes = Vec::new();
    match cli.command {
        Command::Balance => outcomes.push(engine.check_balance(pin, user)?),
        Command::Withdraw { amount, receipt } => {
            outcomes.push(engine.withdraw(pin, user, &amount)?);
            if receipt {
                outcomes.push(engine.print_receipt(pin, user, now())?);
            }
        }
        Command::Deposit { amount, receipt } => {
            outcomes.push(engine.deposit(pin, user, &amount)?);
            if receipt {
                outcomes.push(engine.print_receipt(pin, user, now())?);
            }
        }
        Command::Receipt => outcomes.push(engine.print_receipt(pin, user, now())?),
    }
    Ok(outcomes)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let outcomes = run(Cli::parse()).unwrap_or_else(|err| {
        println!("{}", err);
        process::exit(1);
    });
    for outcome in outcomes {
        println!("{}", outcome);
    }
}
