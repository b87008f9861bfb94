use std::{fmt::Display, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand};
use engine::{ExpenseId, MoneyCents, ParticipantId, Percent, SplitPolicy};

#[derive(Parser, Debug)]
#[command(name = "fairshare")]
#[command(about = "Split group expenses and work out who pays whom")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the SQLite file to use.
    #[arg(long, global = true, conflicts_with = "memory")]
    pub database: Option<String>,
    /// Keep everything in memory for this run only.
    #[arg(long, global = true)]
    pub memory: bool,
    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the group roster.
    Participant(Participant),
    /// Record, inspect and correct expenses.
    Expense(Expense),
    /// Work with receipt data produced by an OCR service.
    Receipt(Receipt),
    /// Payments that settle every balance.
    Settle,
    /// Net balance of every participant.
    Balances,
    /// Spending per participant.
    Stats,
    /// Delete every participant and expense.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct Participant {
    #[command(subcommand)]
    pub command: ParticipantCommand,
}

#[derive(Subcommand, Debug)]
pub enum ParticipantCommand {
    Add {
        name: String,
    },
    List,
    Rename {
        #[arg(value_parser = parse_participant)]
        id: ParticipantId,
        name: String,
    },
    Remove {
        #[arg(value_parser = parse_participant)]
        id: ParticipantId,
    },
}

#[derive(Args, Debug)]
pub struct Expense {
    #[command(subcommand)]
    pub command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    /// Record an expense split by a policy.
    Add(SplitExpenseArgs),
    /// Record an expense from a bill file with assigned items.
    Itemized(ItemizedExpenseArgs),
    /// Replace an expense with a new split.
    Edit {
        #[arg(value_parser = parse_expense)]
        id: ExpenseId,
        #[command(flatten)]
        expense: SplitExpenseArgs,
    },
    /// Replace an expense with a new bill.
    EditItemized {
        #[arg(value_parser = parse_expense)]
        id: ExpenseId,
        #[command(flatten)]
        expense: ItemizedExpenseArgs,
    },
    List,
    Show {
        #[arg(value_parser = parse_expense)]
        id: ExpenseId,
    },
    Delete {
        #[arg(value_parser = parse_expense)]
        id: ExpenseId,
    },
}

#[derive(Args, Debug)]
pub struct SplitExpenseArgs {
    #[arg(long)]
    pub title: String,
    /// Who paid.
    #[arg(long, value_parser = parse_participant)]
    pub payer: ParticipantId,
    /// Total, e.g. `30`, `30.5` or `30,50`.
    #[arg(long)]
    pub amount: MoneyCents,
    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub struct ItemizedExpenseArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, value_parser = parse_participant)]
    pub payer: ParticipantId,
    /// JSON bill with items, assignments and rates.
    #[arg(long)]
    pub bill: PathBuf,
}

/// Exactly one way of dividing the amount.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct PolicyArgs {
    /// Split equally: `1,2,3`.
    #[arg(long, value_delimiter = ',', value_parser = parse_participant)]
    pub equal: Option<Vec<ParticipantId>>,
    /// Exact amounts: `1=12.50,2=17.50`.
    #[arg(long, value_delimiter = ',', value_parser = parse_entry::<MoneyCents>)]
    pub exact: Option<Vec<(ParticipantId, MoneyCents)>>,
    /// Percentages: `1=60,2=40`.
    #[arg(long, value_delimiter = ',', value_parser = parse_entry::<Percent>)]
    pub percent: Option<Vec<(ParticipantId, Percent)>>,
    /// Weights: `1=2,2=1`.
    #[arg(long, value_delimiter = ',', value_parser = parse_entry::<u64>)]
    pub shares: Option<Vec<(ParticipantId, u64)>>,
}

impl PolicyArgs {
    pub fn into_policy(self) -> Option<SplitPolicy> {
        if let Some(ids) = self.equal {
            Some(SplitPolicy::Equal(ids))
        } else if let Some(entries) = self.exact {
            Some(SplitPolicy::Exact(entries))
        } else if let Some(entries) = self.percent {
            Some(SplitPolicy::Percent(entries))
        } else {
            self.shares.map(SplitPolicy::Shares)
        }
    }
}

#[derive(Args, Debug)]
pub struct Receipt {
    #[command(subcommand)]
    pub command: ReceiptCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReceiptCommand {
    /// Turn OCR output into a bill to review and assign.
    Draft { file: PathBuf },
}

fn parse_participant(raw: &str) -> Result<ParticipantId, String> {
    raw.trim()
        .trim_start_matches('#')
        .parse()
        .map(ParticipantId)
        .map_err(|_| format!("invalid participant id: {raw}"))
}

fn parse_expense(raw: &str) -> Result<ExpenseId, String> {
    raw.trim()
        .trim_start_matches('#')
        .parse()
        .map(ExpenseId)
        .map_err(|_| format!("invalid expense id: {raw}"))
}

fn parse_entry<T>(raw: &str) -> Result<(ParticipantId, T), String>
where
    T: FromStr,
    T::Err: Display,
{
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got {raw}"))?;
    let value = value.trim().parse().map_err(|e| format!("{raw}: {e}"))?;
    Ok((parse_participant(id)?, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fairshare").chain(args.iter().copied())).unwrap()
    }

    fn policy(args: &[&str]) -> SplitPolicy {
        match parse(args).command {
            Command::Expense(Expense {
                command: ExpenseCommand::Add(expense),
            }) => expense.policy.into_policy().unwrap(),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_each_policy() {
        let base = ["expense", "add", "--title", "Dinner", "--payer", "1", "--amount", "30"];

        let equal = [&base[..], &["--equal", "1,2,#3"]].concat();
        assert_eq!(
            policy(&equal),
            SplitPolicy::Equal(vec![ParticipantId(1), ParticipantId(2), ParticipantId(3)])
        );

        let exact = [&base[..], &["--exact", "1=12.50,2=17.5"]].concat();
        assert_eq!(
            policy(&exact),
            SplitPolicy::Exact(vec![
                (ParticipantId(1), MoneyCents::new(1250)),
                (ParticipantId(2), MoneyCents::new(1750)),
            ])
        );

        let percent = [&base[..], &["--percent", "1=33.5,2=66.5%"]].concat();
        assert_eq!(
            policy(&percent),
            SplitPolicy::Percent(vec![
                (ParticipantId(1), Percent::from_basis_points(3350)),
                (ParticipantId(2), Percent::from_basis_points(6650)),
            ])
        );

        let shares = [&base[..], &["--shares", "1=2,2=1"]].concat();
        assert_eq!(
            policy(&shares),
            SplitPolicy::Shares(vec![(ParticipantId(1), 2), (ParticipantId(2), 1)])
        );
    }

    #[test]
    fn comma_in_an_entry_list_separates_entries() {
        // `17,50` is read as `17` followed by a malformed entry `50`.
        let args = [
            "expense", "add", "--title", "T", "--payer", "1", "--amount", "30", "--exact",
            "1=12.50,2=17,50",
        ];
        let result =
            Cli::try_parse_from(std::iter::once("fairshare").chain(args.iter().copied()));
        assert!(result.is_err());
    }

    #[test]
    fn requires_exactly_one_policy() {
        let none = ["fairshare", "expense", "add", "--title", "T", "--payer", "1", "--amount", "5"];
        assert!(Cli::try_parse_from(none).is_err());

        let two = [
            "fairshare", "expense", "add", "--title", "T", "--payer", "1", "--amount", "5",
            "--equal", "1", "--shares", "1=1",
        ];
        assert!(Cli::try_parse_from(two).is_err());
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(parse_entry::<u64>("1:2").is_err());
        assert!(parse_entry::<Percent>("x=10").is_err());
        assert!(parse_entry::<MoneyCents>("2=1.234").is_err());
        assert_eq!(
            parse_entry::<MoneyCents>(" 2 = 1.5").unwrap(),
            (ParticipantId(2), MoneyCents::new(150))
        );
    }
}
