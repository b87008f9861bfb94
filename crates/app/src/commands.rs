//! Executes a parsed command against a ledger and prints the result.

use std::{collections::HashMap, error::Error, path::Path};

use engine::{Charge, ItemizedBill, MoneyCents, ParticipantId, ReceiptDraft};
use ledger::{ExpenseDraft, Ledger, Participant, Store};
use serde::Serialize;

use crate::cli::{
    Command, ExpenseCommand, ItemizedExpenseArgs, ParticipantCommand, ReceiptCommand,
    SplitExpenseArgs,
};

pub type ResultApp<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// How results are printed.
#[derive(Debug, Clone)]
pub struct Output {
    pub json: bool,
    pub currency: String,
}

impl Output {
    fn money(&self, amount: MoneyCents) -> String {
        format!("{} {amount}", self.currency)
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> ResultApp<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

struct Roster(HashMap<ParticipantId, String>);

impl Roster {
    fn new(participants: &[Participant]) -> Self {
        Self(
            participants
                .iter()
                .map(|p| (p.id, p.name.clone()))
                .collect(),
        )
    }

    fn name(&self, id: ParticipantId) -> String {
        self.0.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }
}

pub async fn run<S: Store>(
    ledger: &mut Ledger<S>,
    command: Command,
    out: &Output,
    seed_participants: bool,
) -> ResultApp<()> {
    match command {
        Command::Participant(participant) => run_participant(ledger, participant.command, out).await,
        Command::Expense(expense) => run_expense(ledger, expense.command, out).await,
        Command::Receipt(receipt) => match receipt.command {
            ReceiptCommand::Draft { file } => receipt_draft(&file, out).await,
        },
        Command::Settle => settle(ledger, out).await,
        Command::Balances => balances(ledger, out).await,
        Command::Stats => stats(ledger, out).await,
        Command::Reset { yes } => {
            if !yes {
                return Err("refusing to delete everything without --yes".into());
            }
            ledger.reset().await?;
            if seed_participants {
                ledger.seed_default_participants().await?;
            }
            println!("All participants and expenses deleted");
            Ok(())
        }
    }
}

async fn run_participant<S: Store>(
    ledger: &mut Ledger<S>,
    command: ParticipantCommand,
    out: &Output,
) -> ResultApp<()> {
    match command {
        ParticipantCommand::Add { name } => {
            let participant = ledger.add_participant(&name).await?;
            if out.json {
                return out.print_json(&participant);
            }
            println!("Added {} {}", participant.id, participant.name);
        }
        ParticipantCommand::List => {
            let participants = ledger.participants().await?;
            if out.json {
                return out.print_json(&participants);
            }
            for p in &participants {
                match &p.avatar_color {
                    Some(color) => println!("{:>4}  {} ({color})", p.id, p.name),
                    None => println!("{:>4}  {}", p.id, p.name),
                }
            }
        }
        ParticipantCommand::Rename { id, name } => {
            ledger.rename_participant(id, &name).await?;
            println!("Renamed {id}");
        }
        ParticipantCommand::Remove { id } => {
            ledger.remove_participant(id).await?;
            println!("Removed {id}");
        }
    }
    Ok(())
}

fn split_draft(args: SplitExpenseArgs) -> ResultApp<ExpenseDraft> {
    let policy = args
        .policy
        .into_policy()
        .ok_or("choose one of --equal, --exact, --percent or --shares")?;
    Ok(ExpenseDraft {
        title: args.title,
        payer: args.payer,
        charge: Charge::Split {
            total: args.amount,
            policy,
        },
    })
}

async fn itemized_draft(args: ItemizedExpenseArgs) -> ResultApp<ExpenseDraft> {
    let raw = tokio::fs::read_to_string(&args.bill).await?;
    let bill: ItemizedBill = serde_json::from_str(&raw)?;
    Ok(ExpenseDraft {
        title: args.title,
        payer: args.payer,
        charge: Charge::Itemized(bill),
    })
}

async fn run_expense<S: Store>(
    ledger: &mut Ledger<S>,
    command: ExpenseCommand,
    out: &Output,
) -> ResultApp<()> {
    match command {
        ExpenseCommand::Add(args) => {
            let id = ledger.add_expense(&split_draft(args)?).await?;
            println!("Recorded expense {id}");
        }
        ExpenseCommand::Itemized(args) => {
            let id = ledger.add_expense(&itemized_draft(args).await?).await?;
            println!("Recorded expense {id}");
        }
        ExpenseCommand::Edit { id, expense } => {
            ledger.edit_expense(id, &split_draft(expense)?).await?;
            println!("Updated expense {id}");
        }
        ExpenseCommand::EditItemized { id, expense } => {
            ledger.edit_expense(id, &itemized_draft(expense).await?).await?;
            println!("Updated expense {id}");
        }
        ExpenseCommand::List => {
            let expenses = ledger.expenses().await?;
            if out.json {
                return out.print_json(&expenses);
            }
            let roster = Roster::new(&ledger.participants().await?);
            for e in &expenses {
                println!(
                    "{:>4}  {}  {:<24} {:>12}  paid by {}",
                    e.id,
                    e.created_at.format("%Y-%m-%d"),
                    e.title,
                    out.money(e.amount),
                    roster.name(e.payer)
                );
            }
        }
        ExpenseCommand::Show { id } => {
            let detail = ledger.expense(id).await?;
            if out.json {
                return out.print_json(&detail);
            }
            let roster = Roster::new(&ledger.participants().await?);
            println!("{} {}", detail.record.id, detail.record.title);
            println!("{}", out.money(detail.record.amount));
            println!("Paid by {}", roster.name(detail.record.payer));
            println!("Split with");
            for split in &detail.splits {
                println!(
                    "  {:<16} {:>12}",
                    roster.name(split.participant),
                    out.money(split.amount_owed)
                );
            }
            if !detail.items.is_empty() {
                println!("Items");
                for item in &detail.items {
                    let shared_by: Vec<String> =
                        item.assigned.iter().map(|id| roster.name(*id)).collect();
                    println!(
                        "  {:<16} {:>12}  {}",
                        item.name,
                        out.money(item.amount),
                        shared_by.join(", ")
                    );
                }
            }
        }
        ExpenseCommand::Delete { id } => {
            ledger.delete_expense(id).await?;
            println!("Deleted expense {id}");
        }
    }
    Ok(())
}

async fn receipt_draft(file: &Path, out: &Output) -> ResultApp<()> {
    let raw = tokio::fs::read_to_string(file).await?;
    let draft: ReceiptDraft = serde_json::from_str(&raw)?;

    let unexplained = draft.unexplained_amount();
    if !unexplained.is_zero() {
        tracing::warn!(
            "receipt total differs from items + tax + tip by {}",
            out.money(unexplained)
        );
    }
    // The bill is meant to be edited, so it is always printed as JSON.
    out.print_json(&draft.to_bill())
}

async fn settle<S: Store>(ledger: &Ledger<S>, out: &Output) -> ResultApp<()> {
    let payments = ledger.settle().await?;
    if out.json {
        return out.print_json(&payments);
    }
    if payments.is_empty() {
        println!("No payments needed");
        return Ok(());
    }
    let roster = Roster::new(&ledger.participants().await?);
    for payment in &payments {
        println!(
            "{} pays {} {}",
            roster.name(payment.from),
            roster.name(payment.to),
            out.money(payment.amount)
        );
    }
    Ok(())
}

async fn balances<S: Store>(ledger: &Ledger<S>, out: &Output) -> ResultApp<()> {
    let balances = ledger.balances().await?;
    if out.json {
        return out.print_json(&balances);
    }
    let roster = Roster::new(&ledger.participants().await?);
    for balance in &balances {
        let status = if balance.net.is_positive() {
            format!("gets back {}", out.money(balance.net))
        } else if balance.net.is_negative() {
            format!("owes {}", out.money(balance.net.abs()))
        } else {
            "settled up".to_string()
        };
        println!("{:<16} {status}", roster.name(balance.participant));
    }
    Ok(())
}

async fn stats<S: Store>(ledger: &Ledger<S>, out: &Output) -> ResultApp<()> {
    let spending = ledger.spending().await?;
    if out.json {
        return out.print_json(&spending);
    }
    let roster = Roster::new(&ledger.participants().await?);
    println!(
        "Total group spend: {}",
        out.money(engine::group_total(&spending)?)
    );
    for entry in &spending {
        println!(
            "{:<16} {:>12}  paid {} time(s), {} in total",
            roster.name(entry.participant),
            out.money(entry.total_share),
            entry.paid_count,
            out.money(entry.paid_total)
        );
    }
    Ok(())
}
