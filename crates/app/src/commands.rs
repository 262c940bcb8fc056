use std::io::Write;

use chrono::NaiveDate;
use engine::{
    Budget, Category, DateRange, Expense, ExpenseDraft, KeyValueStore, MoneyCents, Summary,
    Tracker,
};

use crate::{
    cli::{BudgetCommand, CategoryCommand, Command, ExpenseCommand, FilterArgs, StatsArgs},
    error::Result,
};

/// Runs one command against the tracker, writing its report to `out`.
pub fn run<S, W>(
    tracker: &mut Tracker<S>,
    command: Command,
    today: NaiveDate,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore + Clone,
    W: Write,
{
    match command {
        Command::Expense(expense) => run_expense(tracker, expense.command, today, out),
        Command::Budget(budget) => run_budget(tracker, budget.command, today, out),
        Command::Category(category) => run_category(tracker, category.command, out),
        Command::Stats(args) => run_stats(tracker, args, today, out),
    }
}

fn run_expense<S, W>(
    tracker: &mut Tracker<S>,
    command: ExpenseCommand,
    today: NaiveDate,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore + Clone,
    W: Write,
{
    match command {
        ExpenseCommand::Add(args) => {
            let draft = ExpenseDraft::new(
                args.amount,
                args.category,
                args.description,
                args.date.unwrap_or(today),
            );
            let expense = tracker.add_expense(draft)?;
            if !tracker.categories().iter().any(|c| c.name == expense.category) {
                writeln!(out, "note: \"{}\" is not a known category", expense.category)?;
            }
            writeln!(out, "Added expense {}", expense.id)?;
        }
        ExpenseCommand::Edit(args) => {
            let Some(current) = tracker.expense(&args.id) else {
                writeln!(out, "No expense with id {}; nothing changed", args.id)?;
                return Ok(());
            };
            let mut draft = ExpenseDraft::from(current);
            if let Some(amount) = args.amount {
                draft.amount = amount;
            }
            if let Some(category) = args.category {
                draft.category = category;
            }
            if let Some(description) = args.description {
                draft.description = description;
            }
            if let Some(date) = args.date {
                draft.date = date;
            }
            tracker.update_expense(&args.id, draft)?;
            writeln!(out, "Updated expense {}", args.id)?;
        }
        ExpenseCommand::Delete { id } => match tracker.delete_expense(&id)? {
            0 => writeln!(out, "No expense with id {id}; nothing changed")?,
            _ => writeln!(out, "Deleted expense {id}")?,
        },
        ExpenseCommand::List(args) => {
            apply_filter(tracker, args.filter)?;
            let expenses = tracker.filtered_expenses();
            if args.json {
                serde_json::to_writer_pretty(&mut *out, &expenses)?;
                writeln!(out)?;
            } else {
                write_expense_table(out, &expenses)?;
            }
        }
    }
    Ok(())
}

fn run_budget<S, W>(
    tracker: &mut Tracker<S>,
    command: BudgetCommand,
    today: NaiveDate,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore + Clone,
    W: Write,
{
    match command {
        BudgetCommand::Show => match tracker.summary(today).budget {
            Some(summary) => {
                write_budget_line(out, &summary.budget)?;
                writeln!(
                    out,
                    "Spent: {} ({:.1}%)  Remaining: {}  Status: {}",
                    summary.spent,
                    summary.progress,
                    summary.remaining,
                    summary.status.as_str()
                )?;
            }
            None => writeln!(out, "No budget set")?,
        },
        BudgetCommand::Set { amount, period } => {
            let budget = Budget::new(amount, period);
            tracker.set_budget(budget)?;
            write_budget_line(out, &budget)?;
        }
        BudgetCommand::Clear => {
            tracker.clear_budget()?;
            writeln!(out, "Budget cleared")?;
        }
    }
    Ok(())
}

fn run_category<S, W>(
    tracker: &mut Tracker<S>,
    command: CategoryCommand,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore + Clone,
    W: Write,
{
    match command {
        CategoryCommand::List => write_category_table(out, tracker.categories())?,
        CategoryCommand::Add { name } => {
            let category = tracker.add_category(&name)?;
            writeln!(out, "Added category {} ({})", category.name, category.id)?;
        }
        CategoryCommand::Delete { id } => match tracker.delete_category(&id)? {
            0 => writeln!(out, "No category with id {id}; nothing changed")?,
            _ => {
                writeln!(out, "Deleted category {id}")?;
                let orphans = tracker.orphaned_categories();
                if !orphans.is_empty() {
                    writeln!(
                        out,
                        "Expenses now reference unknown categories: {}",
                        orphans.join(", ")
                    )?;
                }
            }
        },
        CategoryCommand::Orphans => {
            let orphans = tracker.orphaned_categories();
            if orphans.is_empty() {
                writeln!(out, "Every expense references an existing category")?;
            }
            for name in orphans {
                writeln!(out, "{name}")?;
            }
        }
    }
    Ok(())
}

fn run_stats<S, W>(
    tracker: &mut Tracker<S>,
    args: StatsArgs,
    today: NaiveDate,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore + Clone,
    W: Write,
{
    apply_filter(tracker, args.filter)?;
    let summary = tracker.summary(args.date.unwrap_or(today));
    let breakdown = tracker.category_breakdown();

    if args.json {
        let report = serde_json::json!({
            "summary": summary,
            "categories": breakdown,
        });
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    write_summary(out, &summary)?;
    if !breakdown.is_empty() {
        writeln!(out)?;
        writeln!(out, "By category:")?;
        for entry in breakdown {
            writeln!(out, "  {:<16} {:>12}", entry.category, entry.total.to_string())?;
        }
    }
    Ok(())
}

fn apply_filter<S>(tracker: &mut Tracker<S>, filter: FilterArgs) -> Result<()>
where
    S: KeyValueStore + Clone,
{
    tracker.set_search_term(filter.search.unwrap_or_default());
    tracker.set_category_filter(filter.category);
    let range = match (filter.from, filter.to) {
        (None, None) => None,
        (from, to) => Some(DateRange::new(from, to)?),
    };
    tracker.set_date_range(range);
    Ok(())
}

fn write_budget_line<W: Write>(out: &mut W, budget: &Budget) -> Result<()> {
    let label = match budget.period {
        engine::BudgetPeriod::Monthly => "Monthly",
        engine::BudgetPeriod::Yearly => "Yearly",
    };
    writeln!(out, "{label} budget: {}", budget.amount)?;
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> Result<()> {
    writeln!(out, "Totals for {}", summary.date)?;
    writeln!(out, "  Daily   {:>12}", summary.daily.to_string())?;
    writeln!(out, "  Monthly {:>12}", summary.monthly.to_string())?;
    writeln!(out, "  Yearly  {:>12}", summary.yearly.to_string())?;
    if let Some(budget) = &summary.budget {
        writeln!(out)?;
        write_budget_line(out, &budget.budget)?;
        writeln!(
            out,
            "  {:.1}% used, {} remaining ({})",
            budget.progress,
            budget.remaining,
            budget.status.as_str()
        )?;
    }
    Ok(())
}

fn write_expense_table<W: Write>(out: &mut W, expenses: &[Expense]) -> Result<()> {
    if expenses.is_empty() {
        writeln!(out, "No expenses")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<36}  {:<10}  {:<16}  {:>12}  DESCRIPTION",
        "ID", "DATE", "CATEGORY", "AMOUNT"
    )?;
    for expense in expenses {
        writeln!(
            out,
            "{:<36}  {:<10}  {:<16}  {:>12}  {}",
            expense.id,
            expense.date.to_string(),
            expense.category,
            expense.amount.to_string(),
            expense.description
        )?;
    }
    let total: MoneyCents = expenses.iter().map(|e| e.amount).sum();
    writeln!(out, "{} expense(s), total {total}", expenses.len())?;
    Ok(())
}

fn write_category_table<W: Write>(out: &mut W, categories: &[Category]) -> Result<()> {
    for category in categories {
        let marker = if category.is_custom { " (custom)" } else { "" };
        writeln!(out, "{:<36}  {}{marker}", category.id, category.name)?;
    }
    Ok(())
}
