use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{BudgetPeriod, MoneyCents};

#[derive(Parser, Debug)]
#[command(name = "bashy", version)]
#[command(about = "Personal expense tracker: log expenses, set a budget, see where the money goes")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Override the timezone used for "today" (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add, edit, delete or list expenses.
    Expense(Expense),
    /// Show, set or clear the budget.
    Budget(Budget),
    /// Manage expense categories.
    Category(Category),
    /// Period totals, budget progress and spending per category.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct Expense {
    #[command(subcommand)]
    pub command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    Add(ExpenseAddArgs),
    Edit(ExpenseEditArgs),
    Delete {
        id: String,
    },
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ExpenseAddArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub amount: MoneyCents,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub description: String,
    /// Expense date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Fields left out keep their current value.
#[derive(Args, Debug)]
pub struct ExpenseEditArgs {
    pub id: String,
    #[arg(long, allow_negative_numbers = true)]
    pub amount: Option<MoneyCents>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Case-insensitive text matched against description and category.
    #[arg(long)]
    pub search: Option<String>,
    /// Exact category name.
    #[arg(long)]
    pub category: Option<String>,
    /// First day of the range (inclusive). Ignored without `--to`.
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day of the range (inclusive). Ignored without `--from`.
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct Budget {
    #[command(subcommand)]
    pub command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    Show,
    Set {
        #[arg(long, allow_negative_numbers = true)]
        amount: MoneyCents,
        /// monthly or yearly
        #[arg(long, default_value = "monthly")]
        period: BudgetPeriod,
    },
    Clear,
}

#[derive(Args, Debug)]
pub struct Category {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List,
    Add {
        name: String,
    },
    /// Delete by id. Expenses keep the category name.
    Delete {
        id: String,
    },
    /// List category names used by expenses that no longer exist.
    Orphans,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Reference date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    // Narrows the per-category breakdown; totals always cover every expense.
    #[command(flatten)]
    pub filter: FilterArgs,
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_budget_so_the_engine_can_reject_it() {
        let cli = Cli::try_parse_from(["bashy", "budget", "set", "--amount", "-5"]).unwrap();
        match cli.command {
            Command::Budget(Budget {
                command: BudgetCommand::Set { amount, period },
            }) => {
                assert_eq!(amount, MoneyCents::new(-500));
                assert_eq!(period, BudgetPeriod::Monthly);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from([
            "bashy", "expense", "list", "--search", "food", "--from", "2024-01-01", "--to",
            "2024-01-31",
        ])
        .unwrap();
        let Command::Expense(Expense {
            command: ExpenseCommand::List(args),
        }) = cli.command
        else {
            panic!("expected expense list");
        };
        assert_eq!(args.filter.search.as_deref(), Some("food"));
        assert_eq!(args.filter.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(!args.json);
    }
}
