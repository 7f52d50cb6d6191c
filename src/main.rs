use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use folio::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for folio::AppCommand {
    fn from(cmd: Commands) -> folio::AppCommand {
        match cmd {
            Commands::Buy {
                symbol,
                quantity,
                price,
                date,
                notes,
            } => folio::AppCommand::Buy {
                symbol,
                quantity,
                price,
                date,
                notes,
            },
            Commands::Sell {
                symbol,
                quantity,
                price,
                date,
                notes,
            } => folio::AppCommand::Sell {
                symbol,
                quantity,
                price,
                date,
                notes,
            },
            Commands::Remove { index } => folio::AppCommand::Remove { index },
            Commands::Transactions => folio::AppCommand::Transactions,
            Commands::Overview => folio::AppCommand::Overview,
            Commands::Performance => folio::AppCommand::Performance,
            Commands::Allocation => folio::AppCommand::Allocation,
            Commands::Technical { symbol } => folio::AppCommand::Technical { symbol },
            Commands::Sentiment { symbol } => folio::AppCommand::Sentiment { symbol },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record a buy
    Buy {
        /// Stock symbol, e.g. TCS or TCS.NS
        symbol: String,
        /// Number of shares
        quantity: i64,
        /// Price per share
        price: f64,
        /// Trade date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Free-form note stored with the transaction
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Record a sell
    Sell {
        /// Stock symbol, e.g. TCS or TCS.NS
        symbol: String,
        /// Number of shares
        quantity: i64,
        /// Price per share
        price: f64,
        /// Trade date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Free-form note stored with the transaction
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete a transaction by its list index
    Remove {
        /// Index from the transactions list
        index: usize,
    },
    /// List all recorded transactions
    Transactions,
    /// Display holdings with live prices
    Overview,
    /// Display daily portfolio value history
    Performance,
    /// Display allocation by symbol and by sector
    Allocation,
    /// Display technical indicators for a symbol
    Technical {
        /// Stock symbol, e.g. TCS or TCS.NS
        symbol: String,
    },
    /// Display news sentiment for a symbol
    Sentiment {
        /// Stock symbol, e.g. TCS or TCS.NS
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => folio::cli::setup::setup(),
        Some(cmd) => folio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
