//! CLI binary entry point for tabular-import-cli

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tabular_import_sdk::cli::commands::import::{
    ImportDirArgs, ImportFileArgs, handle_import_dir, handle_import_file,
};
#[cfg(feature = "cli")]
use tabular_import_sdk::cli::commands::query::{
    PointArgs, RangeArgs, ShowTableArgs, SumArgs, handle_list_tables, handle_point, handle_range,
    handle_show_table, handle_sum,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tabular-import-cli")]
#[command(about = "Import CSV/XLS files into an embedded SQL store and query them by time")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Import a single CSV or XLS file into one table
    ImportFile {
        /// Source file
        file: PathBuf,
        /// Target table name (default: derived from the file name)
        #[arg(short, long)]
        table: Option<String>,
        /// Store database file (default: configured store)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Replace an existing table instead of appending
        #[arg(short, long)]
        replace: bool,
        /// Rows per insert batch
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Import every CSV/XLS file in a directory, one table per file
    ImportDir {
        /// Source directory
        directory: PathBuf,
        /// Store database file (default: configured store)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Replace existing tables instead of appending
        #[arg(short, long)]
        replace: bool,
    },
    /// Show the first rows of a table
    ShowTable {
        /// Table name
        table: String,
        /// Maximum rows to display
        #[arg(long, default_value_t = 100)]
        max_rows: usize,
        /// Store database file (default: configured store)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Output format: table, json or csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// List all tables in the store
    ListTables {
        /// Store database file (default: configured store)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Row with the greatest timestamp at or before the given one
    Point {
        /// Table name
        table: String,
        /// Timestamp column
        column: String,
        /// Lookup timestamp, e.g. "2005-01-01 16:30:00"
        at: String,
        /// Store database file (default: configured store)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// All rows inside an inclusive timestamp window, ascending
    Range {
        /// Table name
        table: String,
        /// Timestamp column
        column: String,
        /// Window start (inclusive)
        start: String,
        /// Window end (inclusive)
        end: String,
        /// Store database file (default: configured store)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Output format: table, json or csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// Sum a numeric column over an inclusive timestamp window
    Sum {
        /// Table name
        table: String,
        /// Timestamp column
        timestamp_column: String,
        /// Numeric column to sum
        value_column: String,
        /// Window start (inclusive)
        start: String,
        /// Window end (inclusive)
        end: String,
        /// Store database file (default: configured store)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::ImportFile {
            file,
            table,
            store,
            replace,
            batch_size,
        } => handle_import_file(&ImportFileArgs {
            file,
            table,
            store,
            replace,
            batch_size,
        }),
        Commands::ImportDir {
            directory,
            store,
            replace,
        } => handle_import_dir(&ImportDirArgs {
            directory,
            store,
            replace,
        }),
        Commands::ShowTable {
            table,
            max_rows,
            store,
            format,
        } => handle_show_table(&ShowTableArgs {
            table,
            max_rows,
            store,
            format,
        }),
        Commands::ListTables { store } => handle_list_tables(&store),
        Commands::Point {
            table,
            column,
            at,
            store,
        } => handle_point(&PointArgs {
            table,
            column,
            at,
            store,
        }),
        Commands::Range {
            table,
            column,
            start,
            end,
            store,
            format,
        } => handle_range(&RangeArgs {
            table,
            column,
            start,
            end,
            store,
            format,
        }),
        Commands::Sum {
            table,
            timestamp_column,
            value_column,
            start,
            end,
            store,
        } => handle_sum(&SumArgs {
            table,
            timestamp_column,
            value_column,
            start,
            end,
            store,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
