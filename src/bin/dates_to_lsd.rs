use clap::Parser;
use env_logger::Env;
use rust_python_tree_rmse::dates::{read_named_date_rows, write_lsd};
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Convert a date table to an LSD date file: the number of rows, then one
/// `<strain>\t<decimal year>` line per row.
#[derive(Parser, Debug)]
#[command(name = "dates-to-lsd", version, about = "Date table to LSD decimal-year dates")]
struct Args {
    /// Date table with a header row naming its columns
    file_name: PathBuf,

    /// Header of the taxon column
    #[arg(long = "taxon-column", default_value = "strain")]
    taxon_column: String,

    /// Header of the date column
    #[arg(long = "date-column", default_value = "date")]
    date_column: String,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let rows = match read_named_date_rows(&args.file_name, &args.taxon_column, &args.date_column) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    let mut out = BufWriter::new(io::stdout().lock());
    if let Err(e) = write_lsd(&mut out, &rows) {
        eprintln!("Failed to write to stdout: {e}");
        std::process::exit(2);
    }
}
