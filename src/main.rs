use clap::Parser;
use env_logger::Env;
use rust_python_tree_rmse::io::TreeFormat;
use rust_python_tree_rmse::report::{ComparisonInput, run_comparison};
use std::path::PathBuf;
use std::time::Instant;

/// Compare a reconstructed tree with a ground-truth tree and print
/// `<branch_rmse>,<date_rmse>,<date_median>` on one line (date metrics are
/// `-1` unless both date tables are given).
#[derive(Parser, Debug)]
#[command(name = "tree-rmse", version, about = "Branch-length and date RMSE between two trees")]
struct Args {
    /// Comparator (reconstructed) tree, Newick or NEXUS
    path1: PathBuf,

    /// Ground-truth tree, Newick or NEXUS
    path2: PathBuf,

    /// Date table (TSV: strain, date) of the comparator
    #[arg(long = "tsv1")]
    tsv1: Option<PathBuf>,

    /// Date table (TSV: strain, date) of the ground truth
    #[arg(long = "tsv2")]
    tsv2: Option<PathBuf>,

    /// Tree file format: auto | newick | nexus
    #[arg(long = "format", value_enum, default_value_t = TreeFormat::Auto)]
    format: TreeFormat,

    /// Use TRANSLATE block to map taxon IDs to labels when available
    #[arg(long = "use-real-taxa", default_value_t = false)]
    use_real_taxa: bool,

    /// Quiet mode: only warnings and errors on stderr
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let mut input = ComparisonInput::new(&args.path1, &args.path2);
    input.format = args.format;
    input.use_real_taxa = args.use_real_taxa;
    if let (Some(tsv1), Some(tsv2)) = (&args.tsv1, &args.tsv2) {
        input = input.with_dates(tsv1, tsv2);
    } else if args.tsv1.is_some() || args.tsv2.is_some() {
        log::warn!("Both --tsv1 and --tsv2 are needed to compare dates; skipping dates");
    }

    let t0 = Instant::now();
    let report = match run_comparison(&input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    };
    log::info!("Comparison done in {:.3}s", t0.elapsed().as_secs_f64());

    println!("{report}");
}
