use clap::Parser;
use env_logger::Env;
use itertools::Itertools;
use log::info;
use rust_python_tree_rmse::batch::{BATCH_HEADER, GroundTruth, read_manifest, run_batch};
use rust_python_tree_rmse::io::{TreeFormat, write_tsv};
use std::path::PathBuf;
use std::time::Instant;

/// Compare many trial outputs against one ground truth and write one TSV row
/// per trial: trial, branch_rmse, matched_nodes, date_rmse, date_median.
#[derive(Parser, Debug)]
#[command(
    name = "tree-rmse-batch",
    version,
    about = "Branch-length and date RMSE for a batch of trials"
)]
struct Args {
    /// Ground-truth tree, Newick or NEXUS
    #[arg(long = "truth-tree")]
    truth_tree: PathBuf,

    /// Ground-truth date table (TSV: strain, date)
    #[arg(long = "truth-dates")]
    truth_dates: Option<PathBuf>,

    /// Manifest TSV with a header and rows: trial, tree[, dates]
    #[arg(short = 'm', long = "manifest")]
    manifest: PathBuf,

    /// Output path for the results TSV (`.gz` compresses, `-` is stdout)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

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

fn fail(e: impl std::fmt::Display, code: i32) -> ! {
    eprintln!("{e}");
    std::process::exit(code);
}

fn main() {
    let args = Args::parse();
    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let t0 = Instant::now();
    let trials = read_manifest(&args.manifest).unwrap_or_else(|e| fail(&e, e.exit_code()));
    let truth = GroundTruth::load(
        &args.truth_tree,
        args.truth_dates.as_ref(),
        args.format,
        args.use_real_taxa,
    )
    .unwrap_or_else(|e| fail(&e, e.exit_code()));
    info!(
        "Read ground truth ({} signatures) and {} trials in {:.3}s",
        truth.index.len(),
        trials.len(),
        t0.elapsed().as_secs_f64()
    );

    let t1 = Instant::now();
    let results = run_batch(&trials, &truth, args.format, args.use_real_taxa);

    let failed = results.iter().filter_map(|r| r.as_ref().err()).collect_vec();
    if let Some(first) = failed.first() {
        let summary = failed
            .iter()
            .map(|f| format!("trial {}: {}", f.name, f.message))
            .join("\n");
        fail(summary, first.exit_code);
    }
    let rows = results.into_iter().flatten().collect_vec();
    info!("Compared {} trials in {:.3}s", rows.len(), t1.elapsed().as_secs_f64());

    if let Err(e) = write_tsv(&args.output, &BATCH_HEADER, &rows) {
        fail(format!("Failed to write output {:?}: {e}", args.output), 2);
    }
}
