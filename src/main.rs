use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clusterscope::config::AppConfig;
use clusterscope::views::{ClusterSummary, SelectionQuery};
use clusterscope::{DashboardPage, DataConfig, DataContext, Selection};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "clusterscope")]
#[command(author, version, about = "Dashboard for precomputed music track clusters")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Track table CSV: one row per song with its cluster id and audio features
    #[arg(long, global = true, env = "CLUSTERSCOPE_TRACKS")]
    tracks: Option<PathBuf>,

    /// Summary table CSV: one row of feature means per cluster
    #[arg(long, global = true, env = "CLUSTERSCOPE_SUMMARY")]
    summary: Option<PathBuf>,

    /// Config file (default: ~/.config/clusterscope/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// No spinner or summary output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive dashboard (default)
    Serve {
        /// Port to listen on (default: 3002)
        #[arg(short, long)]
        port: Option<u16>,

        /// Don't open a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Write a static snapshot of the dashboard (.html or .json)
    Report {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Cluster to summarize (default: smallest id)
        #[arg(short, long)]
        cluster: Option<u32>,

        /// Feature to show in the feature table; repeatable
        #[arg(short = 'f', long = "feature")]
        features: Vec<String>,

        /// Show no features in the feature table
        #[arg(long, conflicts_with = "features")]
        no_features: bool,

        /// Open the report once written
        #[arg(long)]
        open: bool,
    },

    /// Print per-cluster counts and averages
    Clusters,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging based on verbosity
    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    let data_config = resolve_data_config(&config, args.tracks.clone(), args.summary.clone())?;
    let ctx = load_data(&data_config, args.quiet)?;

    match args.command.unwrap_or(Command::Serve { port: None, no_open: false }) {
        Command::Serve { port, no_open } => {
            let mut server = config.server.clone();
            if let Some(port) = port {
                server.port = port;
            }
            if no_open {
                server.open_browser = false;
            }
            clusterscope::serve::start(&ctx, &server, &config.display).context("server error")?;
        }

        Command::Report { output, cluster, features, no_features, open } => {
            let query = SelectionQuery::explicit(cluster, features, no_features);
            let selection = Selection::resolve(&query, &ctx.tracks.cluster_ids());
            let page = DashboardPage::render(&ctx, &selection, &config.display);

            clusterscope::report::generate(&output, &page)
                .with_context(|| format!("failed to write report {}", output.display()))?;
            if !args.quiet {
                eprintln!("\x1b[32mReport saved: {}\x1b[0m", output.display());
            }
            if open {
                if let Err(e) = open::that(&output) {
                    eprintln!("Failed to open report: {}", e);
                }
            }
        }

        Command::Clusters => print_clusters(&ctx),
    }

    Ok(())
}

/// Paths from CLI/env, then the config file, then (with `gui`) a file picker
fn resolve_data_config(
    config: &AppConfig,
    tracks: Option<PathBuf>,
    summary: Option<PathBuf>,
) -> Result<DataConfig> {
    #[cfg(feature = "gui")]
    let (tracks, summary) = {
        let tracks = tracks
            .or_else(|| config.data.track_table_path.clone())
            .or_else(|| pick_csv_gui("Select the track table (per-song clusters)"));
        let summary = summary
            .or_else(|| config.data.summary_table_path.clone())
            .or_else(|| pick_csv_gui("Select the cluster summary table"));
        (tracks, summary)
    };

    config.data_config(tracks, summary).context(
        "set --tracks and --summary, CLUSTERSCOPE_TRACKS / CLUSTERSCOPE_SUMMARY, or [data] in the config file",
    )
}

#[cfg(feature = "gui")]
fn pick_csv_gui(title: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("CSV files", &["csv"])
        .pick_file()
}

fn load_data(config: &DataConfig, quiet: bool) -> Result<DataContext> {
    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Loading {}", config.track_table_path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = DataContext::load(config);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    // Data is required for every command
    result.context("cannot start without both tables")
}

fn print_clusters(ctx: &DataContext) {
    println!(
        "{:<8} {:>8} {:>8} {:>13} {:>8}  {}",
        "CLUSTER", "SONGS", "ENERGY", "DANCEABILITY", "TEMPO", "SUMMARY"
    );
    println!("{}", "─".repeat(64));

    for cluster in ctx.tracks.cluster_ids() {
        let view = ClusterSummary::build(ctx, cluster);
        let (energy, dance, tempo) = match view.averages.ready() {
            Some(avg) => (avg.energy_display(), avg.danceability_display(), avg.tempo_display()),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        let summary = match view.means {
            clusterscope::views::MeanTable::Found { .. } => "\x1b[32m✓\x1b[0m",
            clusterscope::views::MeanTable::NotFound { .. } => "\x1b[33mmissing\x1b[0m",
        };
        println!(
            "{:<8} {:>8} {:>8} {:>13} {:>8}  {}",
            cluster, view.track_count, energy, dance, tempo, summary
        );
    }

    if ctx.summary.synthesized_cluster() {
        eprintln!("\n\x1b[33mSummary ids were inferred from row order.\x1b[0m");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_query(argv: &[&str]) -> SelectionQuery {
        match Args::try_parse_from(argv).unwrap().command {
            Some(Command::Report { cluster, features, no_features, .. }) => {
                SelectionQuery::explicit(cluster, features, no_features)
            }
            other => panic!("expected report command, got {:?}", other),
        }
    }

    #[test]
    fn test_report_without_feature_flags_uses_defaults() {
        let query = report_query(&["clusterscope", "report", "-o", "out.html"]);
        assert_eq!(Selection::resolve(&query, &[0]).features.len(), 3);
    }

    #[test]
    fn test_report_no_features_selects_none() {
        let query = report_query(&["clusterscope", "report", "-o", "out.html", "--no-features"]);
        assert!(Selection::resolve(&query, &[0]).features.is_empty());
    }

    #[test]
    fn test_report_feature_flags() {
        let query = report_query(&["clusterscope", "report", "-o", "x.json", "-c", "2", "-f", "tempo"]);
        let selection = Selection::resolve(&query, &[0, 2]);
        assert_eq!(selection.cluster, 2);
        assert_eq!(selection.features, vec![clusterscope::Feature::Tempo]);
    }

    #[test]
    fn test_no_features_conflicts_with_feature() {
        let result = Args::try_parse_from([
            "clusterscope", "report", "-o", "x.html", "-f", "tempo", "--no-features",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        assert!(Args::try_parse_from(["clusterscope"]).unwrap().command.is_none());
    }
}
