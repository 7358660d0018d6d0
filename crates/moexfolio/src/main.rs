use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use jiff::civil::Date;

use moexfolio::report::{correlation_report, explorer_report};
use moexfolio::screens::{CorrelationScreen, ExplorerScreen};
use moexfolio::{
    AnalysisConfig, App, ConfigOverrides, MoexClient, Screen, analyze_correlation, collect_series,
    init_logging, resolve_seed, sample_explorer,
};

#[derive(Parser, Debug)]
#[command(name = "moexfolio")]
#[command(about = "Random portfolio explorer and correlation scanner for MOEX shares")]
struct Args {
    /// Path to the data directory (default: ~/.moexfolio/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample random portfolios and explore them on a risk/return map
    Explore(ExploreArgs),
    /// Find weakly correlated ticker pairs
    Correlate(CorrelateArgs),
}

#[derive(ClapArgs, Debug)]
struct CommonArgs {
    /// YAML file with analysis settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated tickers, e.g. SBER,GAZP,LKOH
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// First date of the price history (YYYY-MM-DD)
    #[arg(long)]
    from: Option<Date>,

    /// Last date of the price history (YYYY-MM-DD)
    #[arg(long)]
    till: Option<Date>,

    /// Print a text report instead of opening the terminal UI
    #[arg(long)]
    no_tui: bool,
}

#[derive(ClapArgs, Debug)]
struct ExploreArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of random portfolios
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Sampler seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Minimum weight for an asset to be listed in a composition
    #[arg(short, long)]
    threshold: Option<f64>,
}

#[derive(ClapArgs, Debug)]
struct CorrelateArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Report pairs whose absolute correlation is below this value
    #[arg(short, long)]
    threshold: Option<f64>,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".moexfolio")
}

fn load_config(
    path: Option<&Path>,
    defaults: fn() -> AnalysisConfig,
    overrides: &ConfigOverrides,
) -> color_eyre::Result<AnalysisConfig> {
    let mut config = match path {
        Some(path) => AnalysisConfig::load(path)?,
        None => defaults(),
    };
    config.apply(overrides);
    config.validate()?;
    Ok(config)
}

fn common_overrides(common: &CommonArgs) -> ConfigOverrides {
    ConfigOverrides {
        tickers: common.tickers.clone(),
        from: common.from,
        till: common.till,
        ..Default::default()
    }
}

/// Run the terminal UI with mouse reporting enabled for the map.
fn run_tui(screen: Screen) -> color_eyre::Result<()> {
    let mut app = App::new(screen);

    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = ratatui::run(|terminal| app.run(terminal));
    if let Err(err) = crossterm::execute!(std::io::stdout(), DisableMouseCapture) {
        tracing::error!("Failed to disable mouse capture: {err}");
    }
    result?;

    if let Err(err) = ratatui::try_restore() {
        tracing::error!("Failed to restore terminal: {err}");
    }
    Ok(())
}

fn explore(args: ExploreArgs) -> color_eyre::Result<()> {
    let overrides = ConfigOverrides {
        samples: args.samples,
        seed: args.seed,
        display_threshold: args.threshold,
        ..common_overrides(&args.common)
    };
    let config = load_config(
        args.common.config.as_deref(),
        AnalysisConfig::default,
        &overrides,
    )?;

    let client = MoexClient::from_config(&config)?;
    eprintln!(
        "Fetching {} tickers from {} to {}...",
        config.tickers.len(),
        config.start_date,
        config.end_date
    );
    let series = collect_series(&client, &config)?;

    let seed = resolve_seed(&config);
    eprintln!(
        "Sampling {} portfolios over {} tickers (seed {})...",
        config.num_portfolios,
        series.len(),
        seed
    );
    let explorer = sample_explorer(&series, &config, seed)?;

    if args.common.no_tui {
        print!("{}", explorer_report(&explorer));
        return Ok(());
    }
    run_tui(Screen::Explorer(ExplorerScreen::new(explorer)))
}

fn correlate(args: CorrelateArgs) -> color_eyre::Result<()> {
    let overrides = ConfigOverrides {
        correlation_threshold: args.threshold,
        ..common_overrides(&args.common)
    };
    let config = load_config(
        args.common.config.as_deref(),
        AnalysisConfig::for_correlation,
        &overrides,
    )?;

    let client = MoexClient::from_config(&config)?;
    eprintln!(
        "Fetching {} tickers from {} to {}...",
        config.tickers.len(),
        config.start_date,
        config.end_date
    );
    let series = collect_series(&client, &config)?;
    let analysis = analyze_correlation(&series, &config)?;

    if args.common.no_tui {
        print!("{}", correlation_report(&analysis, &config));
        return Ok(());
    }
    run_tui(Screen::Correlation(CorrelationScreen::new(
        analysis,
        config.start_date,
        config.end_date,
    )))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    let console = match &args.command {
        Command::Explore(explore_args) => explore_args.common.no_tui,
        Command::Correlate(correlate_args) => correlate_args.common.no_tui,
    };
    init_logging(&data_dir, &args.log_level, console)?;

    match args.command {
        Command::Explore(explore_args) => explore(explore_args)?,
        Command::Correlate(correlate_args) => correlate(correlate_args)?,
    }

    tracing::info!("Application shutting down");
    Ok(())
}
