//! Plain-text reports for `--no-tui` runs.

use std::fmt::Write;

use moexfolio_core::{Explorer, PortfolioComposition};

use crate::config::AnalysisConfig;
use crate::pipeline::CorrelationAnalysis;
use crate::util::format::{format_correlation, format_percentage, format_sharpe};

/// Tickers worth buying, suggested pairs, then the period covered.
pub fn correlation_report(analysis: &CorrelationAnalysis, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    if analysis.pairs.is_empty() {
        let _ = writeln!(out, "No low-correlation pairs found to build a portfolio.");
    } else {
        let _ = writeln!(out, "Full list of tickers to buy:");
        let _ = writeln!(out, "{}", analysis.unique_tickers.join(", "));
        let _ = writeln!(out);
        let _ = writeln!(out, "Suggested portfolio pairs:");
        for pair in &analysis.pairs {
            let _ = writeln!(
                out,
                "Portfolio: {} + {} (correlation: {})",
                pair.first,
                pair.second,
                format_correlation(pair.correlation)
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "These stocks had a correlation below {} from {} to {}.",
        analysis.threshold, config.start_date, config.end_date
    );
    out
}

/// One portfolio: its statistics and the assets above the display threshold.
pub fn composition_report(title: &str, composition: &PortfolioComposition) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (portfolio #{})", title, composition.selected_index);
    let _ = writeln!(
        out,
        "  Return: {}  Risk: {}  Sharpe: {}",
        format_percentage(composition.selected_return),
        format_percentage(composition.selected_risk),
        format_sharpe(composition.selected_sharpe)
    );
    for (ticker, weight) in &composition.filtered_weights {
        let _ = writeln!(out, "  {:<6} {:>7}", ticker, format_percentage(*weight));
    }
    let hidden = composition.hidden_weight();
    if hidden > 1e-9 {
        let _ = writeln!(out, "  {:<6} {:>7}", "other", format_percentage(hidden));
    }
    out
}

/// Max-Sharpe and min-risk portfolios of a sampled buffer.
pub fn explorer_report(explorer: &Explorer) -> String {
    let buffer = explorer.buffer();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Sampled {} portfolios over {} tickers: {}",
        buffer.len(),
        buffer.tickers().len(),
        buffer.tickers().join(", ")
    );

    let extremes = [
        ("Max Sharpe ratio", buffer.max_sharpe()),
        ("Min risk", buffer.min_risk()),
    ];
    for (title, index) in extremes {
        let _ = writeln!(out);
        match index.and_then(|i| explorer.composition(i)) {
            Some(composition) => out.push_str(&composition_report(title, &composition)),
            None => {
                let _ = writeln!(out, "{}: n/a", title);
            }
        }
    }
    out
}
