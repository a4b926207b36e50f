//! `catalog reconcile | headers | stats | config`: replay a submission log.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use catalog_recon::config::BUILTIN_TOML;
use catalog_recon::header::Resolution;
use catalog_recon::{
    compute_stats, load_csv_headers, load_csv_rows, RawRow, ReconConfig, ReconResult, Reconciler,
};

use crate::exit_codes::{EXIT_ERROR, EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_REJECTED_ROWS, EXIT_USAGE};
use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a header config without running
    #[command(after_help = "\
Examples:
  catalog config validate form.headers.toml")]
    Validate {
        /// Path to the .headers.toml config file
        config: PathBuf,
    },

    /// Print the built-in header config (a starting point for custom ones)
    Show,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// Read a file, reporting a missing path as a usage error.
fn read_input(path: &Path, what: &str, code: u8) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            recon_err(EXIT_USAGE, format!("{what} not found: {}", path.display()))
        } else {
            recon_err(code, format!("cannot read {}: {e}", path.display()))
        }
    })
}

/// Load the config at `path`, or the built-in tables when none is given.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let config = match path {
        Some(path) => {
            let config_str = read_input(path, "config", EXIT_INVALID_CONFIG)?;
            ReconConfig::from_toml(&config_str)
        }
        None => ReconConfig::builtin(),
    };
    config.map_err(|e| recon_err(EXIT_INVALID_CONFIG, e.to_string()))
}

fn load_log(path: &Path) -> Result<Vec<RawRow>, CliError> {
    let csv_data = read_input(path, "submission log", EXIT_INPUT)?;
    let rows = load_csv_rows(&csv_data).map_err(|e| {
        recon_err(EXIT_INPUT, format!("{}: {e}", path.display()))
            .with_hint("export the form responses as CSV with the header row included")
    })?;
    log::debug!("loaded {} submission(s) from {}", rows.len(), path.display());
    Ok(rows)
}

fn write_json(
    value: &impl serde::Serialize,
    json_output: bool,
    output_file: Option<&Path>,
) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| recon_err(EXIT_INPUT, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }
    Ok(())
}

// ============================================================================
// reconcile
// ============================================================================

pub fn cmd_reconcile(
    log_path: PathBuf,
    config_path: Option<PathBuf>,
    json_output: bool,
    output_file: Option<PathBuf>,
    explain: bool,
    strict: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let rows = load_log(&log_path)?;

    let result = catalog_recon::run(&config, &rows, explain)
        .map_err(|e| recon_err(EXIT_INVALID_CONFIG, e.to_string()))?;

    write_json(&result, json_output, output_file.as_deref())?;

    // Human summary to stderr
    eprintln!("{}", summary_line(&result));
    if explain && !json_output {
        if let Some(rejections) = &result.rejections {
            for r in rejections {
                eprintln!("  row {:>4}: {} ({})", r.row, r.reason, display_url(&r.url));
            }
        }
    }

    if strict && result.summary.rejected > 0 {
        return Err(recon_err(
            EXIT_REJECTED_ROWS,
            format!("{} submission(s) rejected (--strict)", result.summary.rejected),
        )
        .with_hint("re-run with --explain to see why each row was rejected"));
    }

    Ok(())
}

fn summary_line(result: &ReconResult) -> String {
    let s = &result.summary;
    let mut line = format!(
        "reconciled {} row(s): {} resource(s), {} owner(s), {} deletion(s) applied, {} rejected",
        s.rows_read, s.resources, s.owners, s.deletion_cutoffs, s.rejected,
    );
    if !s.rejection_counts.is_empty() {
        let parts: Vec<String> = s
            .rejection_counts
            .iter()
            .map(|(reason, n)| format!("{reason}={n}"))
            .collect();
        line.push_str(&format!(" [{}]", parts.join(", ")));
    }
    line
}

fn display_url(url: &str) -> &str {
    if url.is_empty() {
        "no url"
    } else {
        url
    }
}

// ============================================================================
// headers
// ============================================================================

pub fn cmd_headers(log_path: PathBuf, config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let csv_data = read_input(&log_path, "submission log", EXIT_INPUT)?;
    let headers = load_csv_headers(&csv_data).map_err(|e| {
        recon_err(EXIT_INPUT, format!("{}: {e}", log_path.display()))
            .with_hint("export the form responses as CSV with the header row included")
    })?;
    let reconciler = Reconciler::new(&config);

    let mut dropped = 0;
    for header in &headers {
        let shown = header.split_whitespace().collect::<Vec<_>>().join(" ");
        let shown = truncate(&shown, 60);
        match reconciler.normalizer().resolve_detailed(header) {
            Resolution::Exact { field } => println!("{field:<18} exact      {shown}"),
            Resolution::Heuristic { field, rule } => {
                println!("{field:<18} rule #{rule:<3} {shown}")
            }
            Resolution::Unrecognized => {
                dropped += 1;
                println!("{:<18} dropped    {shown}", "-")
            }
        }
    }

    if dropped > 0 {
        eprintln!("{dropped} column(s) not mapped to any field");
    }
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ============================================================================
// stats
// ============================================================================

pub fn cmd_stats(
    log_path: PathBuf,
    config_path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let rows = load_log(&log_path)?;
    let catalog = Reconciler::new(&config).reconcile(&rows);
    let stats = compute_stats(&catalog.resources);

    if json_output {
        return write_json(&stats, true, None);
    }

    println!("resources: {}", stats.total_resources);
    let sections = [
        ("platform", &stats.by_platform),
        ("license", &stats.by_license),
        ("resource type", &stats.by_resource_type),
        ("level", &stats.by_level),
        ("area", &stats.by_area),
    ];
    for (title, counts) in sections {
        if counts.is_empty() {
            continue;
        }
        println!("\n{title}:");
        let mut entries: Vec<_> = counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (value, n) in entries {
            println!("  {n:>5}  {value}");
        }
    }
    Ok(())
}

// ============================================================================
// config
// ============================================================================

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { config } => {
            let parsed = load_config(Some(&config))?;
            eprintln!(
                "valid: '{}' with {} known header(s), {} rule(s), {} timestamp format(s)",
                parsed.name,
                parsed.headers.len(),
                parsed.rules.len(),
                parsed.timestamps.formats.len(),
            );
            Ok(())
        }
        ConfigCommands::Show => {
            print!("{BUILTIN_TOML}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("Licencia", 60), "Licencia");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("título", 3), "tí…");
    }

    #[test]
    fn missing_config_is_usage_error() {
        let err = load_config(Some(Path::new("/nonexistent/form.headers.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }

    #[test]
    fn builtin_config_when_no_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.name, "catalogo-recursos");
    }

    #[test]
    fn empty_url_is_labelled() {
        assert_eq!(display_url(""), "no url");
        assert_eq!(display_url("https://x"), "https://x");
    }
}
