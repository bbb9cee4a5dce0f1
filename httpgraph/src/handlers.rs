use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use httpgraph_core::session::{DEFAULT_SIZE_MAX, DEFAULT_SIZE_MIN};
use httpgraph_core::{
    BuilderOptions, GraphSummary, LayoutOptions, LayoutState, Rgb, Session,
    SessionOptions, SizeMode,
};
use httpgraph_layout::SettingsOverrides;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Frame cadence for the live loop
const FRAME: Duration = Duration::from_millis(16);
const LINE_QUEUE: usize = 1024;

pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_banner() {
    println!(
        "{} {}",
        "httpgraph".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "HTTP activity, one edge at a time".bright_black());
    println!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            debug!("Could not expand {}: {}", raw, e);
            PathBuf::from(shellexpand::tilde(raw).as_ref())
        }
    }
}

/// Read a records file into lines, dropping blank ones
pub fn read_record_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file {}", path.display()))?;

    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        bail!("No records found in {}", path.display());
    }
    Ok(lines)
}

/// Layout overrides from `--settings`, or none
pub fn load_settings(path: Option<&str>) -> Result<SettingsOverrides> {
    let Some(raw) = path else {
        return Ok(SettingsOverrides::default());
    };
    let path = expand_path(raw);
    SettingsOverrides::from_file(&path)
        .with_context(|| format!("Failed to load layout settings from {}", path.display()))
}

fn session_options(args: &ArgMatches) -> Result<SessionOptions> {
    let overrides = load_settings(args.get_one::<String>("settings").map(String::as_str))?;
    Ok(SessionOptions {
        builder: BuilderOptions {
            include_ip: args.get_flag("ip"),
            include_params: args.get_flag("params"),
            ..Default::default()
        },
        layout: LayoutOptions {
            use_worker: !args.get_flag("no-worker"),
            overrides,
        },
        ..Default::default()
    })
}

fn size_mode(args: &ArgMatches) -> SizeMode {
    args.get_one::<String>("size-mode")
        .and_then(|m| m.parse().ok())
        .unwrap_or_default()
}

pub fn format_summary(summary: &GraphSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Nodes: {}\n", summary.nodes));
    for (node_type, count) in &summary.nodes_by_type {
        if *count > 0 {
            out.push_str(&format!("    {:<9} {}\n", node_type.as_str(), count));
        }
    }
    out.push_str(&format!("  Edges: {}\n", summary.edges));
    out.push_str(&format!("  Domains colored: {}\n", summary.domains_colored));
    if summary.skipped_json > 0 || summary.skipped_url > 0 {
        out.push_str(&format!(
            "  Skipped: {} malformed, {} unusable URL\n",
            summary.skipped_json, summary.skipped_url
        ));
    }
    out
}

fn print_summary(summary: &GraphSummary) {
    print_divider();
    println!("{}", "  GRAPH SUMMARY".bright_white().bold());
    print_divider();
    print!("{}", format_summary(summary));
    println!();
}

fn swatch(color: Rgb) -> colored::ColoredString {
    "●".truecolor(color.0, color.1, color.2)
}

fn print_domains(session: &Session) {
    for domain in session.domains() {
        if let Some(color) = session.graph().palette().get(domain) {
            println!("  {} {}", swatch(color), domain);
        }
    }
    println!();
}

// ============================================================================
// build
// ============================================================================

pub async fn handle_build(args: &ArgMatches, quiet: bool) -> Result<()> {
    let input = args
        .get_one::<String>("input")
        .context("--input is required")?;
    let path = expand_path(input);
    let lines = read_record_lines(&path)?;
    let mut session = Session::new(session_options(args)?);

    let bar = ProgressBar::new(lines.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg:<10} [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    if quiet {
        bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    bar.set_message("records");
    let summary = session.load_records(lines.iter().inspect(|_| bar.inc(1)));
    session.set_size_mode(size_mode(args), DEFAULT_SIZE_MIN, DEFAULT_SIZE_MAX);

    match args.get_one::<String>("arrange").map(String::as_str) {
        Some("circular") => session.arrange_circular(),
        Some("hierarchical") => session.arrange_hierarchical(),
        _ => {
            let batches = args.get_one::<usize>("iterations").copied().unwrap_or(100);
            run_layout(&mut session, batches, &bar).await;
        }
    }
    bar.finish_and_clear();

    if !quiet {
        print_summary(&summary);
        print_domains(&session);
    }
    Ok(())
}

async fn run_layout(session: &mut Session, batches: usize, bar: &ProgressBar) {
    if session.graph().is_empty() || batches == 0 {
        return;
    }

    bar.set_message("layout");
    bar.set_length(batches as u64);
    bar.set_position(0);

    session.start_layout();
    let mut done = 0;
    while done < batches {
        if session.tick(Instant::now()).positions_changed {
            done += 1;
            bar.inc(1);
        } else {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        if session.layout_state() == LayoutState::Idle {
            warn!("Layout stopped unexpectedly after {} batches", done);
            break;
        }
    }
    session.stop_layout();
    session.kill_layout();
    debug!("Layout finished after {} batches", done);
}

// ============================================================================
// live
// ============================================================================

pub async fn handle_live(args: &ArgMatches, quiet: bool) -> Result<()> {
    let mut session = Session::new(session_options(args)?);
    let mode = size_mode(args);
    session.start_live();
    session.set_size_mode(mode, DEFAULT_SIZE_MIN, DEFAULT_SIZE_MAX);
    session.start_layout();

    let (tx, mut rx) = mpsc::channel::<String>(LINE_QUEUE);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    if !quiet {
        println!(
            "{} Reading records from stdin (Ctrl-C to stop)",
            "→".blue()
        );
    }

    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => {
                    session.ingest_line(&line);
                }
                None => break,
            },
            _ = frames.tick() => {
                let update = session.tick(Instant::now());
                if update.refresh_due && !quiet {
                    let (nodes, edges) = session.visible_counts();
                    println!(
                        "{} {} nodes, {} edges",
                        "↻".cyan(),
                        nodes.to_string().bright_white(),
                        edges.to_string().bright_white()
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    reader.abort();
    session.stop_layout();
    session.kill_layout();
    // Pick up nodes added since the last refresh
    session.set_size_mode(mode, DEFAULT_SIZE_MIN, DEFAULT_SIZE_MAX);

    if !quiet {
        println!();
        print_summary(&session.summary());
        print_domains(&session);
    }
    Ok(())
}
