use anyhow::{Context, Result};
use buoy_core::check::{
    ChangeEvent, ChangeStatus, CheckOptions, EventCallback, execute_check,
};
use buoy_core::config::MonitorConfig;
use buoy_core::report::{MonitoringReport, generate_xml_report, save_report};
use buoy_core::store::HashStore;
use buoy_probe::Prober;
use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Expand a leading tilde and return an owned path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn expand_path_in_place(path: &mut PathBuf) {
    *path = expand_path(&path.to_string_lossy());
}

/// Fold the check subcommand's flags over the loaded configuration
pub fn apply_cli_overrides(config: &mut MonitorConfig, args: &ArgMatches) {
    if let Some(output) = args.get_one::<String>("output") {
        config.report_file = expand_path(output);
    }
    if let Some(state) = args.get_one::<String>("state") {
        config.state_file = expand_path(state);
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        config.request_timeout_secs = *timeout;
    }
    if let Some(pause) = args.get_one::<u64>("pause") {
        config.pause_secs = *pause;
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().unwrap();
    let mut response = String::new();
    io::stdin().read_line(&mut response).unwrap();
    response.trim().to_lowercase()
}

pub fn handle_init(args: &ArgMatches) {
    print_divider();
    println!("{}", "  BUOY INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let config_dir_arg = args.get_one::<String>("PATH").unwrap();
    let force = args.get_flag("force");
    let config_dir = expand_path(config_dir_arg);
    let config_path = config_dir.join("buoy.toml");

    println!("{} Parsed arguments", "✓".green().bold());
    println!(
        "{} Target: {}",
        "→".blue(),
        config_dir.display().to_string().bright_white()
    );
    println!();

    if config_path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("A configuration already exists:");
        println!(
            "  {} {}",
            "•".yellow(),
            config_path.display().to_string().bright_white()
        );
        println!();
        println!("{}", "This operation will overwrite it.".yellow());

        let response = print_prompt("Do you want to continue? [y/N]:");
        println!();

        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return;
        }
        println!("{} Proceeding with overwrite", "→".yellow().bold());
        println!();
    }

    println!("{} Creating configuration directory...", "→".blue());
    fs::create_dir_all(&config_dir).expect("Failed to create config directory");
    println!(
        "  {} {}",
        "✓".green(),
        config_dir.display().to_string().bright_white()
    );

    println!("{} Writing starter configuration...", "→".blue());
    fs::write(&config_path, DEFAULT_CONFIG).expect("Failed to write configuration");
    println!(
        "  {} {}",
        "✓".green(),
        config_path.display().to_string().bright_white()
    );

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Edit the [[targets]] list in {} before your first check.",
        "ℹ".blue(),
        config_path.display().to_string().bright_white()
    );
    println!();
}

pub async fn handle_check(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let config_path = expand_path(sub_matches.get_one::<String>("config").unwrap());
    let mut config = MonitorConfig::from_file(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            config_path.display()
        )
    })?;

    expand_path_in_place(&mut config.state_file);
    expand_path_in_place(&mut config.report_file);
    apply_cli_overrides(&mut config, sub_matches);

    if !quiet {
        println!("Checking {} target(s)", config.targets.len());
        println!("State file: {}", config.state_file.display());
        println!("Report file: {}", config.report_file.display());
        println!(
            "Timeout: {}s, pause between targets: {}s\n",
            config.request_timeout_secs, config.pause_secs
        );
    }

    let store = HashStore::new(&config.state_file);
    let previous = store.load();

    let prober = Prober::with_timeout(config.request_timeout_secs);

    let event_callback: EventCallback = Arc::new(|event: &ChangeEvent| match event.status {
        ChangeStatus::Unchanged => {
            println!("{} No change for: {}", "✓".green().bold(), event.name);
        }
        ChangeStatus::Initial => {
            println!(
                "{} First check for: {} ({})",
                "→".blue().bold(),
                event.name,
                event.detail
            );
        }
        ChangeStatus::Changed => {
            println!(
                "{} Change detected on: {} ({})",
                "!".yellow().bold(),
                event.name,
                event.detail
            );
        }
        ChangeStatus::Error => {
            println!(
                "{} Error checking {} ({}): {}",
                "✗".red().bold(),
                event.name,
                event.url,
                event.error.as_deref().unwrap_or("unknown error")
            );
        }
    });

    let options = CheckOptions {
        pause: Duration::from_secs(config.pause_secs),
        show_progress: !quiet && !sub_matches.get_flag("no-progress"),
    };

    let outcome = execute_check(
        &prober,
        &config.targets,
        &previous,
        &options,
        Some(event_callback),
    )
    .await;

    store.save(&outcome.hashes).with_context(|| {
        format!("Failed to save hash store to {}", config.state_file.display())
    })?;

    let events = outcome.reportable_events().into_iter().cloned().collect();
    let report = MonitoringReport::from_events(events);
    let xml = generate_xml_report(&report)?;
    save_report(&xml, &config.report_file).with_context(|| {
        format!("Failed to write report to {}", config.report_file.display())
    })?;

    if !quiet {
        println!();
        if report.events.is_empty() {
            println!("{} {}", "✓".green().bold(), report.status);
        } else {
            println!("{} {}", "!".yellow().bold(), report.status);
        }
        println!(
            "{} Report written to {}",
            "✓".green().bold(),
            config.report_file.display()
        );
    }

    Ok(())
}
