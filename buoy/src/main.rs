use buoy::commands::command_argument_builder;
use buoy::handlers::{handle_check, handle_init};
use buoy_core::print_banner;
use colored::Colorize;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        None => {
            // No subcommand provided, just show the banner
        }
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("check", primary_command)) => {
            if let Err(e) = handle_check(primary_command, quiet).await {
                eprintln!("{} Check failed: {:#}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        }
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
