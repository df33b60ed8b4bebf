pub mod check;
pub mod config;
pub mod report;
pub mod store;

use colored::Colorize;

pub fn print_banner() {
    println!();
    println!("{}", r"      .-.      ".bright_yellow());
    println!(
        "{}  {} {}",
        r"     (   )     ".bright_yellow(),
        "buoy".bright_white().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!(
        "{}  {}",
        r"  ~~~~|_|~~~~  ".bright_blue(),
        "periodic web content change monitor".bright_black()
    );
    println!();
}
