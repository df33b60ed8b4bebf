use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("buoy")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("buoy")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a starter buoy configuration to your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to hold the buoy configuration")
                        .default_value("~/.config/buoy/"),
                )
                .arg(
                    arg!(-f - -"force")
                        .help(
                            "Forces the overwriting of any existing configuration at the \
                        specified location.",
                        )
                        .required(false),
                ),
        )
        .subcommand(
            command!("check")
                .about(
                    "Runs one monitoring pass over the configured targets and writes the \
                XML change report.",
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to the buoy configuration file")
                        .default_value("~/.config/buoy/buoy.toml"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the XML report to this path (overrides the config)"),
                )
                .arg(
                    arg!(--"state" <PATH>)
                        .required(false)
                        .help("Read and write the hash store at this path (overrides the config)"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds (overrides the config)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"pause" <SECONDS>)
                        .required(false)
                        .help("Pause after each target in seconds (overrides the config)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the progress spinner")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
