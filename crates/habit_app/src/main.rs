use std::process::ExitCode;

use clap::Parser;
use habit_app::{
    app::{run, AppConfig},
    cli::{Cli, Command},
    init_tracing,
};

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    config.apply_cli(&cli);

    let command = cli.command.unwrap_or(Command::List {
        days: 7,
        habit: None,
    });
    match run(config, command) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("habits: {err:#}");
            ExitCode::FAILURE
        }
    }
}
