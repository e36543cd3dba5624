mod action;
mod cli;
mod error;

use crate::action::conn::Connection;
use crate::cli::{Cli, Commands};
use clap::Parser;
use clap::error::ErrorKind;
use server::Config;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                println!("Incorrect command!");
                std::process::exit(1);
            }
        },
    };

    let config = Config::default();
    match Connection::open(&config.channels.query_path) {
        Ok(conn) => run_command(&conn, &config, cli.command),
        Err(_) => bootstrap(config, cli.command),
    }
}

/// No server is running yet: the parent process becomes the server
/// and the child waits for it before acting as the client.
fn bootstrap(config: Config, command: Option<Commands>) {
    if unsafe { libc::fork() } != 0 {
        if let Err(e) = server::run_blocking(config) {
            eprintln!("Server failed: {}", e);
            std::process::exit(1);
        }
    } else if command.is_some() {
        let conn = Connection::open_with_retry(&config.channels.query_path);
        run_command(&conn, &config, command);
    }
}

fn run_command(conn: &Connection, config: &Config, command: Option<Commands>) {
    println!("CLIENT");
    let Some(command) = command else {
        return;
    };
    let result = match command {
        Commands::Add { tokens } => action::add::handle_add(conn, &tokens),
        Commands::Cancel { id } => action::cancel::handle_cancel(conn, id),
        Commands::Display => {
            action::display::handle_display(conn, &config.channels.response_path)
        }
        Commands::Stop => action::stop::handle_stop(conn),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
