//! Pomo Tracker
//!
//! Monthly Pomodoro session counts over a small web API and CLI.

mod aggregation;
mod cli;
mod commands;
mod config;
mod models;
mod server;
mod storage;


fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

