// src/main.rs
mod app;
mod cli;
mod config;
mod error;
mod host;
mod models;
mod notify;
mod storage;
mod store;
mod strength;
mod tui;
mod view;

use clap::Parser;
use storage::FileStorage;
use store::CredentialStore;

fn main() -> Result<(), error::AppError> {
    env_logger::init();
    log::info!("Starting Passbook application");

    let cli_args = cli::Cli::parse();
    let config = config::load_config();

    let storage_path = cli_args.storage.clone().unwrap_or_else(|| config.resolve_storage_path());
    log::info!("Using storage file {:?}", storage_path);
    let store = CredentialStore::new(Box::new(FileStorage::new(storage_path)), config.storage_key.clone());
    let mut app = app::App::new(store, config.favicon_url.clone());

    match cli::handle_cli_command(cli_args.command, &mut app, &config) {
        Ok(true) => {
            if let Err(e) = tui::run_tui(&mut app, &config) {
                log::error!("Application TUI error: {:#?}", e);
                eprintln!("Error: {}", e);
                return Err(e);
            }
        }
        Ok(false) => log::info!("CLI command processed."),
        Err(e) => {
            log::error!("Application failed: {:#?}", e);
            eprintln!("Error: {}", e);
            return Err(e);
        }
    }

    log::info!("Passbook application finished successfully.");
    Ok(())
}
