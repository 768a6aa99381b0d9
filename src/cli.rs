// src/cli.rs
use crate::app::{App, Command};
use crate::config::Config;
use crate::error::{AppError, AppResult, ClipboardError};
use crate::host::{ClipboardWriter, DetachedClipboard, Host};
use crate::models::{FormField, SecretField};
use crate::notify::{Notification, Severity};
use crate::strength;
use crate::view::masked;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

/// A local credential manager: websites, usernames and passwords kept in one file.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(arg_required_else_help = false)] // Allow no subcommand to default to TUI
pub struct Cli {
    /// Path of the storage file (overrides the config file)
    #[clap(short, long, global = true, value_parser)]
    pub storage: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a new credential
    Add {
        website: String,
        username: String,
        /// Password to store; prompted for when omitted
        #[clap(short, long)]
        password: Option<String>,
    },
    /// List saved credentials
    List {
        /// Only show credentials whose text contains this term (case-insensitive)
        #[clap(short = 'q', long)]
        search: Option<String>,
        /// Print passwords instead of masking them
        #[clap(long)]
        show_passwords: bool,
    },
    /// Copy a credential's username (or password) to the clipboard
    Copy {
        id: i64,
        /// Copy the password instead of the username
        #[clap(short, long)]
        password: bool,
    },
    /// Delete a credential
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[clap(short, long)]
        yes: bool,
    },
    /// Rate a password as Weak, Medium or Strong
    Strength {
        /// Password to rate; prompted for when omitted
        password: Option<String>,
    },
    /// Launch the Terminal User Interface (TUI)
    Tui,
}

/// Terminal host for one-shot commands: stdin confirmation, stdout/stderr
/// notifications, and a clipboard whose content outlives the process.
pub struct CliHost {
    assume_yes: bool,
    clipboard: Box<dyn ClipboardWriter>,
    pub failed: bool,
}

impl CliHost {
    pub fn new(assume_yes: bool) -> Self {
        Self::with_clipboard(assume_yes, Box::new(DetachedClipboard))
    }

    pub fn with_clipboard(assume_yes: bool, clipboard: Box<dyn ClipboardWriter>) -> Self {
        Self {
            assume_yes,
            clipboard,
            failed: false,
        }
    }
}

impl Host for CliHost {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard.set_text(text)
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} (y/N): ", message);
        if let Err(e) = io::stdout().flush() {
            log::error!("Failed to flush stdout for confirmation: {}", e);
            return false;
        }
        let mut answer = String::new();
        if let Err(e) = io::stdin().read_line(&mut answer) {
            log::error!("Failed to read confirmation: {}", e);
            return false;
        }
        answer.trim().eq_ignore_ascii_case("y")
    }

    fn notify(&mut self, notification: Notification) {
        match notification.severity {
            Severity::Success => println!("{}", notification.message),
            Severity::Danger => {
                self.failed = true;
                eprintln!("{}", notification.message);
            }
        }
    }
}

fn prompt_password(prompt: &str) -> AppResult<String> {
    rpassword::prompt_password(prompt).map_err(|e| {
        log::error!("Failed to read password: {}", e);
        AppError::Cli(format!("Failed to read password: {}", e))
    })
}

/// Handles the parsed CLI command.
/// Returns `Ok(true)` if the TUI should run, `Ok(false)` if a CLI command was handled and TUI should not run.
pub fn handle_cli_command(command: Option<Commands>, app: &mut App, config: &Config) -> AppResult<bool> {
    log::debug!("Handling CLI command: {:?}", command.as_ref().map(command_name));
    match command {
        Some(Commands::Add {
            website,
            username,
            password,
        }) => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password: ")?,
            };
            let mut host = CliHost::new(false);
            for (field, value) in [
                (FormField::Website, website),
                (FormField::Username, username),
                (FormField::Password, password),
            ] {
                app.dispatch(Command::EditForm { field, value }, &mut host)?;
            }
            if let Some(rating) = app.strength() {
                println!("{}", rating.label());
            }
            app.dispatch(Command::AddCredential, &mut host)?;
            if host.failed {
                return Err(AppError::Cli("Credential was not saved.".to_string()));
            }
            if let Some(saved) = app.credentials().last() {
                println!("id: {}", saved.id);
            }
            Ok(false)
        }
        Some(Commands::List {
            search,
            show_passwords,
        }) => {
            let mut host = CliHost::new(false);
            if let Some(term) = search {
                app.dispatch(Command::SetSearchTerm(term), &mut host)?;
            }
            let view = app.view();
            if let Some(empty) = view.empty_state {
                println!("{}", empty.message());
                return Ok(false);
            }
            for item in view.visible_items() {
                let password = if show_passwords {
                    item.password.clone()
                } else {
                    masked(&item.password, config.mask_char)
                };
                println!("[{}] {}", item.id, item.website);
                println!("    username: {}", item.username);
                println!("    password: {}", password);
                println!("    logo:     {}", item.logo_url);
            }
            log::info!("Listed {} of {} credentials.", view.visible_items().count(), view.items.len());
            Ok(false)
        }
        Some(Commands::Copy { id, password }) => {
            let field = if password {
                SecretField::Password
            } else {
                SecretField::Username
            };
            if app.view().find(id).is_none() {
                return Err(AppError::Cli(format!("No credential with id {}.", id)));
            }
            let mut host = CliHost::new(false);
            app.dispatch(Command::CopyField { id, field }, &mut host)?;
            if host.failed {
                return Err(AppError::Cli(format!("Could not copy {} of credential {}.", field.label(), id)));
            }
            Ok(false)
        }
        Some(Commands::Delete { id, yes }) => {
            if app.view().find(id).is_none() {
                return Err(AppError::Cli(format!("No credential with id {}.", id)));
            }
            let mut host = CliHost::new(yes);
            app.dispatch(Command::DeleteCredential { id }, &mut host)?;
            if app.view().find(id).is_some() {
                println!("Deletion cancelled.");
                log::info!("Deletion of credential {} cancelled by user.", id);
            }
            Ok(false)
        }
        Some(Commands::Strength { password }) => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password to rate: ")?,
            };
            let rating = strength::score(&password);
            println!("{} ({}/4)", rating.label(), rating.points);
            Ok(false)
        }
        Some(Commands::Tui) => {
            log::info!("'tui' command given, preparing to launch TUI.");
            Ok(true)
        }
        None => {
            log::info!("No CLI command given, preparing to launch TUI by default.");
            Ok(true)
        }
    }
}

// Subcommand arguments may carry a password, so only the name is logged.
fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Add { .. } => "add",
        Commands::List { .. } => "list",
        Commands::Copy { .. } => "copy",
        Commands::Delete { .. } => "delete",
        Commands::Strength { .. } => "strength",
        Commands::Tui => "tui",
    }
}
