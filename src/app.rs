// src/app.rs
use crate::error::AppResult;
use crate::host::Host;
use crate::models::{Credential, CredentialForm, FormField, SecretField};
use crate::notify::Notification;
use crate::store::CredentialStore;
use crate::strength::{self, Strength};
use crate::view::{self, ListView};

/// Everything a front-end can ask of the credential list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A keystroke in one of the add-form inputs, carrying the field's new value.
    EditForm { field: FormField, value: String },
    /// Submits the add form.
    AddCredential,
    CopyField { id: i64, field: SecretField },
    ToggleVisibility { id: i64 },
    DeleteCredential { id: i64 },
    SetSearchTerm(String),
    /// Re-renders from storage without changing anything.
    Refresh,
}

/// Interaction handler. Storage stays the single source of truth: each action
/// reloads the full list, and the view is rebuilt from it after every change.
///
/// A rebuild keeps the active search term: items added or deleted while a
/// search is active stay filtered by it. Password visibility is not kept and
/// every item comes back masked.
pub struct App {
    store: CredentialStore,
    favicon_template: String,
    form: CredentialForm,
    strength: Option<Strength>,
    view: ListView,
}

impl App {
    pub fn new(store: CredentialStore, favicon_template: impl Into<String>) -> Self {
        let mut app = App {
            store,
            favicon_template: favicon_template.into(),
            form: CredentialForm::default(),
            strength: None,
            view: ListView::default(),
        };
        app.render();
        app
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    pub fn form(&self) -> &CredentialForm {
        &self.form
    }

    pub fn strength(&self) -> Option<Strength> {
        self.strength
    }

    pub fn credentials(&self) -> Vec<Credential> {
        self.store.load()
    }

    /// The question asked before deleting `id`, or `None` if it no longer exists.
    pub fn delete_prompt(&self, id: i64) -> Option<String> {
        self.store
            .load()
            .into_iter()
            .find(|c| c.id == id)
            .map(|c| format!("Delete password for {}?", c.website))
    }

    pub fn dispatch(&mut self, command: Command, host: &mut dyn Host) -> AppResult<()> {
        log::debug!("Dispatching {:?}", redacted(&command));
        match command {
            Command::EditForm { field, value } => {
                if field == FormField::Password {
                    self.strength = Some(strength::score(&value));
                }
                self.form.set(field, value);
            }
            Command::AddCredential => self.add_credential(host)?,
            Command::CopyField { id, field } => self.copy_field(id, field, host),
            Command::ToggleVisibility { id } => {
                if self.view.toggle_password(id).is_none() {
                    log::debug!("Toggle requested for unknown id {}", id);
                }
            }
            Command::DeleteCredential { id } => self.delete_credential(id, host)?,
            Command::SetSearchTerm(term) => self.view.apply_filter(&term),
            Command::Refresh => self.render(),
        }
        Ok(())
    }

    fn render(&mut self) {
        let term = self.view.search_term().to_string();
        self.view = view::render_all(&self.store.load(), &self.favicon_template);
        if !term.is_empty() {
            self.view.apply_filter(&term);
        }
    }

    fn add_credential(&mut self, host: &mut dyn Host) -> AppResult<()> {
        if !self.form.is_complete() {
            host.notify(Notification::danger("Please fill all fields."));
            return Ok(());
        }

        let mut credentials = self.store.load();
        let credential = Credential::new(
            self.form.website.clone(),
            self.form.username.clone(),
            self.form.password.clone(),
            &credentials,
        );
        log::info!("Adding credential {} for '{}'", credential.id, credential.website);
        credentials.push(credential);
        self.store.save(&credentials)?;

        self.render();
        self.form.clear();
        self.strength = None;
        host.notify(Notification::success("Credential saved successfully!"));
        Ok(())
    }

    fn copy_field(&mut self, id: i64, field: SecretField, host: &mut dyn Host) {
        let credentials = self.store.load();
        let Some(entry) = credentials.iter().find(|c| c.id == id) else {
            log::debug!("Copy requested for unknown id {}", id);
            return;
        };
        let text = match field {
            SecretField::Username => &entry.username,
            SecretField::Password => &entry.password,
        };
        match host.copy_text(text) {
            Ok(()) => {
                log::info!("Copied {} of credential {} to clipboard", field.label(), id);
                host.notify(Notification::success(format!("{} copied to clipboard!", field.label())));
            }
            Err(e) => {
                log::warn!("Copying {} of credential {} failed: {}", field.label(), id, e);
                host.notify(Notification::danger(format!("Could not copy {}.", field.label().to_lowercase())));
            }
        }
    }

    fn delete_credential(&mut self, id: i64, host: &mut dyn Host) -> AppResult<()> {
        let credentials = self.store.load();
        let Some(entry) = credentials.iter().find(|c| c.id == id) else {
            log::debug!("Delete requested for unknown id {}", id);
            return Ok(());
        };
        if !host.confirm(&format!("Delete password for {}?", entry.website)) {
            log::debug!("Delete of credential {} cancelled", id);
            return Ok(());
        }

        let remaining: Vec<Credential> = credentials.into_iter().filter(|c| c.id != id).collect();
        self.store.save(&remaining)?;
        log::info!("Deleted credential {}", id);

        self.render();
        host.notify(Notification::danger("Credential deleted."));
        Ok(())
    }
}

/// Keeps typed passwords out of debug logs.
fn redacted(command: &Command) -> Command {
    match command {
        Command::EditForm {
            field: FormField::Password,
            ..
        } => Command::EditForm {
            field: FormField::Password,
            value: "<redacted>".to_string(),
        },
        other => other.clone(),
    }
}
