// src/models.rs
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: i64,
    pub website: String,
    pub username: String,
    pub password: String, // stored in cleartext
}

impl Credential {
    /// Builds a record with a wall-clock id (milliseconds since the epoch).
    ///
    /// The clock alone can repeat or go backwards, so when `existing` already
    /// holds an id at or above the timestamp the new id becomes `max + 1`.
    /// If `max` is `i64::MAX`, the lowest non-negative unused id is taken.
    pub fn new(website: String, username: String, password: String, existing: &[Credential]) -> Self {
        let now = Utc::now().timestamp_millis();
        let id = match existing.iter().map(|c| c.id).max() {
            Some(max_id) if max_id >= now => max_id
                .checked_add(1)
                .unwrap_or_else(|| lowest_unused_id(existing)),
            _ => now,
        };
        Self {
            id,
            website,
            username,
            password,
        }
    }
}

fn lowest_unused_id(existing: &[Credential]) -> i64 {
    let taken: HashSet<i64> = existing.iter().map(|c| c.id).collect();
    // Found within `existing.len() + 1` steps.
    (0i64..).find(|id| !taken.contains(id)).unwrap_or(0)
}

/// Which field of a saved credential an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretField {
    Username,
    Password,
}

impl SecretField {
    pub fn label(self) -> &'static str {
        match self {
            SecretField::Username => "Username",
            SecretField::Password => "Password",
        }
    }
}

/// The three inputs of the add form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Website,
    Username,
    Password,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Website, FormField::Username, FormField::Password];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Website => "Website",
            FormField::Username => "Username",
            FormField::Password => "Password",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialForm {
    pub website: String,
    pub username: String,
    pub password: String,
}

impl CredentialForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Website => &self.website,
            FormField::Username => &self.username,
            FormField::Password => &self.password,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Website => self.website = value,
            FormField::Username => self.username = value,
            FormField::Password => self.password = value,
        }
    }

    /// Only emptiness is checked; whitespace-only input is accepted.
    pub fn is_complete(&self) -> bool {
        !self.website.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn clear(&mut self) {
        *self = CredentialForm::default();
    }
}
