// src/view.rs
//! Display model for the credential list, independent of any terminal code.

use crate::models::Credential;

pub const DEFAULT_FAVICON_URL: &str = "https://www.google.com/s2/favicons?domain={domain}&sz=64";

/// One rendered row of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: i64,
    pub website: String,
    pub username: String,
    pub password: String,
    pub logo_url: String,
    pub password_visible: bool,
    pub hidden_by_filter: bool,
}

impl ItemView {
    /// Everything the row displays, the password included even while masked.
    pub fn text_content(&self) -> String {
        format!("{}\n{}\n{}", self.website, self.username, self.password)
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden_by_filter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoCredentials,
    NoMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoCredentials => "No credentials found.",
            EmptyState::NoMatches => "No credentials match your search.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListView {
    pub items: Vec<ItemView>,
    pub empty_state: Option<EmptyState>,
    search_term: String,
}

/// Substitutes the website into a favicon URL template containing `{domain}`.
pub fn logo_url(template: &str, website: &str) -> String {
    template.replace("{domain}", website)
}

/// One mask character per password character.
pub fn masked(password: &str, mask_char: char) -> String {
    std::iter::repeat(mask_char).take(password.chars().count()).collect()
}

/// Builds a fresh view of `credentials` in list order. Every password starts
/// masked and nothing is filtered.
pub fn render_all(credentials: &[Credential], favicon_template: &str) -> ListView {
    let items = credentials
        .iter()
        .map(|c| ItemView {
            id: c.id,
            website: c.website.clone(),
            username: c.username.clone(),
            password: c.password.clone(),
            logo_url: logo_url(favicon_template, &c.website),
            password_visible: false,
            hidden_by_filter: false,
        })
        .collect();
    let mut view = ListView {
        items,
        empty_state: None,
        search_term: String::new(),
    };
    view.update_empty_state();
    view
}

impl ListView {
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Hides every item whose text does not contain `term`, ignoring case.
    /// The items themselves are kept, so clearing the term shows them again.
    pub fn apply_filter(&mut self, term: &str) {
        self.search_term = term.to_lowercase();
        for item in &mut self.items {
            item.hidden_by_filter = !item.text_content().to_lowercase().contains(&self.search_term);
        }
        self.update_empty_state();
    }

    pub fn update_empty_state(&mut self) {
        self.empty_state = if self.items.is_empty() {
            Some(EmptyState::NoCredentials)
        } else if self.visible_items().next().is_none() {
            Some(EmptyState::NoMatches)
        } else {
            None
        };
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &ItemView> {
        self.items.iter().filter(|item| item.is_visible())
    }

    pub fn find(&self, id: i64) -> Option<&ItemView> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Flips the masked state of one item. Returns the new state, or `None`
    /// when no item has that id.
    pub fn toggle_password(&mut self, id: i64) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.password_visible = !item.password_visible;
        Some(item.password_visible)
    }
}
