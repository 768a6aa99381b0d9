// src/tui.rs
use crate::app::{App, Command};
use crate::config::Config;
use crate::error::{AppResult, ClipboardError, TuiError};
use crate::host::{ClipboardWriter, Host, SystemClipboard};
use crate::models::{CredentialForm, FormField, SecretField};
use crate::notify::{Notification, Severity, Toaster};
use crate::strength::StrengthLevel;
use crate::view::{masked, ItemView};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::{stdout, Stdout};
use std::time::Duration;

const NORMAL_KEYS: &str = "(q) Quit | (j/k) Nav | (a) Add | (/) Search | (u) Copy User | (p) Copy Pass | (v) Show | (d) Del";
const ORANGE: Color = Color::Rgb(255, 165, 0);

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Adding,
    Searching,
    ConfirmDelete { id: i64, message: String },
}

/// Host for the interactive session. The confirmation modal is answered
/// before the delete command is dispatched, so `confirm` just hands the
/// recorded answer back.
struct TuiHost {
    toaster: Toaster,
    clipboard: SystemClipboard,
    confirmation: bool,
}

impl Host for TuiHost {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard.set_text(text)
    }

    fn confirm(&mut self, message: &str) -> bool {
        log::debug!("Confirmation '{}' answered {}", message, self.confirmation);
        std::mem::take(&mut self.confirmation)
    }

    fn notify(&mut self, notification: Notification) {
        self.toaster.show(notification);
    }
}

pub struct Tui {
    should_quit: bool,
    input_mode: InputMode,
    list_state: ListState,
    focused_field: usize,
    search_input: String,
    mask_char: char,
    host: TuiHost,
}

impl Tui {
    pub fn new(config: &Config) -> Self {
        Tui {
            should_quit: false,
            input_mode: InputMode::Normal,
            list_state: ListState::default(),
            focused_field: 0,
            search_input: String::new(),
            mask_char: config.mask_char,
            host: TuiHost {
                toaster: Toaster::new(config.toast_duration()),
                clipboard: SystemClipboard::default(),
                confirmation: false,
            },
        }
    }

    fn run(&mut self, app: &mut App, command: Command) {
        if let Err(e) = app.dispatch(command, &mut self.host) {
            log::error!("Command failed: {}", e);
            self.host.toaster.show(Notification::danger(format!("Error: {}", e)));
        }
        self.clamp_selection(app);
    }

    fn selected_item<'a>(&self, app: &'a App) -> Option<&'a ItemView> {
        let index = self.list_state.selected()?;
        app.view().visible_items().nth(index)
    }

    fn clamp_selection(&mut self, app: &App) {
        let visible = app.view().visible_items().count();
        let selected = match (self.list_state.selected(), visible) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(index), n) => Some(index.min(n - 1)),
        };
        self.list_state.select(selected);
    }

    fn move_selection(&mut self, app: &App, delta: i32) {
        let visible = app.view().visible_items().count();
        if visible == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as i32;
        let new_index = (current + delta).clamp(0, visible as i32 - 1);
        self.list_state.select(Some(new_index as usize));
    }

    fn focused(&self) -> FormField {
        FormField::ALL[self.focused_field]
    }

    pub fn on_key(&mut self, app: &mut App, key_event: KeyEvent) {
        let key_code = key_event.code;

        match self.input_mode.clone() {
            InputMode::Normal => match key_code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('j') | KeyCode::Down => self.move_selection(app, 1),
                KeyCode::Char('k') | KeyCode::Up => self.move_selection(app, -1),
                KeyCode::Char('a') => {
                    self.input_mode = InputMode::Adding;
                    self.focused_field = 0;
                    log::info!("Switched to InputMode::Adding");
                }
                KeyCode::Char('/') => {
                    self.input_mode = InputMode::Searching;
                    log::info!("Switched to InputMode::Searching");
                }
                KeyCode::Char('u') | KeyCode::Char('p') => {
                    let field = if key_code == KeyCode::Char('u') {
                        SecretField::Username
                    } else {
                        SecretField::Password
                    };
                    if let Some(id) = self.selected_item(app).map(|item| item.id) {
                        self.run(app, Command::CopyField { id, field });
                    }
                }
                KeyCode::Char('v') | KeyCode::Char(' ') => {
                    if let Some(id) = self.selected_item(app).map(|item| item.id) {
                        self.run(app, Command::ToggleVisibility { id });
                    }
                }
                KeyCode::Char('d') => {
                    if let Some(id) = self.selected_item(app).map(|item| item.id) {
                        if let Some(message) = app.delete_prompt(id) {
                            self.input_mode = InputMode::ConfirmDelete { id, message };
                        }
                    }
                }
                _ => {}
            },
            InputMode::Adding => {
                let field = self.focused();
                match key_code {
                    KeyCode::Char(c) => {
                        let mut value = app.form().get(field).to_string();
                        value.push(c);
                        self.run(app, Command::EditForm { field, value });
                    }
                    KeyCode::Backspace => {
                        let mut value = app.form().get(field).to_string();
                        value.pop();
                        self.run(app, Command::EditForm { field, value });
                    }
                    KeyCode::Tab | KeyCode::Down => {
                        self.focused_field = (self.focused_field + 1) % FormField::ALL.len();
                    }
                    KeyCode::BackTab | KeyCode::Up => {
                        self.focused_field = (self.focused_field + FormField::ALL.len() - 1) % FormField::ALL.len();
                    }
                    KeyCode::Enter => {
                        self.run(app, Command::AddCredential);
                        if *app.form() == CredentialForm::default() {
                            self.focused_field = 0;
                        }
                    }
                    KeyCode::Esc => {
                        self.input_mode = InputMode::Normal;
                        log::info!("Switched to InputMode::Normal via Esc from add form.");
                    }
                    _ => {}
                }
            }
            InputMode::Searching => match key_code {
                KeyCode::Char(c) => {
                    self.search_input.push(c);
                    self.run(app, Command::SetSearchTerm(self.search_input.clone()));
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                    self.run(app, Command::SetSearchTerm(self.search_input.clone()));
                }
                KeyCode::Enter => self.input_mode = InputMode::Normal,
                KeyCode::Esc => {
                    self.search_input.clear();
                    self.run(app, Command::SetSearchTerm(String::new()));
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },
            InputMode::ConfirmDelete { id, .. } => {
                self.host.confirmation = matches!(key_code, KeyCode::Char('y') | KeyCode::Char('Y'));
                self.input_mode = InputMode::Normal;
                self.run(app, Command::DeleteCredential { id });
            }
        }
    }
}

pub fn run_tui(app: &mut App, config: &Config) -> AppResult<()> {
    log::info!("Initializing TUI...");
    enable_raw_mode().map_err(|e| { log::error!("Failed to enable raw mode: {}", e); TuiError::Io(e) })?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| { log::error!("Failed to setup terminal screen: {}", e); TuiError::Io(e) })?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| { log::error!("Failed to create terminal: {}", e); TuiError::Io(e) })?;

    let mut tui = Tui::new(config);
    tui.clamp_selection(app);

    log::info!("Starting TUI application loop.");
    let res = run_app_loop(&mut terminal, &mut tui, app);
    log::info!("TUI application loop finished.");

    disable_raw_mode().map_err(|e| { log::error!("Failed to disable raw mode: {}", e); TuiError::Io(e) })?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .map_err(|e| { log::error!("Failed to restore terminal screen: {}", e); TuiError::Io(e) })?;

    res?;

    log::info!("TUI shutdown complete.");
    Ok(())
}

fn run_app_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, tui: &mut Tui, app: &mut App) -> Result<(), TuiError> {
    while !tui.should_quit {
        terminal.draw(|f| ui(f, tui, app)).map_err(|e| { log::error!("Terminal draw error: {}", e); TuiError::Io(e) })?;

        if event::poll(Duration::from_millis(100)).map_err(|e| { log::error!("Event poll error: {}", e); TuiError::Io(e) })? {
            if let Event::Key(key_event) = event::read().map_err(|e| { log::error!("Event read error: {}", e); TuiError::Io(e) })? {
                if key_event.kind == KeyEventKind::Press {
                    tui.on_key(app, key_event);
                }
            }
        }
    }
    Ok(())
}

fn strength_color(level: StrengthLevel) -> Color {
    match level {
        StrengthLevel::Weak => Color::Red,
        StrengthLevel::Medium => ORANGE,
        StrengthLevel::Strong => Color::Green,
    }
}

fn draw_search_bar(f: &mut Frame, tui: &Tui, area: Rect) {
    let searching = tui.input_mode == InputMode::Searching;
    let text = if searching {
        format!("{}▋", tui.search_input)
    } else if tui.search_input.is_empty() {
        "Press / to search".to_string()
    } else {
        tui.search_input.clone()
    };
    let style = if searching { Style::default().fg(Color::Yellow) } else { Style::default() };
    let search = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Search"));
    f.render_widget(search, area);
}

fn draw_list(f: &mut Frame, tui: &mut Tui, app: &App, area: Rect) {
    let view = app.view();
    let title = format!("Credentials ({}/{})", view.visible_items().count(), view.items.len());
    let block = Block::default().borders(Borders::ALL).title(title);

    if let Some(empty) = view.empty_state {
        let text = Paragraph::new(empty.message())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(text, area);
        return;
    }

    let list_items: Vec<ListItem> = view
        .visible_items()
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::styled(item.website.clone(), Style::default().bold()),
                Span::raw("  "),
                Span::styled(item.username.clone(), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();
    let list = List::new(list_items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut tui.list_state);
}

fn draw_details(f: &mut Frame, tui: &Tui, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let Some(item) = tui.selected_item(app) else {
        let text = Paragraph::new("Select a credential to see details.").block(block).alignment(Alignment::Center);
        f.render_widget(text, area);
        return;
    };

    let (password, toggle_hint) = if item.password_visible {
        (item.password.clone(), "(v) Hide")
    } else {
        (masked(&item.password, tui.mask_char), "(v) Show")
    };
    let detail_text = vec![
        Line::from(vec![Span::styled("Website: ", Style::default().bold()), Span::raw(item.website.as_str())]),
        Line::from(vec![Span::styled("Username: ", Style::default().bold()), Span::raw(item.username.as_str())]),
        Line::from(vec![
            Span::styled("Password: ", Style::default().bold()),
            Span::raw(password),
            Span::styled(format!("  {}", toggle_hint), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled("Logo: ", Style::default().bold()),
            Span::styled(item.logo_url.as_str(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![Span::styled("Id: ", Style::default().bold()), Span::raw(item.id.to_string())]),
    ];
    let details = Paragraph::new(detail_text).block(block).wrap(Wrap { trim: true });
    f.render_widget(details, area);
}

fn draw_status_bar(f: &mut Frame, tui: &Tui, area: Rect) {
    let (text, style) = match tui.host.toaster.visible() {
        Some(toast) => {
            let color = match toast.severity {
                Severity::Success => Color::Green,
                Severity::Danger => Color::Red,
            };
            (toast.message.clone(), Style::default().fg(Color::White).bg(color))
        }
        None => {
            let hint = match tui.input_mode {
                InputMode::Normal => NORMAL_KEYS,
                InputMode::Adding => "(Tab) Next | (Shift-Tab) Prev | (Enter) Save | (Esc) Close",
                InputMode::Searching => "(Enter) Keep filter | (Esc) Clear",
                InputMode::ConfirmDelete { .. } => "(y) Confirm | any other key cancels",
            };
            (hint.to_string(), Style::default())
        }
    };
    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, area);
}

fn draw_add_form(f: &mut Frame, tui: &Tui, app: &App) {
    let form_area = centered_rect(60, 50, f.size());
    f.render_widget(Clear, form_area);
    f.render_widget(Block::default().title("Add Credential").borders(Borders::ALL), form_area);

    let form_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(form_area);

    for (i, field) in FormField::ALL.iter().enumerate() {
        let value = app.form().get(*field);
        let mut shown = if *field == FormField::Password {
            masked(value, tui.mask_char)
        } else {
            value.to_string()
        };
        let focused = tui.focused_field == i;
        if focused {
            shown.push('▋');
        }
        let paragraph = Paragraph::new(shown)
            .block(Block::default().borders(Borders::ALL).title(field.label()))
            .style(if focused { Style::default().fg(Color::Yellow) } else { Style::default() });
        f.render_widget(paragraph, form_chunks[i]);
    }

    if let Some(strength) = app.strength() {
        let indicator = Paragraph::new(strength.label())
            .style(Style::default().fg(strength_color(strength.level)))
            .alignment(Alignment::Center);
        f.render_widget(indicator, form_chunks[3]);
    }
}

fn draw_confirm(f: &mut Frame, message: &str) {
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);
    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled("(y) Yes   (any other key) No", Style::default().fg(Color::DarkGray))),
    ];
    let prompt = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Confirm"));
    f.render_widget(prompt, area);
}

/// Renders the UI widgets based on the application mode.
fn ui(f: &mut Frame, tui: &mut Tui, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.size());
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    draw_search_bar(f, tui, chunks[0]);
    draw_list(f, tui, app, main_chunks[0]);
    draw_details(f, tui, app, main_chunks[1]);
    draw_status_bar(f, tui, chunks[2]);

    match &tui.input_mode {
        InputMode::Adding => draw_add_form(f, tui, app),
        InputMode::ConfirmDelete { message, .. } => draw_confirm(f, message),
        InputMode::Normal | InputMode::Searching => {}
    }
}

/// Helper to create a centered rect for popups.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;
    use crate::storage::MemoryStorage;
    use crate::store::CredentialStore;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(tui: &mut Tui, app: &mut App, text: &str) {
        for c in text.chars() {
            tui.on_key(app, key(KeyCode::Char(c)));
        }
    }

    fn seeded() -> (Tui, App) {
        let mut store = CredentialStore::new(Box::new(MemoryStorage::new()), "passwords");
        store
            .save(&[
                Credential {
                    id: 1,
                    website: "github.com".to_string(),
                    username: "octocat".to_string(),
                    password: "Hunter2!".to_string(),
                },
                Credential {
                    id: 2,
                    website: "example.org".to_string(),
                    username: "alice".to_string(),
                    password: "tulips".to_string(),
                },
            ])
            .unwrap();
        let config = Config::default();
        let app = App::new(store, config.favicon_url.clone());
        let mut tui = Tui::new(&config);
        tui.clamp_selection(&app);
        (tui, app)
    }

    #[test]
    fn test_add_form_flow() {
        let (mut tui, mut app) = seeded();
        tui.on_key(&mut app, key(KeyCode::Char('a')));
        assert_eq!(tui.input_mode, InputMode::Adding);
        type_text(&mut tui, &mut app, "new.site");
        tui.on_key(&mut app, key(KeyCode::Tab));
        type_text(&mut tui, &mut app, "carol");
        tui.on_key(&mut app, key(KeyCode::Tab));
        type_text(&mut tui, &mut app, "Pw1!x");
        tui.on_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.form().get(FormField::Password), "Pw1!");
        assert_eq!(app.strength().map(|s| s.level), Some(StrengthLevel::Strong));

        tui.on_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.credentials().len(), 3);
        assert_eq!(tui.focused_field, 0);
        assert_eq!(app.strength(), None);
        assert_eq!(
            tui.host.toaster.visible().map(|n| n.message.as_str()),
            Some("Credential saved successfully!")
        );
    }

    #[test]
    fn test_search_mode_filters_and_escape_clears() {
        let (mut tui, mut app) = seeded();
        tui.on_key(&mut app, key(KeyCode::Char('/')));
        type_text(&mut tui, &mut app, "ALI");
        assert_eq!(app.view().visible_items().count(), 1);
        assert_eq!(tui.selected_item(&app).map(|i| i.id), Some(2));

        tui.on_key(&mut app, key(KeyCode::Esc));
        assert_eq!(tui.input_mode, InputMode::Normal);
        assert_eq!(app.view().visible_items().count(), 2);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let (mut tui, mut app) = seeded();
        tui.on_key(&mut app, key(KeyCode::Char('d')));
        assert!(matches!(tui.input_mode, InputMode::ConfirmDelete { id: 1, .. }));
        tui.on_key(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.credentials().len(), 2);

        tui.on_key(&mut app, key(KeyCode::Char('d')));
        tui.on_key(&mut app, key(KeyCode::Char('y')));
        assert_eq!(app.credentials().len(), 1);
        assert_eq!(tui.input_mode, InputMode::Normal);
        assert_eq!(tui.selected_item(&app).map(|i| i.id), Some(2));
    }

    #[test]
    fn test_toggle_and_navigation() {
        let (mut tui, mut app) = seeded();
        tui.on_key(&mut app, key(KeyCode::Char('j')));
        tui.on_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(tui.list_state.selected(), Some(1));
        tui.on_key(&mut app, key(KeyCode::Char('v')));
        assert!(app.view().find(2).unwrap().password_visible);
        assert!(!app.view().find(1).unwrap().password_visible);
    }

    #[test]
    fn test_draws_empty_state() {
        let store = CredentialStore::new(Box::new(MemoryStorage::new()), "passwords");
        let config = Config::default();
        let app = App::new(store, config.favicon_url.clone());
        let mut tui = Tui::new(&config);

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| ui(f, &mut tui, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let rendered: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("No credentials found."));
    }
}
