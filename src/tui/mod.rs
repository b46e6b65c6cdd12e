pub mod widgets;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{DefaultTerminal, Frame};
use tokio::runtime::Runtime;

use crate::client::{ClientState, PaletteClient};
use widgets::{PaletteCard, CARD_HEIGHT};

/// A second `d` within this window deletes the selected palette.
const CONFIRM_WINDOW: Duration = Duration::from_secs(2);
/// How long a status message stays on screen.
const MESSAGE_TTL: Duration = Duration::from_millis(1600);
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Something the board needs the server for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Refresh,
    Delete(usize),
    Export,
    Quit,
}

/// Interactive board state. Input handling is pure; [`TuiApp::perform`]
/// does the I/O.
pub struct TuiApp {
    client: PaletteClient,
    state: std::sync::Arc<ClientState>,
    selected: usize,
    pending_delete: Option<(usize, Instant)>,
    message: Option<(String, Instant)>,
    export_path: PathBuf,
}

impl TuiApp {
    pub fn new(client: PaletteClient, export_path: PathBuf) -> Self {
        let state = client.state();
        Self {
            client,
            state,
            selected: 0,
            pending_delete: None,
            message: None,
            export_path,
        }
    }

    fn len(&self) -> usize {
        self.state.palettes().len()
    }

    /// Translate a key press into a selection change or an [`Action`].
    pub fn handle_key(&mut self, code: KeyCode, now: Instant) -> Option<Action> {
        if !matches!(code, KeyCode::Char('d')) {
            self.pending_delete = None;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.len() {
                    self.selected += 1;
                }
                None
            },
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            },
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('e') => Some(Action::Export),
            KeyCode::Char('d') if self.len() > 0 => match self.pending_delete {
                Some((index, at)) if index == self.selected && now - at < CONFIRM_WINDOW => {
                    self.pending_delete = None;
                    Some(Action::Delete(index))
                },
                _ => {
                    self.pending_delete = Some((self.selected, now));
                    None
                },
            },
            _ => None,
        }
    }

    /// Run `action` against the server. Failures become status messages.
    pub fn perform(&mut self, action: Action, rt: &Runtime) {
        match action {
            Action::Refresh => {
                self.state = rt.block_on(self.client.refresh());
            },
            Action::Delete(index) => {
                let name = self
                    .state
                    .palettes()
                    .get(index)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                let result = rt.block_on(self.client.delete_at(index as i64));
                self.state = self.client.state();
                match result {
                    Ok(()) => self.notify(format!("Deleted {name}")),
                    Err(err) => self.notify(format!("Delete failed: {err}")),
                }
            },
            Action::Export => match self.client.export_to(&self.export_path) {
                Ok(()) => self.notify(format!("Exported to {}", self.export_path.display())),
                Err(err) => self.notify(format!("Export failed: {err}")),
            },
            Action::Quit => {},
        }
        self.selected = self.selected.min(self.len().saturating_sub(1));
    }

    fn notify(&mut self, message: String) {
        self.message = Some((message, Instant::now()));
    }

    /// Expire the delete confirmation and status message.
    pub fn tick(&mut self, now: Instant) {
        if matches!(self.pending_delete, Some((_, at)) if now - at >= CONFIRM_WINDOW) {
            self.pending_delete = None;
        }
        if matches!(self.message, Some((_, at)) if now - at >= MESSAGE_TTL) {
            self.message = None;
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let [header, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Koralowy", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!("  {} palettes", self.len())),
                Span::styled(
                    "   j/k move  d delete  r refresh  e export  q quit",
                    Style::default().fg(Color::DarkGray),
                ),
            ])),
            header,
        );

        self.draw_cards(frame, body);
        frame.render_widget(Paragraph::new(self.status_line()), status);
    }

    fn draw_cards(&self, frame: &mut Frame, area: Rect) {
        let palettes = self.state.palettes();
        if palettes.is_empty() {
            let text = if self.state.is_loading() {
                "Loading palettes..."
            } else {
                "No palettes yet. Add one with `koralowy add`."
            };
            frame.render_widget(Paragraph::new(text), area);
            return;
        }

        let visible = usize::from((area.height / CARD_HEIGHT).max(1));
        let first = (self.selected + 1).saturating_sub(visible);
        let pending = self.pending_delete.map(|(index, _)| index);

        for (row, (index, palette)) in palettes
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .enumerate()
        {
            let card_area = Rect {
                y: area.y + row as u16 * CARD_HEIGHT,
                height: CARD_HEIGHT,
                ..area
            };
            let card = PaletteCard::new(palette, index)
                .selected(index == self.selected)
                .confirm_delete(pending == Some(index));
            frame.render_widget(card, card_area);
        }
    }

    fn status_line(&self) -> Line<'static> {
        if let Some((message, _)) = &self.message {
            return Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Green),
            ));
        }
        if self.state.is_loading() {
            return Line::from("Loading...");
        }
        match self.state.error() {
            Some(err) => Line::from(Span::styled(
                format!("Could not reach server ({err}); showing last known palettes"),
                Style::default().fg(Color::Red),
            )),
            None => Line::default(),
        }
    }
}

/// Launch the board. Blocks until the user quits.
pub fn run(mut app: TuiApp, rt: &Runtime) -> Result<()> {
    app.perform(Action::Refresh, rt);
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app, rt);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, app: &mut TuiApp, rt: &Runtime) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key.code, Instant::now()) {
                        Some(Action::Quit) => return Ok(()),
                        Some(action) => app.perform(action, rt),
                        None => {},
                    }
                }
            }
        }
        app.tick(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_TIMEOUT;
    use crate::model::Palette;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app_with(names: &[&str]) -> TuiApp {
        let client = PaletteClient::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let mut app = TuiApp::new(client, PathBuf::from("palettes.json"));
        let palettes = names
            .iter()
            .map(|name| Palette {
                name: name.to_string(),
                colors: vec!["#8b6fff".into(), "#c47fff".into(), "#4ade80".into()],
            })
            .collect();
        app.state = std::sync::Arc::new(ClientState::loaded(palettes));
        app
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = app_with(&["A", "B"]);
        let now = Instant::now();
        app.handle_key(KeyCode::Up, now);
        assert_eq!(app.selected, 0);
        app.handle_key(KeyCode::Char('j'), now);
        app.handle_key(KeyCode::Down, now);
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn delete_needs_second_press() {
        let mut app = app_with(&["A", "B"]);
        let now = Instant::now();
        app.handle_key(KeyCode::Char('j'), now);
        assert_eq!(app.handle_key(KeyCode::Char('d'), now), None);
        assert_eq!(
            app.handle_key(KeyCode::Char('d'), now + Duration::from_millis(500)),
            Some(Action::Delete(1))
        );
    }

    #[test]
    fn delete_confirmation_expires() {
        let mut app = app_with(&["A"]);
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        assert_eq!(
            app.handle_key(KeyCode::Char('d'), now + CONFIRM_WINDOW),
            None
        );

        app.tick(now + CONFIRM_WINDOW * 3);
        assert!(app.pending_delete.is_none());
    }

    #[test]
    fn moving_cancels_pending_delete() {
        let mut app = app_with(&["A", "B"]);
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        app.handle_key(KeyCode::Char('j'), now);
        app.handle_key(KeyCode::Char('k'), now);
        assert_eq!(app.handle_key(KeyCode::Char('d'), now), None);
    }

    #[test]
    fn delete_ignored_when_empty() {
        let mut app = app_with(&[]);
        let now = Instant::now();
        assert_eq!(app.handle_key(KeyCode::Char('d'), now), None);
        assert_eq!(app.handle_key(KeyCode::Char('d'), now), None);
    }

    #[test]
    fn quit_keys() {
        let mut app = app_with(&[]);
        assert_eq!(app.handle_key(KeyCode::Char('q'), Instant::now()), Some(Action::Quit));
        assert_eq!(app.handle_key(KeyCode::Esc, Instant::now()), Some(Action::Quit));
    }

    #[test]
    fn failed_refresh_keeps_cards_and_shows_error() {
        let mut app = app_with(&["Kept"]);
        app.state = std::sync::Arc::new(app.state.failed("connection refused".into()));

        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("0: Kept"));
        assert!(text.contains("Could not reach server"));
    }

    #[test]
    fn selected_card_scrolls_into_view() {
        let names: Vec<String> = (0..10).map(|i| format!("P{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut app = app_with(&refs);
        for _ in 0..9 {
            app.handle_key(KeyCode::Down, Instant::now());
        }

        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("9: P9"));
        assert!(!text.contains("0: P0"));
    }
}
