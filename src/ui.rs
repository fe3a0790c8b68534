use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use speiseplan::{
    page_title, ExclusionPolicy, MenuFilter, MenuView, ProcessedMenuEntry, BR_OUTPUT,
    LOAD_ERROR_TEXT, NO_MENUES_TEXT,
};
use std::io;

pub struct App {
    /// All processed menus of the day (empty when loading failed)
    pub entries: Vec<ProcessedMenuEntry>,
    /// Indices into `entries` currently listed
    pub visible: Vec<usize>,
    pub policy: ExclusionPolicy,
    pub state: TableState,
    pub datum: NaiveDate,
    pub show_detail: bool,
    pub show_hidden: bool,
    pub load_failed: bool,
}

impl App {
    pub fn new(view: MenuView, policy: ExclusionPolicy, datum: NaiveDate) -> Self {
        let (entries, load_failed) = match view {
            MenuView::Ready(entries) => (entries, false),
            MenuView::Failed => (Vec::new(), true),
        };

        let mut app = Self {
            entries,
            visible: Vec::new(),
            policy,
            state: TableState::default(),
            datum,
            show_detail: false,
            show_hidden: false,
            load_failed,
        };
        app.refresh_visible();
        app
    }

    /// Recompute the listed rows after the hidden toggle changed
    pub fn refresh_visible(&mut self) {
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.show_hidden || self.policy.admits(e))
            .map(|(i, _)| i)
            .collect();

        if self.visible.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn toggle_hidden(&mut self) {
        self.show_hidden = !self.show_hidden;
        self.refresh_visible();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn hidden_count(&self) -> usize {
        self.entries.iter().filter(|e| !self.policy.admits(e)).count()
    }

    pub fn selected_entry(&self) -> Option<&ProcessedMenuEntry> {
        self.state
            .selected()
            .and_then(|i| self.visible.get(i))
            .and_then(|&idx| self.entries.get(idx))
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn first(&mut self) {
        if !self.visible.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        if !self.visible.is_empty() {
            self.state.select(Some(self.visible.len() - 1));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Char('h') => app.toggle_hidden(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Menus
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            page_title(app.datum),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Menüs: {}", app.entries.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("ausgeblendet: {}", app.hidden_count()),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if app.show_hidden {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("[alle]", Style::default().fg(Color::Magenta)));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Menüs ");

    if app.visible.is_empty() {
        let message = if app.load_failed { LOAD_ERROR_TEXT } else { NO_MENUES_TEXT };
        let color = if app.load_failed { Color::Red } else { Color::DarkGray };
        f.render_widget(
            Paragraph::new(format!("\n  {}", message))
                .style(Style::default().fg(color))
                .block(block),
            area,
        );
        return;
    }

    let header_cells = ["Gruppe", "Bezeichnung", "Menü"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.visible.iter().filter_map(|&idx| app.entries.get(idx)).map(|entry| {
        let style = if app.policy.admits(entry) {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        Row::new(vec![
            Cell::from(entry.menue_gruppe().to_string()),
            Cell::from(truncate(entry.bezeichnung(), 24)),
            Cell::from(truncate(&entry.processed.menue_text_with_spaces, 80)),
        ])
        .style(style)
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(26),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let status_spans = vec![
        Span::styled(
            format!(" Zeile: {}/{} ", selected, app.visible.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Details | "),
        Span::styled("h", Style::default().fg(Color::Yellow)),
        Span::raw(" Ausgeblendete | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Details ");

    let entry = match app.selected_entry() {
        Some(e) => e,
        None => {
            f.render_widget(Paragraph::new("Kein Menü ausgewählt").block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let section = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Bezeichnung: ", label),
            Span::raw(entry.bezeichnung()),
        ]),
        Line::from(vec![
            Span::styled("  Gruppe: ", label),
            Span::raw(entry.menue_gruppe().to_string()),
        ]),
    ];

    if entry.is_locked() {
        content.push(Line::from(Span::styled("  gesperrt", Style::default().fg(Color::Red))));
    }
    if let Some(keyword) = app.policy.matched_keyword(entry.bezeichnung()) {
        content.push(Line::from(Span::styled(
            format!("  ausgeblendet wegen \"{}\"", keyword),
            Style::default().fg(Color::DarkGray),
        )));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled("  MENÜ", section)));
    for line in entry.processed.menue_text_with_br.split(BR_OUTPUT) {
        content.push(Line::from(format!("  {}", line)));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled("  ZUSATZSTOFFE", section)));
    push_codes(&mut content, &entry.additives());

    content.push(Line::from(""));
    content.push(Line::from(Span::styled("  ALLERGENE", section)));
    push_codes(&mut content, &entry.allergens());

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn push_codes<'a>(content: &mut Vec<Line<'a>>, codes: &[(&str, &'static str)]) {
    if codes.is_empty() {
        content.push(Line::from(Span::styled("  keine", Style::default().fg(Color::DarkGray))));
        return;
    }
    for (code, description) in codes {
        content.push(Line::from(vec![
            Span::styled(format!("  {:>3} ", code), Style::default().fg(Color::Green)),
            Span::raw(*description),
        ]));
    }
}

/// Char-aware truncation (menu texts are full of umlauts)
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speiseplan::{process, MenuEntry};

    fn app_with(entries: &[(&str, i64, bool)]) -> App {
        let processed = entries
            .iter()
            .map(|(name, gruppe, locked)| process(&MenuEntry::new("Essen (A)[br]Beilage", name, *gruppe, *locked)))
            .collect();
        App::new(
            MenuView::Ready(processed),
            ExclusionPolicy::default(),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        )
    }

    #[test]
    fn test_hidden_entries_are_not_listed_until_toggled() {
        let mut app = app_with(&[("Menü 1", 2, false), ("Milchreis", 1, false), ("Menü 3", 1, true)]);

        assert_eq!(app.visible, vec![0]);
        assert_eq!(app.hidden_count(), 2);

        app.toggle_hidden();
        assert_eq!(app.visible, vec![0, 1, 2]);
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app_with(&[("A", 1, false), ("B", 1, false), ("C", 1, false)]);

        app.previous();
        assert_eq!(app.selected_entry().map(|e| e.bezeichnung()), Some("C"));
        app.next();
        assert_eq!(app.selected_entry().map(|e| e.bezeichnung()), Some("A"));
        app.last();
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_failed_view_has_no_rows() {
        let mut app = App::new(
            MenuView::Failed,
            ExclusionPolicy::default(),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        );

        assert!(app.load_failed);
        assert!(app.selected_entry().is_none());
        app.next();
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Käsespätzle", 20), "Käsespätzle");
        assert_eq!(truncate("Käsespätzle mit Röstzwiebeln", 10), "Käsespä...");
    }
}
