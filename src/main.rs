mod app;
mod config;
mod engine;
mod event;
mod generator;
mod session;
mod store;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use ratatui::Terminal;

use app::{App, AppScreen, SETTINGS_FIELDS};
use config::Mode;
use event::{AppEvent, EventHandler};
use ui::stats_panel::StatsPanel;
use ui::typing_area::TypingArea;

#[derive(Parser)]
#[command(
    name = "wordpace",
    version,
    about = "Terminal typing trainer that targets your slowest words and word transitions"
)]
struct Cli {
    #[arg(short, long, value_enum, help = "Practice mode")]
    mode: Option<Mode>,

    #[arg(short, long, help = "Words per line")]
    words: Option<usize>,

    #[arg(short, long, help = "Focus set size")]
    focus: Option<usize>,

    #[arg(long, help = "Import a word file (txt, csv, tsv, or json array)")]
    import: Option<PathBuf>,

    #[arg(long, requires = "import", help = "Replace the vocabulary instead of merging")]
    replace: bool,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut app = App::new();

    if let Some(mode) = cli.mode {
        app.config.mode = mode;
    }
    if let Some(words) = cli.words {
        if let Err(err) = app.config.set_words_per_line(words as i64) {
            anyhow::bail!(err);
        }
    }
    if let Some(focus) = cli.focus {
        if let Err(err) = app.config.set_focus_set_size(focus as i64) {
            anyhow::bail!(err);
        }
    }
    app.apply_config_change();
    if let Some(theme_name) = cli.theme {
        if let Some(theme) = ui::theme::Theme::load(&theme_name) {
            app.theme = theme;
        }
    }
    if let Some(path) = cli.import {
        app.import_words(&path, cli.replace);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Typing => handle_typing_key(app, key),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_typing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => app.go_to_stats(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_typing(),
        KeyCode::Tab => app.go_to_settings(),
        KeyCode::Down | KeyCode::Char('j') => app.stats_select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.stats_select_prev(),
        KeyCode::Char('x') | KeyCode::Delete => app.remove_selected_word(),
        KeyCode::Char('r') => app.restore_default_vocabulary(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab | KeyCode::Char('q') => app.go_to_typing(),
        KeyCode::Up | KeyCode::Char('k') => {
            if app.settings_selected > 0 {
                app.settings_selected -= 1;
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected < SETTINGS_FIELDS - 1 {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_adjust(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_adjust(false),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Typing => render_typing(frame, app),
        AppScreen::Stats => render_stats(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn chrome(frame: &mut ratatui::Frame, app: &App, header_info: &str) -> ratatui::layout::Rect {
    let colors = &app.theme.colors;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " wordpace ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info.to_string(),
            Style::default().fg(colors.text_pending()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    if let Some(ref status) = app.status {
        let status_line = Paragraph::new(Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(colors.error()),
        )));
        frame.render_widget(status_line, layout[2]);
    }

    let hints = match app.screen {
        AppScreen::Typing => " [Tab] Stats  [Esc] Quit",
        AppScreen::Stats => " [j/k] Select  [x] Remove  [r] Restore defaults  [Tab] Settings  [Esc] Back",
        AppScreen::Settings => " [j/k] Select  [h/l] Change  [Esc] Back",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(colors.text_pending()),
    )));
    frame.render_widget(footer, layout[3]);

    layout[1]
}

fn render_typing(frame: &mut ratatui::Frame, app: &App) {
    let header_info = format!(
        " {} | {} words | focus: {}",
        app.config.mode.as_str(),
        app.profile.total_words_typed,
        app.session.focus_set().join(" "),
    );
    let main = chrome(frame, app, &header_info);

    let typing = TypingArea::new(
        app.session.lines(),
        &app.results,
        app.session.cursor(),
        &app.input,
        &app.theme,
    );
    frame.render_widget(typing, main);
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let header_info = format!(
        " statistics | {} words typed",
        app.profile.total_words_typed
    );
    let main = chrome(frame, app, &header_info);

    let rows = app.session.stats_snapshot();
    let panel = StatsPanel::new(
        &rows,
        app.stats_selected,
        app.session.pairs().len(),
        &app.theme,
    );
    frame.render_widget(panel, main);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let main = chrome(frame, app, " settings");
    let centered = ui::centered_rect(60, 80, main);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields: Vec<(&str, String)> = vec![
        ("Mode", app.config.mode.as_str().to_string()),
        ("Focus set size", app.config.focus_set_size.to_string()),
        (
            "Least-typed chance",
            format!("{}%", app.config.least_typed_sample_chance),
        ),
        ("Words per line", app.config.words_per_line.to_string()),
        (
            "Length weighting",
            if app.config.length_weighting { "on" } else { "off" }.to_string(),
        ),
    ];

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            fields
                .iter()
                .map(|_| Constraint::Length(2))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.focus()
        } else {
            colors.text_pending()
        });

        let lines = vec![Line::from(vec![
            Span::styled(format!("{indicator}{label}: "), label_style),
            Span::styled(format!("< {value} >"), value_style),
        ])];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }
}
