use linecore::{SessionView, WINDOW_HEIGHT};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Mode};
use crate::config::{parse_color, Config};
use crate::status_manager::MessageType;
use crate::text_width::{fit_line, str_width};

const OVERWRITE_PROMPT: &str = "The file changed on disk since this session started. \
Replace it with the sampled version minus the lines you marked? \
Changes made elsewhere will be lost. (y/n)";

struct Palette {
    selected: Color,
    context: Color,
    marked: Color,
    title: Color,
}

impl Palette {
    fn from_config(config: &Config) -> Self {
        let color = |value: &str, fallback: Color| parse_color(value).unwrap_or(fallback);
        Self {
            selected: color(&config.theme.selected, Color::White),
            context: color(&config.theme.context, Color::DarkGray),
            marked: color(&config.theme.marked, Color::Red),
            title: color(&config.theme.title, Color::Yellow),
        }
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let view = app.view();
    let palette = Palette::from_config(&app.config);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                    // Title
            Constraint::Length(1),                    // Spacer
            Constraint::Length(WINDOW_HEIGHT as u16), // Window
            Constraint::Length(1),                    // Spacer
            Constraint::Length(1),                    // Key help
            Constraint::Length(1),                    // Status
            Constraint::Min(0),
        ])
        .split(f.size());

    draw_title(f, app, &view, &palette, chunks[0]);
    draw_window(f, app, &view, &palette, chunks[2]);
    draw_help_line(f, app, chunks[4]);
    draw_status(f, app, chunks[5]);

    if app.mode() == Mode::ConfirmOverwrite {
        let area = f.size();
        draw_overwrite_prompt(f, &palette, area);
    }
}

pub fn title_text(view: &SessionView) -> String {
    format!(
        "selected: {} / {}",
        view.window.selected_line, view.line_count
    )
}

fn draw_title(f: &mut Frame, app: &App, view: &SessionView, palette: &Palette, area: Rect) {
    let mut spans = vec![
        Span::styled(
            title_text(view),
            Style::default()
                .fg(palette.title)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("   marked: {}", view.marked)),
        Span::styled(
            format!("   {}", app.status.file_label()),
            Style::default().fg(palette.context),
        ),
    ];
    if app.is_dry_run() {
        spans.push(Span::styled(
            "   [dry run]",
            Style::default().fg(Color::Cyan),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// One rendered row of the window: gutter glyph, line number, clipped text.
pub fn window_rows(view: &SessionView, config: &Config, width: usize) -> Vec<(bool, bool, String)> {
    let window = &view.window;
    let number_width = view.line_count.to_string().len();
    let first_line = window.selected_line as usize - window.before.len();
    let texts = window
        .before
        .iter()
        .chain(std::iter::once(&window.selected))
        .chain(window.after.iter());

    texts
        .enumerate()
        .map(|(i, text)| {
            let marked = window.gutter.get(i).copied().unwrap_or(false);
            let is_selected = i == window.before.len();
            let glyph = if marked {
                &config.gutter.marked
            } else {
                &config.gutter.unmarked
            };
            let prefix = format!("{} {:>w$}  ", glyph, first_line + i, w = number_width);
            let available = width.saturating_sub(str_width(&prefix));
            let row = format!("{}{}", prefix, fit_line(text, config.tab_size, available));
            (is_selected, marked, row)
        })
        .collect()
}

fn draw_window(f: &mut Frame, app: &App, view: &SessionView, palette: &Palette, area: Rect) {
    let lines: Vec<Line> = window_rows(view, &app.config, area.width as usize)
        .into_iter()
        .map(|(is_selected, marked, row)| {
            let mut style = Style::default().fg(if is_selected {
                palette.selected
            } else {
                palette.context
            });
            if is_selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            if marked {
                style = style.fg(palette.marked).add_modifier(Modifier::CROSSED_OUT);
            }
            Line::from(Span::styled(row, style))
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

fn draw_help_line(f: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    };
    let spans = match app.mode() {
        Mode::ConfirmOverwrite => vec![
            key("y"),
            Span::raw(" overwrite  "),
            key("n"),
            Span::raw(" keep the file"),
        ],
        _ => vec![
            key("j/k"),
            Span::raw(" move  "),
            key("d"),
            Span::raw(" mark  "),
            key("space"),
            Span::raw(" shuffle  "),
            key("enter"),
            Span::raw(if app.is_dry_run() { " finish  " } else { " save  " }),
            key("esc"),
            Span::raw(" abort"),
        ],
    };
    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let Some(message) = app.status.current_message() else {
        return;
    };
    let color = match message.message_type {
        MessageType::Info => Color::Gray,
        MessageType::Success => Color::Green,
        MessageType::Warning => Color::Yellow,
        MessageType::Error => Color::Red,
    };
    let status = Paragraph::new(message.content.as_str()).style(Style::default().fg(color));
    f.render_widget(status, area);
}

fn draw_overwrite_prompt(f: &mut Frame, palette: &Palette, area: Rect) {
    let popup = centered_rect(60, 7, area);
    let prompt = Paragraph::new(OVERWRITE_PROMPT)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" File changed ")
                .border_style(Style::default().fg(palette.marked)),
        );
    f.render_widget(Clear, popup);
    f.render_widget(prompt, popup);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (area.width * percent_x / 100).max(20).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status_manager::StatusManager;
    use linecore::{Command, Session, SessionOptions};
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use tempfile::TempDir;

    fn open_app(dir: &TempDir, content: &str) -> App {
        let path = dir.path().join("words.txt");
        fs::write(&path, content).unwrap();
        let options = SessionOptions {
            scratch_dir: Some(dir.path().to_path_buf()),
            seed: Some(5),
        };
        let session = Session::open(&path, &options).unwrap();
        App::new(session, Config::default(), StatusManager::new("words.txt"), false)
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_window_rows_have_gutter_and_numbers() {
        let dir = TempDir::new().unwrap();
        let mut app = open_app(&dir, "one\ntwo\nthree\n");
        app.dispatch(Command::ToggleDelete);
        let view = app.view();

        let rows = window_rows(&view, &app.config, 40);
        assert_eq!(rows.len(), 3);
        let selected: Vec<_> = rows.iter().filter(|(sel, _, _)| *sel).collect();
        assert_eq!(selected.len(), 1);
        let (_, marked, row) = selected[0];
        assert!(*marked);
        assert!(row.starts_with(&format!("x {}  ", view.window.selected_line)));
        assert!(row.ends_with(&view.window.selected));
    }

    #[test]
    fn test_window_rows_clip_to_width() {
        let dir = TempDir::new().unwrap();
        let app = open_app(&dir, &format!("{}\n", "y".repeat(200)));
        let rows = window_rows(&app.view(), &app.config, 30);
        assert_eq!(str_width(&rows[0].2), 30);
    }

    #[test]
    fn test_title_and_prompt_render() {
        let dir = TempDir::new().unwrap();
        let mut app = open_app(&dir, "a\nb\nc\nd\n");
        let screen = rendered(&app, 80, 14);
        assert!(screen.contains(&title_text(&app.view())));
        assert!(screen.contains("/ 4"));

        app.dispatch(Command::ToggleDelete);
        fs::write(dir.path().join("words.txt"), "changed\n").unwrap();
        app.dispatch(Command::Commit);
        assert_eq!(app.mode(), Mode::ConfirmOverwrite);
        let screen = rendered(&app, 80, 14);
        assert!(screen.contains("File changed"));
        app.dispatch(Command::ConfirmOverwrite(false));
    }
}
