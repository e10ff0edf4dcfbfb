//! UI rendering for the handshake walkthrough
//!
//! Layout is computed by [`Areas`] so mouse hit-testing and drawing agree
//! on where the buttons are.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
    Frame,
};
use tlsdh_core::Snapshot;

use crate::app::{App, LogLevel};
use crate::theme::ThemePalette;

const PLACEHOLDER: &str = "(not generated)";

/// Screen regions, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub narrative: Rect,
    pub body: Rect,
    pub controls: Rect,
    pub results: Rect,
    pub footer: Rect,
}

impl Areas {
    pub fn new(area: Rect, results_visible: bool) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                                   // Header
                Constraint::Length(5),                                   // Narrative
                Constraint::Min(8),                                      // Parameters + log
                Constraint::Length(3),                                   // Buttons
                Constraint::Length(if results_visible { 6 } else { 0 }), // Results
                Constraint::Length(1),                                   // Footer
            ])
            .split(area);

        Self {
            header: chunks[0],
            narrative: chunks[1],
            body: chunks[2],
            controls: chunks[3],
            results: chunks[4],
            footer: chunks[5],
        }
    }
}

/// (previous, primary) button rectangles inside the controls row.
pub fn button_areas(controls: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(21),
            Constraint::Length(2),
            Constraint::Length(29),
            Constraint::Min(0),
        ])
        .split(controls);
    (chunks[0], chunks[2])
}

pub fn draw(frame: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    let snapshot = app.handshake.snapshot();

    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base_style()), area);

    let areas = Areas::new(area, snapshot.results_visible);

    render_header(frame, app, &palette, areas.header);
    render_narrative(frame, &snapshot, &palette, areas.narrative);
    render_body(frame, app, &snapshot, &palette, areas.body);
    render_controls(frame, &snapshot, &palette, areas.controls);
    if snapshot.results_visible {
        render_results(frame, &snapshot, &palette, areas.results);
    }
    render_footer(frame, &palette, areas.footer);

    if app.show_help {
        render_help_overlay(frame, &palette);
    }
}

fn panel<'a>(title: &'a str, active: bool, palette: &ThemePalette) -> Block<'a> {
    Block::default()
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled(title, palette.title_style(active)),
            Span::raw(" "),
        ]))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border_style(active))
        .padding(Padding::horizontal(1))
        .style(palette.base_style())
}

fn render_header(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(18)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(" TLS with Fixed Diffie-Hellman", palette.title_style(true)),
        Span::styled("  step-by-step simulation", palette.muted_style()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.border_style(false))
            .style(palette.base_style()),
    );
    frame.render_widget(title, chunks[0]);

    let theme = Paragraph::new(Line::from(vec![
        Span::styled("theme ", palette.muted_style()),
        Span::styled(app.theme.name(), palette.shortcut_key()),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.border_style(false))
            .style(palette.base_style()),
    );
    frame.render_widget(theme, chunks[1]);
}

fn render_narrative(frame: &mut Frame, snapshot: &Snapshot, palette: &ThemePalette, area: Rect) {
    let text = Line::from(vec![
        Span::styled(format!("[Step {}] ", snapshot.step_number), palette.label_style()),
        Span::styled(snapshot.step.title(), palette.title_style(true)),
        Span::raw("  "),
        Span::raw(snapshot.description),
    ]);

    let narrative = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(panel("HANDSHAKE", true, palette).style(palette.panel_style()));
    frame.render_widget(narrative, area);
}

fn render_body(frame: &mut Frame, app: &App, snapshot: &Snapshot, palette: &ThemePalette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_parameters(frame, snapshot, palette, chunks[0]);
    render_log(frame, app, palette, chunks[1]);
}

fn value_span<'a>(value: Option<&'a str>, placeholder: &'a str, palette: &ThemePalette) -> Span<'a> {
    match value {
        Some(v) => Span::styled(v, palette.value_style()),
        None => Span::styled(placeholder, palette.muted_style()),
    }
}

fn render_parameters(frame: &mut Frame, snapshot: &Snapshot, palette: &ThemePalette, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Domain parameters", palette.label_style())),
        Line::from(vec![
            Span::raw("  p = "),
            Span::styled(snapshot.p.as_str(), palette.value_style()),
            Span::raw(", g = "),
            Span::styled(snapshot.g.as_str(), palette.value_style()),
        ]),
        Line::from(vec![
            Span::styled("Server fixed secret (b): ", palette.label_style()),
            Span::styled("(hidden)", palette.muted_style()),
        ]),
        Line::from(vec![
            Span::styled("Server fixed public key (B = g^b mod p): ", palette.label_style()),
            Span::styled(snapshot.server_public.as_str(), palette.value_style()),
        ]),
        Line::from(vec![
            Span::styled("Client ephemeral secret (a): ", palette.label_style()),
            value_span(snapshot.client_secret.as_deref(), PLACEHOLDER, palette),
        ]),
        Line::from(vec![
            Span::styled("Client ephemeral public key (A = g^a mod p): ", palette.label_style()),
            value_span(snapshot.client_public.as_deref(), PLACEHOLDER, palette),
        ]),
    ];

    let params = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(panel("KEYS", false, palette));
    frame.render_widget(params, area);
}

fn render_log(frame: &mut Frame, app: &App, palette: &ThemePalette, area: Rect) {
    let block = panel("ACTIVITY", false, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items: Vec<ListItem> = app
        .log
        .iter()
        .take(inner.height as usize)
        .map(|entry| {
            let style = match entry.level {
                LogLevel::Info => Style::default().fg(palette.fg),
                LogLevel::Success => palette.success_style(),
                LogLevel::Warning => palette.warning_style(),
                LogLevel::Error => palette.error_style(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(entry.timestamp.format("%H:%M:%S ").to_string(), palette.muted_style()),
                Span::styled(format!("{} ", entry.level.icon()), style),
                Span::styled(entry.message.as_str(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}

fn render_controls(frame: &mut Frame, snapshot: &Snapshot, palette: &ThemePalette, area: Rect) {
    let (previous_area, primary_area) = button_areas(area);

    let primary_label = if snapshot.primary_label == "Next step" {
        format!("{} →", snapshot.primary_label)
    } else {
        snapshot.primary_label.to_string()
    };

    render_button(frame, "← Previous step", snapshot.previous_enabled, palette, previous_area);
    render_button(frame, &primary_label, snapshot.primary_enabled, palette, primary_area);
}

fn render_button(frame: &mut Frame, label: &str, enabled: bool, palette: &ThemePalette, area: Rect) {
    let button = Paragraph::new(Line::from(label.to_string()))
        .alignment(Alignment::Center)
        .style(palette.button_style(enabled))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(palette.border_style(enabled)),
        );
    frame.render_widget(button, area);
}

fn render_results(frame: &mut Frame, snapshot: &Snapshot, palette: &ThemePalette, area: Rect) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Client computes (S = B^a mod p): ", palette.label_style()),
            value_span(snapshot.client_shared.as_deref(), "-", palette),
        ]),
        Line::from(vec![
            Span::styled("Server computes (S = A^b mod p): ", palette.label_style()),
            value_span(snapshot.server_shared.as_deref(), "-", palette),
        ]),
    ];

    match snapshot.secrets_match {
        Some(true) => lines.push(Line::from(Span::styled(
            "✔ Success! Both sides derived the same pre-master secret.",
            palette.success_style(),
        ))),
        Some(false) => lines.push(Line::from(Span::styled(
            "✘ Error! The shared secrets differ.",
            palette.error_style(),
        ))),
        None => {}
    }

    let results = Paragraph::new(lines).block(panel("PRE-MASTER SECRET", false, palette).style(palette.panel_style()));
    frame.render_widget(results, area);
}

fn render_footer(frame: &mut Frame, palette: &ThemePalette, area: Rect) {
    let shortcuts = [
        ("←/h", "Previous"),
        ("→/Enter", "Action"),
        ("r", "Restart"),
        ("t", "Theme"),
        ("F1", "Help"),
        ("q", "Quit"),
    ];

    let spans: Vec<Span> = shortcuts
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(format!("[{}]", key), palette.shortcut_key()),
                Span::styled(format!("{} ", desc), palette.shortcut_desc()),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans))
        .style(palette.panel_style())
        .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

fn render_help_overlay(frame: &mut Frame, palette: &ThemePalette) {
    let area = frame.area();

    let popup_width = 56.min(area.width.saturating_sub(4));
    let popup_height = 14.min(area.height.saturating_sub(4));
    let popup_area = Rect {
        x: (area.width - popup_width) / 2,
        y: (area.height - popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled("KEYBOARD SHORTCUTS", palette.value_style())),
        Line::from(""),
        Line::from("  Left / h / Backspace    - Previous step"),
        Line::from("  Right / l / Enter / Spc - Next step or stage action"),
        Line::from("  r                       - Restart with a new server key"),
        Line::from("  t                       - Cycle theme"),
        Line::from("  F1 / ?                  - Toggle this help"),
        Line::from("  q / Esc / Ctrl-C        - Quit"),
        Line::from(""),
        Line::from(Span::styled("Mouse: click the buttons", palette.muted_style())),
    ];

    let help = Paragraph::new(help_text).block(
        Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("HELP", palette.title_style(true)),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(palette.border_style(true))
            .style(palette.panel_style()),
    );
    frame.render_widget(help, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use ratatui::{backend::TestBackend, Terminal};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tlsdh_core::{BigUint, DomainParams, Handshake, SecretRange};

    fn app() -> App {
        let hs = Handshake::with_server_secret(
            DomainParams::toy(),
            SecretRange::default(),
            BigUint::from(6u32),
            StdRng::seed_from_u64(2),
        )
        .unwrap();
        App::new(hs, Theme::Dark)
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_initial_screen() {
        let screen = render(&app());
        assert!(screen.contains("[Step 1]"));
        assert!(screen.contains("p = 23, g = 5"));
        assert!(screen.contains("(hidden)"));
        assert!(screen.contains(PLACEHOLDER));
        assert!(screen.contains("Previous step"));
        assert!(screen.contains("Next step"));
        assert!(!screen.contains("Client computes"));
    }

    #[test]
    fn test_results_after_exchange() {
        let mut app = app();
        for _ in 0..4 {
            app.primary();
        }
        let screen = render(&app);
        assert!(screen.contains("[Step 5]"));
        assert!(screen.contains("Client computes (S = B^a mod p):"));
        assert!(screen.contains("Success!"));
        assert!(!screen.contains(PLACEHOLDER));
    }

    #[test]
    fn test_primary_label_follows_step() {
        let mut app = app();
        app.primary();
        app.primary();
        assert!(render(&app).contains("Generate ephemeral keys"));
        app.primary();
        assert!(render(&app).contains("Compute shared secret"));
    }

    #[test]
    fn test_help_overlay() {
        let mut app = app();
        app.show_help = true;
        assert!(render(&app).contains("KEYBOARD SHORTCUTS"));
    }

    #[test]
    fn test_buttons_inside_controls() {
        let areas = Areas::new(Rect::new(0, 0, 100, 40), true);
        let (previous, primary) = button_areas(areas.controls);
        assert_eq!(previous.y, areas.controls.y);
        assert!(primary.x > previous.x + previous.width - 1);
        assert_eq!(areas.results.height, 6);
        assert_eq!(Areas::new(Rect::new(0, 0, 100, 40), false).results.height, 0);
    }
}
