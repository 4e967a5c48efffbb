use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::gesture::InputMode;
use crate::pyramid::MAX_ROWS;
use crate::theme::Theme;

// Slot width bounds in terminal cells
const MIN_SLOT_WIDTH: u16 = 6;
const MAX_SLOT_WIDTH: u16 = 20;

// Theme is set once at startup from config
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("Theme already initialized");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn court() -> Color { theme().court }
fn block_bg() -> Color { theme().block }
fn block_text() -> Color { theme().block_text }
fn selected() -> Color { theme().selected }
fn target() -> Color { theme().target }
fn changed() -> Color { theme().changed }
fn cursor() -> Color { theme().cursor }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }

/// Split the screen into info line, pyramid box and footer
fn main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(3),    // Pyramid
            Constraint::Length(1), // Footer
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Area inside the pyramid box border
fn pyramid_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(main_chunks(area)[1])
}

/// Screen rectangle of every slot, indexed by `position - 1`. Rows are
/// centered; slots shrink to fit wide pyramids and drop to one line tall
/// when the terminal is short.
pub fn slot_rects(area: Rect, row_count: usize) -> Vec<Rect> {
    let inner = pyramid_inner(area);
    let rows = row_count.max(1) as u16;

    let width = (inner.width / rows).clamp(MIN_SLOT_WIDTH, MAX_SLOT_WIDTH);
    let height = if inner.height >= rows * 3 { 3 } else { 1 };
    let top = inner.y + inner.height.saturating_sub(rows * height) / 2;

    let mut rects = Vec::new();
    for row in 1..=rows {
        let left = inner.x + inner.width.saturating_sub(row * width) / 2;
        let y = top + (row - 1) * height;
        for column in 0..row {
            let rect = Rect::new(left + column * width, y, width, height);
            rects.push(rect.intersection(inner));
        }
    }
    rects
}

/// Position of the slot under a terminal cell, if any
pub fn slot_at(area: Rect, row_count: usize, column: u16, row: u16) -> Option<usize> {
    slot_rects(area, row_count)
        .iter()
        .position(|rect| !rect.is_empty() && rect.contains(Position::new(column, row)))
        .map(|index| index + 1)
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let [info, pyramid, footer] = main_chunks(area);

    draw_info_line(f, app, info);
    draw_pyramid(f, app, pyramid);
    draw_footer(f, app, footer);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Rename => draw_rename_popup(f, app),
        Popup::Share => draw_share_popup(f, app),
        Popup::AddContact => draw_add_contact_popup(f, app),
        Popup::Help => draw_help_popup(f),
        Popup::Alert => draw_alert_popup(f, app),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: sharing > status message > summary
    let line = if app.is_sharing() {
        Line::from(Span::styled("Preparing...", Style::default().fg(accent())))
    } else if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(accent())))
    } else {
        let mut spans = vec![
            Span::styled(
                format!("Rows {}/{}", app.pyramid.row_count, MAX_ROWS),
                Style::default().fg(text()),
            ),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            Span::styled(format!("{} players", app.pyramid.total()), Style::default().fg(text())),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            Span::styled(
                format!("Mode: {}", app.gesture.mode().label()),
                Style::default().fg(text_dim()),
            ),
        ];
        if let Some(position) = app.gesture.selected() {
            spans.push(Span::styled(" │ ", Style::default().fg(text_dim())));
            spans.push(Span::styled(
                format!("Selected #{}", position),
                Style::default().fg(selected()),
            ));
        }
        Line::from(spans)
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_pyramid(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            " Tennis Pyramid ",
            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()))
        .style(Style::default().bg(court()));
    f.render_widget(block, area);

    let full = f.area();
    let rects = slot_rects(full, app.pyramid.row_count);
    let held = app.gesture.selected();
    let drop_target = app.gesture.target();
    let shifted = app.changed_range();

    for (index, rect) in rects.iter().enumerate() {
        if rect.is_empty() {
            continue;
        }
        let position = index + 1;
        let label = app.pyramid.label(position).unwrap_or_default();

        let bg = if held == Some(position) {
            selected()
        } else if drop_target == Some(position) {
            target()
        } else if shifted.is_some_and(|range| range.contains(&position)) {
            changed()
        } else {
            block_bg()
        };
        let is_cursor = app.cursor == position;

        let content = Line::from(vec![
            Span::styled(format!("{} ", position), Style::default().fg(court()).add_modifier(Modifier::BOLD)),
            Span::styled(label, Style::default().fg(block_text())),
        ]);

        let mut paragraph = Paragraph::new(content)
            .alignment(Alignment::Center)
            .style(Style::default().bg(bg));

        if rect.height >= 3 {
            let border = if is_cursor {
                Style::default().fg(cursor()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(court())
            };
            paragraph = paragraph.block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border),
            );
        } else if is_cursor {
            paragraph = paragraph.style(
                Style::default()
                    .bg(bg)
                    .add_modifier(Modifier::REVERSED),
            );
        }

        f.render_widget(paragraph, *rect);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let select = match app.gesture.mode() {
        InputMode::Click => "Select",
        InputMode::Drag => "Pick/Drop",
    };

    let hints: Vec<(&str, &str)> = vec![
        ("←↑↓→", "Move"),
        ("Space", select),
        ("e", "Rename"),
        ("+/-", "Rows"),
        ("s", "Share"),
        ("m", "Mode"),
        ("?", "Help"),
        ("q", "Quit"),
    ];

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else if area.width < 90 { 6 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_rename_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 80 } else { 50 }, 20, area);

    f.render_widget(Clear, popup_area);

    let input = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}_", app.input_buffer), Style::default().fg(text()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(accent())),
            Span::styled(" save │ ", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" cancel │ empty = default name", Style::default().fg(text_dim())),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(format!(" Rename #{} ", app.cursor), Style::default().fg(accent())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent())),
    );

    f.render_widget(input, popup_area);
}

fn draw_share_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 85 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Share to WhatsApp ", Style::default().fg(accent())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    f.render_widget(block, popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(popup_area);

    let size = app
        .pending_image
        .as_ref()
        .map(|p| format!("{}x{} image ready", p.image.width, p.image.height))
        .unwrap_or_default();
    let intro = Paragraph::new(Line::from(vec![
        Span::styled("Select a contact or open WhatsApp Web  ", Style::default().fg(text())),
        Span::styled(size, Style::default().fg(text_dim())),
    ]))
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(inactive())));
    f.render_widget(intro, inner[0]);

    let rows: Vec<Row> = if app.contacts.is_empty() {
        vec![Row::new(vec![
            Span::styled("  No contacts saved yet", Style::default().fg(text_dim())),
        ])]
    } else {
        app.contacts
            .contacts()
            .iter()
            .map(|contact| {
                Row::new(vec![
                    Span::styled(&contact.name, Style::default().fg(text())),
                    Span::styled(&contact.phone, Style::default().fg(text_dim())),
                ])
            })
            .collect()
    };

    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .header(Row::new(vec![
            Span::styled("Name", Style::default().fg(header())),
            Span::styled("Phone", Style::default().fg(header())),
        ]))
        .row_highlight_style(Style::default().bg(inactive()).fg(text()));

    // Keeps the selected contact scrolled into view
    let selected = (!app.contacts.is_empty()).then_some(app.selected_contact);
    let mut state = TableState::default().with_selected(selected);
    f.render_stateful_widget(table, inner[1], &mut state);

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(accent())),
        Span::raw(" send │ "),
        Span::styled("a", Style::default().fg(accent())),
        Span::raw(" add │ "),
        Span::styled("d", Style::default().fg(accent())),
        Span::raw(" delete │ "),
        Span::styled("w", Style::default().fg(accent())),
        Span::raw(" open WhatsApp Web │ "),
        Span::styled("Esc", Style::default().fg(accent())),
        Span::raw(" close"),
    ]))
    .alignment(Alignment::Center)
    .style(Style::default().fg(text_dim()));
    f.render_widget(hint, inner[2]);
}

fn draw_add_contact_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 90 } else { 50 }, 40, area);

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Add Contact ", Style::default().fg(accent())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));
    f.render_widget(block, popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(popup_area);

    let fields = [
        (" Name ", &app.input_buffer, "e.g. John"),
        (" Phone ", &app.phone_buffer, "e.g. +385991234567"),
    ];

    for (i, (title, value, placeholder)) in fields.iter().enumerate() {
        let active = app.contact_field == i;
        let border = if active { accent() } else { inactive() };
        let content = if value.is_empty() && !active {
            Span::styled(*placeholder, Style::default().fg(text_dim()))
        } else {
            let cursor = if active { "_" } else { "" };
            Span::styled(format!("{}{}", value, cursor), Style::default().fg(text()))
        };
        let input = Paragraph::new(Line::from(content)).block(
            Block::default()
                .title(Span::styled(*title, Style::default().fg(if active { accent() } else { header() })))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        f.render_widget(input, inner[i]);
    }

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("Tab", Style::default().fg(accent())),
        Span::raw(" switch field │ "),
        Span::styled("Enter", Style::default().fg(accent())),
        Span::raw(" save │ "),
        Span::styled("Esc", Style::default().fg(accent())),
        Span::raw(" back"),
    ]))
    .alignment(Alignment::Center)
    .style(Style::default().fg(text_dim()));
    f.render_widget(hint, inner[2]);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 40 { 95 } else { 80 },
        area
    );

    f.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(accent())),
            Span::raw(what),
        ])
    };
    let section = |title: &'static str| {
        Line::from(Span::styled(
            format!("═══ {} ═══", title),
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        section("Pyramid"),
        key("←/→ h/l", "Previous/next player"),
        key("↑/↓ k/j", "Row above/below"),
        key("Space", "Click mode: select, then select the new spot"),
        key("", "Drag mode: pick up, move, put down"),
        key("Mouse", "Click or drag a player onto another spot"),
        key("Esc", "Drop the selection"),
        key("e", "Rename player (empty resets to default)"),
        key("+ / -", "Add or remove the bottom row (1-10 rows)"),
        key("m", "Switch between click and drag mode"),
        Line::from(""),
        section("Moving"),
        Line::from(Span::raw("  A moved player takes the new spot; everyone in")),
        Line::from(Span::raw("  between shifts one place toward the old spot.")),
        Line::from(""),
        section("Sharing"),
        key("s", "Capture the pyramid and pick a WhatsApp contact"),
        key("Enter", "Copy the image and open the chat"),
        key("w", "Copy the image and open WhatsApp Web"),
        key("a / d", "Add or delete a contact"),
        Line::from(Span::styled(
            "  Without a clipboard the image is saved to Downloads",
            Style::default().fg(text_dim()),
        )),
        Line::from(""),
        section("Command line"),
        key("--print", "Print the pyramid as JSON"),
        key("--export", "Write the pyramid PNG to a file"),
        key("--move", "Move a player: --move 5 2"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Tennis Pyramid Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_alert_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(50, 25, f.area());

    f.render_widget(Clear, popup_area);

    let message = app
        .alert
        .as_deref()
        .unwrap_or("Could not share. Please try again or take a screenshot manually.");

    let alert = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(danger()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(accent()).add_modifier(Modifier::BOLD)),
            Span::raw(" OK"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Error ", Style::default().fg(danger())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(danger())),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(alert, popup_area);
}

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
    use crate::config::AppConfig;
    use crate::contacts::Contact;
    use crate::share::capture::PyramidImage;
    use crate::share::desktop::Desktop;
    use crate::share::ShareError;
    use crate::store::{self, MemoryStore};
    use ratatui::{backend::TestBackend, Terminal};

    struct NoDesktop;

    impl Desktop for NoDesktop {
        fn copy_image(&mut self, _image: &PyramidImage) -> Result<(), ShareError> {
            Ok(())
        }

        fn open_url(&mut self, _url: &str) -> Result<(), ShareError> {
            Ok(())
        }

        fn notify(&mut self, _message: &str) {}
    }

    #[test]
    fn test_slot_rects_are_centered_rows() {
        let area = Rect::new(0, 0, 100, 40);
        let rects = slot_rects(area, 3);
        assert_eq!(rects.len(), 6);

        // Every row shares a y and the apex sits over the middle of the base
        assert_eq!(rects[1].y, rects[2].y);
        assert!(rects[0].y < rects[1].y);
        let apex_center = rects[0].x + rects[0].width / 2;
        let base_center = (rects[3].x + rects[5].x + rects[5].width) / 2;
        assert!(apex_center.abs_diff(base_center) <= 1);
        assert_eq!(rects[0].height, 3);
    }

    #[test]
    fn test_short_terminal_uses_single_line_slots() {
        let rects = slot_rects(Rect::new(0, 0, 200, 20), 10);
        assert_eq!(rects.len(), 55);
        assert!(rects.iter().all(|r| r.height == 1));
    }

    #[test]
    fn test_share_popup_scrolls_to_selected_contact() {
        let mut store = MemoryStore::default();
        let contacts: Vec<Contact> = (1..=30)
            .map(|i| Contact {
                id: i,
                name: format!("Contact {:02}", i),
                phone: format!("+{}", i),
            })
            .collect();
        store::save_contacts(&mut store, &contacts).unwrap();

        let mut app = App::new(
            AppConfig::default(),
            Box::new(store),
            Box::new(NoDesktop),
            std::env::temp_dir(),
        );
        app.popup = Popup::Share;
        app.selected_contact = 27;

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Contact 28"));
        assert!(!screen.contains("Contact 01"));
    }

    #[test]
    fn test_slot_at_hits_each_slot() {
        let area = Rect::new(0, 0, 120, 40);
        for (i, rect) in slot_rects(area, 4).iter().enumerate() {
            assert_eq!(slot_at(area, 4, rect.x, rect.y), Some(i + 1));
        }
        assert_eq!(slot_at(area, 4, 0, 0), None);
    }
}
