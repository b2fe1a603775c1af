//! TUI rendering functions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Padding, Paragraph, Row, Table, Tabs};

use crate::app::{App, COLUMNS, INFO_TAB, INFO_TEXT, TABS};

const HIGHLIGHT: Color = Color::Rgb(0x7D, 0x56, 0xF4);
const SUBTLE: Color = Color::Indexed(240);
const SELECTED_FG: Color = Color::Indexed(229);
const SELECTED_BG: Color = Color::Indexed(57);

/// Borders, header row and header underline around the table body.
const TABLE_CHROME: u16 = 4;

/// Visible table rows for a terminal `height` rows tall: one third of it
/// (at least 3), capped at `entries`.
pub fn table_viewport_height(height: u16, entries: usize) -> u16 {
    let third = (height / 3).max(3);
    let cap = u16::try_from(entries).unwrap_or(u16::MAX).max(1);
    third.min(cap)
}

/// Draw the full UI.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(2)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(3),    // Active tab body
            Constraint::Length(1), // Status line
        ])
        .split(area);

    draw_tabs(frame, app, outer[0]);
    if app.active_tab == INFO_TAB {
        draw_info(frame, outer[1]);
    } else {
        let height = (table_viewport_height(area.height, app.entries) + TABLE_CHROME).min(outer[1].height);
        let body = Rect { height, ..outer[1] };
        draw_table(frame, app, body);
    }
    draw_status_line(frame, app, outer[2]);
}

fn draw_tabs(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let tabs = Tabs::new(TABS)
        .select(app.active_tab)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(HIGHLIGHT)),
        )
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider(Span::styled("\u{2502}", Style::default().fg(HIGHLIGHT)));
    frame.render_widget(tabs, area);
}

fn draw_info(frame: &mut Frame<'_>, area: Rect) {
    let info = Paragraph::new(INFO_TEXT)
        .centered()
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
                .border_style(Style::default().fg(HIGHLIGHT))
                .padding(Padding::vertical(2)),
        );
    frame.render_widget(info, area);
}

fn draw_table(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let header = Row::new(COLUMNS.iter().map(|(title, _)| Cell::from(*title)))
        .style(Style::default().fg(Color::White))
        .bottom_margin(1);

    let rows = app
        .rows
        .iter()
        .map(|row| Row::new(row.cells().map(Cell::from)));

    let widths = COLUMNS.iter().map(|(_, width)| Constraint::Length(*width));

    let title = format!(" {} subscribed broadcasters ", app.rows.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(SUBTLE))
                .title(title),
        )
        .row_highlight_style(Style::default().fg(SELECTED_FG).bg(SELECTED_BG))
        .column_spacing(1);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_status_line(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let line = if app.status.is_empty() {
        Line::from(Span::styled(
            "tab/\u{2190}\u{2192} switch tabs \u{2022} \u{2191}\u{2193} move \u{2022} enter select \u{2022} a add \u{2022} d delete \u{2022} q quit",
            Style::default().fg(SUBTLE),
        ))
    } else {
        Line::from(Span::styled(
            app.status.as_str(),
            Style::default().fg(Color::Yellow),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}
