use crate::grid::models::CellRef;
use crate::grid::palette::BoxColor;
use crate::tui::app::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Grid
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);
    draw_grid(frame, chunks[1], app);
    draw_footer(frame, chunks[2], app);

    if app.help_mode {
        draw_help_window(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let grid = app.session.grid();
    let header_text = format!(
        "Box Grid - {} rows x {} columns, {} boxes",
        grid.row_count(),
        grid.columns(),
        grid.box_count()
    );
    let header = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::ALL).title("Grid"))
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(header, area);
}

fn draw_grid(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default().borders(Borders::ALL).title("Boxes");
    app.grid_area = block.inner(area);
    frame.render_widget(block, area);

    let grid = app.session.grid();
    for (r, row) in grid.rows.iter().enumerate() {
        for (c, slot) in row.cells.iter().enumerate() {
            let cell = CellRef::new(r, c);
            let Some(rect) = app.cell_rect(cell) else {
                continue;
            };

            let is_cursor = cell == app.cursor;
            let is_source = app.drag.source() == Some(cell);
            let is_target = app.drag.is_dragging() && app.drag.target() == Some(cell);

            let border_style = if is_target {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if is_cursor {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let border_type = if is_source {
                BorderType::Double
            } else if is_cursor || is_target {
                BorderType::Thick
            } else {
                BorderType::Plain
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(border_style);

            let paragraph = match slot {
                Some(grid_box) => {
                    let mut style = Style::default()
                        .bg(to_color(grid_box.color))
                        .fg(label_color(grid_box.color))
                        .add_modifier(Modifier::BOLD);
                    if is_source {
                        style = style.add_modifier(Modifier::DIM);
                    }
                    Paragraph::new(grid_box.id.to_string()).style(style)
                }
                None => Paragraph::new(""),
            };

            frame.render_widget(paragraph.alignment(Alignment::Center).block(block), rect);
        }
    }
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let history = app.session.history();
    let mode = if app.drag.is_dragging() {
        "DRAGGING | Space/Enter: drop | Esc: cancel"
    } else {
        "Space: pick up | a: add row | u/r: undo/redo | ?: help | q: quit"
    };
    let mut footer_text = format!(
        "Undo: {} | Redo: {} | Next id: {} | {}",
        history.undo_len(),
        history.redo_len(),
        app.session.next_box_id(),
        mode
    );
    if let Some(message) = &app.status_message {
        footer_text = format!("{} | {}", message, footer_text);
    }

    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));

    frame.render_widget(footer, area);
}

fn draw_help_window(frame: &mut Frame) {
    let help_text = vec![
        "Box Grid - Keyboard and Mouse Commands",
        "",
        "NAVIGATION:",
        "  ↑↓←→ / h/j/k/l    Move the cursor",
        "",
        "DRAG AND DROP:",
        "  Space / Enter     Pick up the box under the cursor, or drop it",
        "  Esc               Cancel the current drag",
        "  Mouse             Press on a box, drag, release on a cell",
        "  Dropping onto another box swaps the two",
        "",
        "EDITING:",
        "  a                 Add a row of new boxes",
        "  u / Ctrl+Z        Undo last edit",
        "  r / U / Ctrl+Y    Redo last undone edit",
        "",
        "OTHER:",
        "  ?                 Show this help (press ? or Esc to close)",
        "  q / Ctrl+C        Quit application",
    ];

    let help_paragraph = Paragraph::new(help_text.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help - Commands ")
                .style(Style::default().fg(Color::Yellow))
        )
        .style(Style::default().fg(Color::White))
        .wrap(ratatui::widgets::Wrap { trim: false });

    let area = centered_rect(80, 70, frame.size());

    frame.render_widget(Clear, area);
    frame.render_widget(help_paragraph, area);
}

fn to_color(color: BoxColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

fn label_color(color: BoxColor) -> Color {
    if color.is_light() { Color::Black } else { Color::White }
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
