use crate::grid::models::CellRef;
use crate::grid::session::Session;
use crate::tui::drag::DragState;
use crate::tui::handlers::{HelpModeAction, KeyHandler, MouseAction, NormalModeAction};
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;

pub const CELL_WIDTH: u16 = 10;
pub const CELL_HEIGHT: u16 = 3;

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub cursor: CellRef,
    pub drag: DragState,
    pub scroll_offset: usize,
    pub should_quit: bool,
    pub help_mode: bool,
    pub status_message: Option<String>,
    /// Where the grid was last drawn; used to hit-test mouse events.
    pub grid_area: Rect,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            cursor: CellRef::new(0, 0),
            drag: DragState::new(),
            scroll_offset: 0,
            should_quit: false,
            help_mode: false,
            status_message: None,
            grid_area: Rect::default(),
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        if self.help_mode {
            match KeyHandler::handle_help_mode_key(key_event) {
                HelpModeAction::ExitHelpMode => self.help_mode = false,
                HelpModeAction::None => {}
            }
            return Ok(());
        }

        match KeyHandler::handle_normal_mode_key(key_event) {
            NormalModeAction::None => {}
            NormalModeAction::Quit => self.should_quit = true,
            NormalModeAction::CancelDrag => self.cancel_drag(),
            NormalModeAction::MoveCursorUp => self.move_cursor(-1, 0),
            NormalModeAction::MoveCursorDown => self.move_cursor(1, 0),
            NormalModeAction::MoveCursorLeft => self.move_cursor(0, -1),
            NormalModeAction::MoveCursorRight => self.move_cursor(0, 1),
            NormalModeAction::PickUpOrDrop => self.pick_up_or_drop(),
            NormalModeAction::AddRow => self.add_row(),
            NormalModeAction::Undo => self.undo(),
            NormalModeAction::Redo => self.redo(),
            NormalModeAction::ToggleHelpMode => self.help_mode = !self.help_mode,
        }
        Ok(())
    }

    pub fn handle_mouse_event(&mut self, mouse_event: MouseEvent) -> Result<()> {
        if self.help_mode {
            return Ok(());
        }

        match KeyHandler::handle_mouse_event(mouse_event) {
            MouseAction::Press { column, row } => {
                if let Some(cell) = self.cell_at(column, row) {
                    self.cursor = cell;
                    if self.session.grid().box_at(cell).is_some() {
                        self.drag.begin_drag(cell);
                    }
                }
            }
            MouseAction::Drag { column, row } => {
                if let Some(cell) = self.cell_at(column, row) {
                    self.cursor = cell;
                    self.drag.propose_drop(cell);
                }
            }
            MouseAction::Release { column, row } => match self.cell_at(column, row) {
                Some(cell) => {
                    self.cursor = cell;
                    self.commit_drop(cell);
                }
                // Released outside the grid.
                None => self.drag.end_drag(),
            },
            MouseAction::None => {}
        }
        Ok(())
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let grid = self.session.grid();
        if grid.row_count() == 0 {
            return;
        }
        let row = self.cursor.row.saturating_add_signed(d_row).min(grid.row_count() - 1);
        let col = self.cursor.col.saturating_add_signed(d_col).min(grid.columns() - 1);
        self.cursor = CellRef::new(row, col);
        self.drag.propose_drop(self.cursor);
        self.update_scroll();
    }

    fn pick_up_or_drop(&mut self) {
        if self.drag.is_dragging() {
            self.commit_drop(self.cursor);
        } else if self.session.grid().box_at(self.cursor).is_some() {
            self.drag.begin_drag(self.cursor);
            self.status_message = Some(format!("Picked up box at {}", self.cursor));
        }
    }

    fn commit_drop(&mut self, cell: CellRef) {
        if let Some((source, dest)) = self.drag.commit_drop(cell) {
            if self.session.drop_box(source, dest) {
                self.status_message = self
                    .session
                    .grid()
                    .box_at(dest)
                    .map(|b| format!("Moved {} to {}", b.id, dest));
            }
        } else {
            self.status_message = None;
        }
    }

    fn cancel_drag(&mut self) {
        self.drag.end_drag();
        self.status_message = None;
    }

    fn add_row(&mut self) {
        self.drag.end_drag();
        match self.session.add_row() {
            Some(index) => {
                self.cursor = CellRef::new(index, self.cursor.col);
                self.update_scroll();
                self.status_message = Some(format!("Added row {}", index + 1));
            }
            None => {
                self.status_message = Some("No box ids left for another row".to_string());
            }
        }
    }

    fn undo(&mut self) {
        self.drag.end_drag();
        self.status_message = Some(if self.session.undo() {
            "Undo".to_string()
        } else {
            "Nothing to undo".to_string()
        });
        self.clamp_cursor();
    }

    fn redo(&mut self) {
        self.drag.end_drag();
        self.status_message = Some(if self.session.redo() {
            "Redo".to_string()
        } else {
            "Nothing to redo".to_string()
        });
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let rows = self.session.grid().row_count();
        if self.cursor.row >= rows {
            self.cursor.row = rows.saturating_sub(1);
        }
        self.update_scroll();
    }

    fn visible_rows(&self) -> usize {
        (self.grid_area.height / CELL_HEIGHT).max(1) as usize
    }

    fn update_scroll(&mut self) {
        let visible = self.visible_rows();
        if self.cursor.row < self.scroll_offset {
            self.scroll_offset = self.cursor.row;
        } else if self.cursor.row >= self.scroll_offset + visible {
            self.scroll_offset = self.cursor.row + 1 - visible;
        }
    }

    /// Screen rectangle of `cell`, or `None` if it is scrolled out of view or
    /// does not fit in the grid area.
    pub fn cell_rect(&self, cell: CellRef) -> Option<Rect> {
        let row = cell.row.checked_sub(self.scroll_offset)?;
        let x = self.grid_area.x as usize + cell.col * CELL_WIDTH as usize;
        let y = self.grid_area.y as usize + row * CELL_HEIGHT as usize;
        let right = self.grid_area.x as usize + self.grid_area.width as usize;
        let bottom = self.grid_area.y as usize + self.grid_area.height as usize;
        if x + CELL_WIDTH as usize > right || y + CELL_HEIGHT as usize > bottom {
            return None;
        }
        Some(Rect::new(x as u16, y as u16, CELL_WIDTH, CELL_HEIGHT))
    }

    /// Maps a terminal position to the grid cell drawn there.
    pub fn cell_at(&self, column: u16, row: u16) -> Option<CellRef> {
        let area = self.grid_area;
        if column < area.x || row < area.y {
            return None;
        }
        let col = ((column - area.x) / CELL_WIDTH) as usize;
        let row = ((row - area.y) / CELL_HEIGHT) as usize + self.scroll_offset;
        let cell = CellRef::new(row, col);
        (self.session.grid().contains(cell) && self.cell_rect(cell).is_some()).then_some(cell)
    }
}
