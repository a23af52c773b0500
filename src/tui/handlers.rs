use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

pub struct KeyHandler;

impl KeyHandler {
    pub fn handle_normal_mode_key(key_event: KeyEvent) -> NormalModeAction {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        match key_event.code {
            KeyCode::Char('c') if ctrl => NormalModeAction::Quit,
            KeyCode::Char('z') if ctrl => NormalModeAction::Undo,
            KeyCode::Char('y') if ctrl => NormalModeAction::Redo,
            KeyCode::Char('q') => NormalModeAction::Quit,
            KeyCode::Esc => NormalModeAction::CancelDrag,
            KeyCode::Up | KeyCode::Char('k') => NormalModeAction::MoveCursorUp,
            KeyCode::Down | KeyCode::Char('j') => NormalModeAction::MoveCursorDown,
            KeyCode::Left | KeyCode::Char('h') => NormalModeAction::MoveCursorLeft,
            KeyCode::Right | KeyCode::Char('l') => NormalModeAction::MoveCursorRight,
            KeyCode::Enter | KeyCode::Char(' ') => NormalModeAction::PickUpOrDrop,
            KeyCode::Char('a') => NormalModeAction::AddRow,
            KeyCode::Char('u') => NormalModeAction::Undo,
            KeyCode::Char('r') | KeyCode::Char('U') => NormalModeAction::Redo,
            KeyCode::Char('?') => NormalModeAction::ToggleHelpMode,
            _ => NormalModeAction::None,
        }
    }

    pub fn handle_help_mode_key(key_event: KeyEvent) -> HelpModeAction {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => {
                HelpModeAction::ExitHelpMode
            }
            _ => HelpModeAction::None,
        }
    }

    /// Mouse gestures carry the terminal position; mapping it to a cell is
    /// up to the caller, which knows the layout.
    pub fn handle_mouse_event(mouse_event: MouseEvent) -> MouseAction {
        let (column, row) = (mouse_event.column, mouse_event.row);
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => MouseAction::Press { column, row },
            MouseEventKind::Drag(MouseButton::Left) => MouseAction::Drag { column, row },
            MouseEventKind::Up(MouseButton::Left) => MouseAction::Release { column, row },
            _ => MouseAction::None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NormalModeAction {
    None,
    Quit,
    CancelDrag,
    MoveCursorUp,
    MoveCursorDown,
    MoveCursorLeft,
    MoveCursorRight,
    PickUpOrDrop,
    AddRow,
    Undo,
    Redo,
    ToggleHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum HelpModeAction {
    None,
    ExitHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum MouseAction {
    None,
    Press { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Release { column: u16, row: u16 },
}
