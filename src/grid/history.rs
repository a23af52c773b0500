use crate::grid::models::{BoxId, CellRef, GridBox, GridSurface, IdCounter, Row};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move {
        source: CellRef,
        dest: CellRef,
        moved: BoxId,
        replaced: Option<BoxId>,
    },
    AddRow {
        index: usize,
        row: Vec<(CellRef, GridBox)>,
    },
}

impl Action {
    pub fn describe(&self) -> String {
        match self {
            Action::Move { moved, dest, replaced: Some(replaced), .. } => {
                format!("move {} to {} (swapped with {})", moved, dest, replaced)
            }
            Action::Move { moved, dest, replaced: None, .. } => {
                format!("move {} to {}", moved, dest)
            }
            Action::AddRow { index, .. } => format!("add row {}", index + 1),
        }
    }

    fn apply<G: GridSurface>(&self, grid: &mut G, ids: &mut IdCounter) {
        match self {
            Action::Move { source, dest, moved, replaced } => {
                let displaced = grid.move_box(*source, *dest);
                if displaced != *replaced {
                    tracing::warn!(
                        "redo of {} displaced {:?}, expected {:?}",
                        moved, displaced, replaced
                    );
                }
            }
            Action::AddRow { index, row } => {
                let cells = row.iter().map(|(_, b)| Some(*b)).collect();
                let appended = grid.append_row(Row::new(cells));
                if appended != *index {
                    tracing::warn!("row re-attached at {}, expected {}", appended, index);
                }
                if let Some((_, last)) = row.last() {
                    ids.advance_past(last.id);
                }
            }
        }
    }

    fn invert<G: GridSurface>(&self, grid: &mut G, ids: &mut IdCounter) {
        match self {
            Action::Move { source, dest, moved, replaced } => {
                // Moving back out of `dest` displaces any replaced box into it again.
                let displaced = grid.move_box(*dest, *source);
                if displaced != *replaced {
                    tracing::warn!(
                        "undo of {} displaced {:?}, expected {:?}",
                        moved, displaced, replaced
                    );
                }
            }
            Action::AddRow { index, row } => {
                if grid.remove_row(*index).is_none() {
                    tracing::warn!("row {} missing on undo", index);
                }
                if let Some((_, first)) = row.first() {
                    ids.rewind_to(first.id);
                }
            }
        }
    }
}

/// Undo and redo lists of reversible grid edits. Every action lives in
/// exactly one of the two lists.
#[derive(Debug, Default)]
pub struct HistoryStack {
    undo_list: Vec<Action>,
    redo_list: Vec<Action>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: Action) {
        tracing::debug!("record: {}", action.describe());
        self.undo_list.push(action);
        self.redo_list.clear();
    }

    pub fn undo<G: GridSurface>(&mut self, grid: &mut G, ids: &mut IdCounter) -> Option<&Action> {
        let action = self.undo_list.pop()?;
        tracing::debug!("undo: {}", action.describe());
        action.invert(grid, ids);
        self.redo_list.push(action);
        self.redo_list.last()
    }

    pub fn redo<G: GridSurface>(&mut self, grid: &mut G, ids: &mut IdCounter) -> Option<&Action> {
        let action = self.redo_list.pop()?;
        tracing::debug!("redo: {}", action.describe());
        action.apply(grid, ids);
        self.undo_list.push(action);
        self.undo_list.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_list.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_list.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_list.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::models::Grid;
    use crate::grid::palette::PALETTE;

    fn three_by_three() -> (Grid, IdCounter) {
        let mut grid = Grid::new(3);
        let mut ids = IdCounter::new(100, 100);
        for _ in 0..3 {
            let cells = (0..3)
                .map(|c| Some(GridBox::new(ids.allocate().unwrap(), PALETTE[c])))
                .collect();
            grid.append_row(Row::new(cells));
        }
        (grid, ids)
    }

    fn move_action(grid: &mut Grid, source: CellRef, dest: CellRef) -> Action {
        let moved = grid.box_at(source).unwrap().id;
        let replaced = grid.move_box(source, dest);
        Action::Move { source, dest, moved, replaced }
    }

    #[test]
    fn test_undo_and_redo_on_empty_stack() {
        let (mut grid, mut ids) = three_by_three();
        let before = grid.occupancy();
        let mut history = HistoryStack::new();

        assert!(history.undo(&mut grid, &mut ids).is_none());
        assert!(history.redo(&mut grid, &mut ids).is_none());
        assert_eq!(grid.occupancy(), before);
        assert_eq!(ids.peek(), BoxId(1000));
    }

    #[test]
    fn test_record_clears_redo() {
        let (mut grid, mut ids) = three_by_three();
        let mut history = HistoryStack::new();

        let action = move_action(&mut grid, CellRef::new(0, 0), CellRef::new(0, 1));
        history.record(action);
        history.undo(&mut grid, &mut ids);
        assert!(history.can_redo());

        let action = move_action(&mut grid, CellRef::new(1, 0), CellRef::new(2, 0));
        history.record(action);
        assert!(!history.can_redo());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_move_to_empty_cell_undo_redo() {
        let (mut grid, mut ids) = three_by_three();
        grid.rows[1].cells[1] = None;
        let mut history = HistoryStack::new();
        let a = CellRef::new(0, 0);
        let b = CellRef::new(1, 1);

        let action = move_action(&mut grid, a, b);
        assert_eq!(
            action,
            Action::Move { source: a, dest: b, moved: BoxId(100), replaced: None }
        );
        history.record(action);

        history.undo(&mut grid, &mut ids);
        assert_eq!(grid.locate(BoxId(100)), Some(a));
        assert!(grid.box_at(b).is_none());

        history.redo(&mut grid, &mut ids);
        assert_eq!(grid.locate(BoxId(100)), Some(b));
        assert!(grid.box_at(a).is_none());
    }

    #[test]
    fn test_swap_undo_restores_both_boxes() {
        let (mut grid, mut ids) = three_by_three();
        let mut history = HistoryStack::new();
        let a = CellRef::new(0, 0);
        let b = CellRef::new(1, 1);

        let action = move_action(&mut grid, a, b);
        assert_eq!(
            action,
            Action::Move { source: a, dest: b, moved: BoxId(100), replaced: Some(BoxId(500)) }
        );
        history.record(action);
        assert_eq!(grid.locate(BoxId(100)), Some(b));
        assert_eq!(grid.locate(BoxId(500)), Some(a));

        history.undo(&mut grid, &mut ids);
        assert_eq!(grid.locate(BoxId(100)), Some(a));
        assert_eq!(grid.locate(BoxId(500)), Some(b));

        history.redo(&mut grid, &mut ids);
        assert_eq!(grid.locate(BoxId(100)), Some(b));
        assert_eq!(grid.locate(BoxId(500)), Some(a));
    }

    #[test]
    fn test_add_row_undo_redo_moves_id_counter() {
        let (mut grid, mut ids) = three_by_three();
        let mut history = HistoryStack::new();

        let row: Vec<(CellRef, GridBox)> = (0..3)
            .map(|c| (CellRef::new(3, c), GridBox::new(ids.allocate().unwrap(), PALETTE[5])))
            .collect();
        let index = grid.append_row(Row::new(row.iter().map(|(_, b)| Some(*b)).collect()));
        history.record(Action::AddRow { index, row });
        assert_eq!(ids.peek(), BoxId(1300));

        let undone = history.undo(&mut grid, &mut ids).cloned();
        assert!(matches!(undone, Some(Action::AddRow { index: 3, .. })));
        assert_eq!(grid.row_count(), 3);
        assert_eq!(ids.peek(), BoxId(1000));

        history.redo(&mut grid, &mut ids);
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.locate(BoxId(1100)), Some(CellRef::new(3, 1)));
        assert_eq!(ids.peek(), BoxId(1300));
    }

    #[test]
    fn test_action_lives_in_one_list() {
        let (mut grid, mut ids) = three_by_three();
        let mut history = HistoryStack::new();

        for col in 0..2 {
            let action = move_action(&mut grid, CellRef::new(0, col), CellRef::new(2, col));
            history.record(action);
        }
        assert_eq!((history.undo_len(), history.redo_len()), (2, 0));
        history.undo(&mut grid, &mut ids);
        assert_eq!((history.undo_len(), history.redo_len()), (1, 1));
        history.undo(&mut grid, &mut ids);
        assert_eq!((history.undo_len(), history.redo_len()), (0, 2));
        history.redo(&mut grid, &mut ids);
        assert_eq!((history.undo_len(), history.redo_len()), (1, 1));
    }

    #[test]
    fn test_describe() {
        let action = Action::Move {
            source: CellRef::new(0, 0),
            dest: CellRef::new(1, 1),
            moved: BoxId(100),
            replaced: None,
        };
        assert_eq!(action.describe(), "move 100 to (1, 1)");
    }
}
