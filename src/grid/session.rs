use crate::grid::history::{Action, HistoryStack};
use crate::grid::models::{BoxId, CellRef, Grid, GridBox, GridSurface, IdCounter, Row};
use crate::grid::palette::ColorAllocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSettings {
    pub columns: usize,
    pub initial_rows: usize,
    pub first_box_id: u32,
    pub id_step: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: 3,
            initial_rows: 3,
            first_box_id: 100,
            id_step: 100,
        }
    }
}

/// Owns the grid together with everything that edits it. All mutations go
/// through here so that the history stays in step with the grid.
#[derive(Debug)]
pub struct Session {
    grid: Grid,
    history: HistoryStack,
    colors: ColorAllocator,
    ids: IdCounter,
}

impl Session {
    pub fn new(settings: GridSettings, colors: ColorAllocator) -> Self {
        let mut session = Self {
            grid: Grid::new(settings.columns),
            history: HistoryStack::new(),
            colors,
            ids: IdCounter::new(settings.first_box_id, settings.id_step),
        };
        // The initial rows are not undoable.
        for index in 0..settings.initial_rows {
            let Some(row) = session.build_row(index) else {
                tracing::warn!("box ids exhausted after {} initial rows", index);
                break;
            };
            session.grid.append_row(Row::new(row.into_iter().map(|(_, b)| Some(b)).collect()));
        }
        tracing::info!(
            "session started with {}x{} grid, next id {}",
            settings.initial_rows,
            settings.columns,
            session.ids.peek()
        );
        session
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn next_box_id(&self) -> BoxId {
        self.ids.peek()
    }

    pub fn colors_remaining(&self) -> usize {
        self.colors.remaining()
    }

    /// Drops the box at `source` onto `dest`, swapping with any box already
    /// there. Returns false and changes nothing if the drop is not a move.
    pub fn drop_box(&mut self, source: CellRef, dest: CellRef) -> bool {
        if source == dest || !self.grid.contains(dest) {
            return false;
        }
        let Some(moved) = self.grid.box_at(source).map(|b| b.id) else {
            return false;
        };

        let replaced = self.grid.move_box(source, dest);
        self.history.record(Action::Move { source, dest, moved, replaced });
        true
    }

    /// Appends a row of fresh boxes and returns its index. Returns `None`
    /// and changes nothing when there are no ids left for a whole row.
    pub fn add_row(&mut self) -> Option<usize> {
        let index = self.grid.row_count();
        let Some(row) = self.build_row(index) else {
            tracing::warn!("box ids exhausted at {}, row not added", self.ids.peek());
            return None;
        };
        let appended = self
            .grid
            .append_row(Row::new(row.iter().map(|(_, b)| Some(*b)).collect()));
        tracing::info!("added row {} ({} boxes)", appended, row.len());
        self.history.record(Action::AddRow { index: appended, row });
        Some(appended)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.grid, &mut self.ids).is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.grid, &mut self.ids).is_some()
    }

    fn build_row(&mut self, index: usize) -> Option<Vec<(CellRef, GridBox)>> {
        let ids = self.ids.allocate_many(self.grid.columns())?;
        let row = ids
            .into_iter()
            .enumerate()
            .map(|(col, id)| (CellRef::new(index, col), GridBox::new(id, self.colors.next())))
            .collect();
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn session() -> Session {
        Session::new(GridSettings::default(), ColorAllocator::with_seed(1))
    }

    #[test]
    fn test_initial_grid_ids() {
        let session = session();
        let ids: Vec<u32> = session.grid().occupancy().values().map(|id| id.0).collect();

        assert_eq!(ids, vec![100, 200, 300, 400, 500, 600, 700, 800, 900]);
        assert_eq!(session.next_box_id(), BoxId(1000));
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_initial_colors_are_distinct() {
        let session = session();
        let mut colors: Vec<_> = session.grid().rows.iter().flat_map(|r| r.boxes().map(|b| b.color)).collect();
        colors.sort_by_key(|c| (c.r, c.g, c.b));
        colors.dedup();
        assert_eq!(colors.len(), 9);
        assert_eq!(session.colors_remaining(), 17);
    }

    #[test]
    fn test_add_row_undo_redo_scenario() {
        let mut session = session();

        let index = session.add_row();
        assert_eq!(index, Some(3));
        let added: Vec<GridBox> = session.grid().rows[3].boxes().copied().collect();
        let added_ids: Vec<u32> = added.iter().map(|b| b.id.0).collect();
        assert_eq!(added_ids, vec![1000, 1100, 1200]);
        assert_eq!(session.next_box_id(), BoxId(1300));

        assert!(session.undo());
        assert_eq!(session.grid().row_count(), 3);
        assert_eq!(session.next_box_id(), BoxId(1000));

        assert!(session.redo());
        assert_eq!(session.grid().row_count(), 4);
        let restored: Vec<GridBox> = session.grid().rows[3].boxes().copied().collect();
        assert_eq!(restored, added);
        assert_eq!(session.next_box_id(), BoxId(1300));
    }

    #[test]
    fn test_move_onto_occupied_cell_scenario() {
        let mut session = session();
        let a = CellRef::new(0, 0);
        let b = CellRef::new(1, 1);

        assert!(session.drop_box(a, b));
        assert_eq!(session.grid().locate(BoxId(100)), Some(b));
        assert_eq!(session.grid().locate(BoxId(500)), Some(a));

        assert!(session.undo());
        assert_eq!(session.grid().locate(BoxId(100)), Some(a));
        assert_eq!(session.grid().locate(BoxId(500)), Some(b));
    }

    #[test]
    fn test_drop_on_source_is_noop() {
        let mut session = session();
        let cell = CellRef::new(1, 2);

        assert!(!session.drop_box(cell, cell));
        assert!(!session.drop_box(cell, CellRef::new(9, 0)));
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut session = session();
        session.drop_box(CellRef::new(0, 0), CellRef::new(0, 1));
        session.undo();
        assert!(session.history().can_redo());

        session.add_row();
        assert!(!session.history().can_redo());
        assert!(!session.redo());
    }

    #[test]
    fn test_moves_then_undos_restore_occupancy() {
        let mut rng = StdRng::seed_from_u64(2024);

        for n in 1..=25 {
            let mut session = session();
            session.add_row();
            let before = session.grid().occupancy();

            let mut recorded = 0;
            while recorded < n {
                let source = CellRef::new(rng.gen_range(0..4), rng.gen_range(0..3));
                let dest = CellRef::new(rng.gen_range(0..4), rng.gen_range(0..3));
                if session.drop_box(source, dest) {
                    recorded += 1;
                }
            }
            for _ in 0..n {
                assert!(session.undo());
            }

            assert_eq!(session.grid().occupancy(), before, "after {} moves", n);
        }
    }

    #[test]
    fn test_interleaved_rows_and_moves_unwind() {
        let mut session = session();
        let before = session.grid().occupancy();

        session.add_row();
        session.drop_box(CellRef::new(3, 2), CellRef::new(0, 0));
        session.add_row();
        session.drop_box(CellRef::new(4, 0), CellRef::new(1, 1));
        assert_eq!(session.next_box_id(), BoxId(1600));

        while session.undo() {}
        assert_eq!(session.grid().occupancy(), before);
        assert_eq!(session.next_box_id(), BoxId(1000));

        while session.redo() {}
        assert_eq!(session.grid().row_count(), 5);
        assert_eq!(session.next_box_id(), BoxId(1600));
        assert_eq!(session.grid().locate(BoxId(1200)), Some(CellRef::new(0, 0)));
        assert_eq!(session.grid().locate(BoxId(1300)), Some(CellRef::new(1, 1)));
    }

    #[test]
    fn test_add_row_refused_when_ids_run_out() {
        let settings = GridSettings {
            first_box_id: u32::MAX - 1000,
            ..GridSettings::default()
        };
        let mut session = Session::new(settings, ColorAllocator::with_seed(1));
        assert_eq!(session.grid().box_count(), 9);
        assert_eq!(session.next_box_id(), BoxId(u32::MAX - 100));

        assert_eq!(session.add_row(), None);
        assert_eq!(session.grid().row_count(), 3);
        assert_eq!(session.next_box_id(), BoxId(u32::MAX - 100));
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_initial_rows_stop_before_overflow() {
        let settings = GridSettings {
            first_box_id: u32::MAX - 500,
            ..GridSettings::default()
        };
        let session = Session::new(settings, ColorAllocator::with_seed(1));

        assert_eq!(session.grid().row_count(), 1);
        assert_eq!(session.next_box_id(), BoxId(u32::MAX - 200));
    }
}
