use crate::grid::palette::BoxColor;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub u32);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBox {
    pub id: BoxId,
    pub color: BoxColor,
}

impl GridBox {
    pub fn new(id: BoxId, color: BoxColor) -> Self {
        Self { id, color }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Option<GridBox>>,
}

impl Row {
    pub fn new(cells: Vec<Option<GridBox>>) -> Self {
        Self { cells }
    }

    pub fn boxes(&self) -> impl Iterator<Item = &GridBox> {
        self.cells.iter().flatten()
    }
}

/// Issues box ids in creation order: `first`, `first + step`, ...
///
/// `next` always fits in a `u32`; once the next id cannot be followed by
/// another one, allocation stops instead of wrapping.
#[derive(Debug, Clone)]
pub struct IdCounter {
    next: u32,
    step: u32,
}

impl IdCounter {
    pub fn new(first: u32, step: u32) -> Self {
        Self { next: first, step }
    }

    pub fn allocate(&mut self) -> Option<BoxId> {
        let after = self.next.checked_add(self.step)?;
        let id = BoxId(self.next);
        self.next = after;
        Some(id)
    }

    /// Allocates `count` ids, or none at all if they would not all fit.
    pub fn allocate_many(&mut self, count: usize) -> Option<Vec<BoxId>> {
        let span = u32::try_from(count).ok()?.checked_mul(self.step)?;
        self.next.checked_add(span)?;
        (0..count).map(|_| self.allocate()).collect()
    }

    pub fn peek(&self) -> BoxId {
        BoxId(self.next)
    }

    /// Makes `id` the next id issued again.
    pub fn rewind_to(&mut self, id: BoxId) {
        self.next = id.0;
    }

    /// Moves the counter just past `id`, unless it is already further along.
    pub fn advance_past(&mut self, id: BoxId) {
        self.next = self.next.max(id.0.saturating_add(self.step));
    }
}

/// Structural mutations the history replays. None of these know about undo.
pub trait GridSurface {
    /// Moves the occupant of `from` into `to`. A box already in `to` is
    /// displaced into `from` and its id returned.
    fn move_box(&mut self, from: CellRef, to: CellRef) -> Option<BoxId>;
    fn append_row(&mut self, row: Row) -> usize;
    fn remove_row(&mut self, index: usize) -> Option<Row>;
}

#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: Vec<Row>,
    columns: usize,
}

impl Grid {
    pub fn new(columns: usize) -> Self {
        Self {
            rows: Vec::new(),
            columns,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row < self.rows.len() && cell.col < self.columns
    }

    pub fn box_at(&self, cell: CellRef) -> Option<&GridBox> {
        self.rows.get(cell.row)?.cells.get(cell.col)?.as_ref()
    }

    pub fn locate(&self, id: BoxId) -> Option<CellRef> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.cells
                .iter()
                .position(|cell| cell.map(|b| b.id) == Some(id))
                .map(|c| CellRef::new(r, c))
        })
    }

    pub fn box_count(&self) -> usize {
        self.rows.iter().map(|row| row.boxes().count()).sum()
    }

    /// Snapshot of which box sits where, for comparing grid states.
    pub fn occupancy(&self) -> BTreeMap<CellRef, BoxId> {
        let mut map = BTreeMap::new();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.cells.iter().enumerate() {
                if let Some(b) = cell {
                    map.insert(CellRef::new(r, c), b.id);
                }
            }
        }
        map
    }

    fn slot_mut(&mut self, cell: CellRef) -> Option<&mut Option<GridBox>> {
        self.rows.get_mut(cell.row)?.cells.get_mut(cell.col)
    }
}

impl GridSurface for Grid {
    fn move_box(&mut self, from: CellRef, to: CellRef) -> Option<BoxId> {
        if from == to || !self.contains(from) || !self.contains(to) {
            return None;
        }
        let moved = self.slot_mut(from)?.take()?;
        let displaced = self.slot_mut(to)?.replace(moved);
        if let Some(displaced) = displaced {
            *self.slot_mut(from)? = Some(displaced);
        }
        displaced.map(|b| b.id)
    }

    fn append_row(&mut self, mut row: Row) -> usize {
        row.cells.resize(self.columns, None);
        self.rows.push(row);
        self.rows.len() - 1
    }

    fn remove_row(&mut self, index: usize) -> Option<Row> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::palette::PALETTE;

    fn grid_with(ids: &[&[Option<u32>]]) -> Grid {
        let mut grid = Grid::new(ids[0].len());
        for row in ids {
            let cells = row
                .iter()
                .map(|id| id.map(|id| GridBox::new(BoxId(id), PALETTE[0])))
                .collect();
            grid.append_row(Row::new(cells));
        }
        grid
    }

    #[test]
    fn test_move_box_into_empty_cell() {
        let mut grid = grid_with(&[&[Some(100), None]]);

        let displaced = grid.move_box(CellRef::new(0, 0), CellRef::new(0, 1));

        assert_eq!(displaced, None);
        assert!(grid.box_at(CellRef::new(0, 0)).is_none());
        assert_eq!(grid.box_at(CellRef::new(0, 1)).map(|b| b.id), Some(BoxId(100)));
    }

    #[test]
    fn test_move_box_displaces_occupant() {
        let mut grid = grid_with(&[&[Some(100), Some(200)]]);

        let displaced = grid.move_box(CellRef::new(0, 0), CellRef::new(0, 1));

        assert_eq!(displaced, Some(BoxId(200)));
        assert_eq!(grid.locate(BoxId(100)), Some(CellRef::new(0, 1)));
        assert_eq!(grid.locate(BoxId(200)), Some(CellRef::new(0, 0)));
    }

    #[test]
    fn test_move_box_from_empty_or_outside_is_noop() {
        let mut grid = grid_with(&[&[None, Some(200)]]);
        let before = grid.occupancy();

        assert_eq!(grid.move_box(CellRef::new(0, 0), CellRef::new(0, 1)), None);
        assert_eq!(grid.move_box(CellRef::new(0, 1), CellRef::new(5, 0)), None);
        assert_eq!(grid.move_box(CellRef::new(0, 1), CellRef::new(0, 1)), None);
        assert_eq!(grid.occupancy(), before);
    }

    #[test]
    fn test_append_and_remove_row() {
        let mut grid = grid_with(&[&[Some(100), Some(200)]]);

        let index = grid.append_row(Row::new(vec![Some(GridBox::new(BoxId(300), PALETTE[1]))]));
        assert_eq!(index, 1);
        // Short rows are padded to the grid width.
        assert_eq!(grid.rows[1].cells.len(), 2);
        assert_eq!(grid.box_count(), 3);

        let removed = grid.remove_row(1).unwrap();
        assert_eq!(removed.boxes().next().map(|b| b.id), Some(BoxId(300)));
        assert_eq!(grid.row_count(), 1);
        assert!(grid.remove_row(4).is_none());
    }

    #[test]
    fn test_id_counter() {
        let mut ids = IdCounter::new(100, 100);
        assert_eq!(ids.allocate(), Some(BoxId(100)));
        assert_eq!(ids.allocate(), Some(BoxId(200)));
        assert_eq!(ids.peek(), BoxId(300));

        ids.rewind_to(BoxId(200));
        assert_eq!(ids.peek(), BoxId(200));

        ids.advance_past(BoxId(500));
        assert_eq!(ids.peek(), BoxId(600));
        ids.advance_past(BoxId(100));
        assert_eq!(ids.peek(), BoxId(600));
    }

    #[test]
    fn test_id_counter_stops_at_upper_bound() {
        let mut ids = IdCounter::new(u32::MAX - 250, 100);

        assert_eq!(ids.allocate(), Some(BoxId(u32::MAX - 250)));
        assert_eq!(ids.allocate(), Some(BoxId(u32::MAX - 150)));
        assert_eq!(ids.allocate(), None);
        assert_eq!(ids.peek(), BoxId(u32::MAX - 50));

        ids.advance_past(BoxId(u32::MAX - 20));
        assert_eq!(ids.peek(), BoxId(u32::MAX));
        assert_eq!(ids.allocate(), None);
    }

    #[test]
    fn test_allocate_many_is_all_or_nothing() {
        let mut ids = IdCounter::new(u32::MAX - 350, 100);

        assert_eq!(ids.allocate_many(4), None);
        assert_eq!(ids.peek(), BoxId(u32::MAX - 350));

        let batch = ids.allocate_many(3).unwrap();
        assert_eq!(batch, vec![BoxId(u32::MAX - 350), BoxId(u32::MAX - 250), BoxId(u32::MAX - 150)]);
        assert_eq!(ids.allocate_many(1), None);
        assert_eq!(ids.allocate_many(0), Some(vec![]));
    }
}
