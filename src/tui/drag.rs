use crate::grid::models::CellRef;

/// Drag-and-drop gesture state, shared by mouse and keyboard input.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DragState {
    source: Option<CellRef>,
    target: Option<CellRef>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_drag(&mut self, cell: CellRef) {
        self.source = Some(cell);
        self.target = Some(cell);
    }

    pub fn end_drag(&mut self) {
        self.source = None;
        self.target = None;
    }

    /// Records the cell the box is currently hovering over.
    pub fn propose_drop(&mut self, cell: CellRef) {
        if self.source.is_some() {
            self.target = Some(cell);
        }
    }

    /// Finishes the gesture on `cell`. Returns the `(source, dest)` move to
    /// perform, or `None` when nothing was dragged or it landed where it began.
    pub fn commit_drop(&mut self, cell: CellRef) -> Option<(CellRef, CellRef)> {
        let source = self.source?;
        self.end_drag();
        (source != cell).then_some((source, cell))
    }

    pub fn is_dragging(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<CellRef> {
        self.source
    }

    pub fn target(&self) -> Option<CellRef> {
        self.target
    }
}
