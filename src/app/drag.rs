//! Two-phase pointer gesture: a press arms, movement past the threshold
//! drags, release either clicks or drops.

/// Which list a row belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Library,
    Set,
    Suggestions,
}

impl Pane {
    /// Focus order used by Tab.
    pub fn next(self) -> Self {
        match self {
            Pane::Library => Pane::Set,
            Pane::Set => Pane::Suggestions,
            Pane::Suggestions => Pane::Library,
        }
    }
}

/// A row in one of the panes, by 0-based index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RowRef {
    pub pane: Pane,
    pub index: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DragGesture {
    #[default]
    Idle,
    /// Pressed on a row but not moved far enough yet.
    Armed { source: RowRef, origin: (u16, u16) },
    Dragging { source: RowRef },
}

/// What a release amounted to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Release {
    None,
    Click(RowRef),
    Drop { source: RowRef, target: Option<RowRef> },
}

impl DragGesture {
    /// Pointer went down on `source` (or on no row at all).
    pub fn press(&mut self, source: Option<RowRef>, x: u16, y: u16) {
        *self = match source {
            Some(source) => DragGesture::Armed {
                source,
                origin: (x, y),
            },
            None => DragGesture::Idle,
        };
    }

    /// Pointer moved while held. Returns true when this movement started a
    /// drag.
    pub fn motion(&mut self, x: u16, y: u16, threshold: u16) -> bool {
        if let DragGesture::Armed { source, origin } = *self {
            if x.abs_diff(origin.0) > threshold || y.abs_diff(origin.1) > threshold {
                *self = DragGesture::Dragging { source };
                return true;
            }
        }
        false
    }

    /// Pointer went up over `target`. Always returns to idle.
    pub fn release(&mut self, target: Option<RowRef>) -> Release {
        let out = match *self {
            DragGesture::Idle => Release::None,
            DragGesture::Armed { source, .. } => Release::Click(source),
            DragGesture::Dragging { source } => Release::Drop { source, target },
        };
        *self = DragGesture::Idle;
        out
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragGesture::Dragging { .. })
    }
}
