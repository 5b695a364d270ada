//! Canvas interaction: selection and pointer-drag state machine.
//!
//! The controller is independent of any UI event system. Callers feed it
//! pointer-down/move/up in canvas coordinates and apply the returned position
//! updates to the document.
//!
//! States: `Idle -> Selected -> Dragging -> Selected`. The last pointer-down
//! wins, so at most one element is selected or dragged at a time. Placement
//! is free: no clamping, no snapping.

use crate::model::document::ElementId;

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pointer button reported with a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left mouse button or single touch. Starts a drag.
    Primary,
    /// Any other button. Selects without dragging.
    Secondary,
}

/// Current interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Selected {
        id: ElementId,
    },
    Dragging {
        id: ElementId,
        /// Pointer position minus the element's top-left at drag start.
        offset: Point,
    },
}

/// New top-left corner for the dragged element.
#[derive(Debug, Clone, PartialEq)]
pub struct DragUpdate {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
}

/// Selection and drag tracker for one canvas.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: InteractionState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selected_id(&self) -> Option<&ElementId> {
        match &self.state {
            InteractionState::Idle => None,
            InteractionState::Selected { id } | InteractionState::Dragging { id, .. } => Some(id),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging { .. })
    }

    /// Selects `id` without starting a drag. Ends any drag in progress.
    pub fn select(&mut self, id: impl Into<ElementId>) {
        self.state = InteractionState::Selected { id: id.into() };
    }

    /// Drops the selection.
    pub fn clear(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Pointer-down on element `id` whose top-left is `origin`.
    ///
    /// Always selects the element. A primary button also starts a drag,
    /// recording the pointer offset from the element's top-left.
    pub fn pointer_down(
        &mut self,
        id: impl Into<ElementId>,
        origin: Point,
        pointer: Point,
        button: PointerButton,
    ) {
        let id = id.into();
        self.state = match button {
            PointerButton::Primary => InteractionState::Dragging {
                id,
                offset: Point::new(pointer.x - origin.x, pointer.y - origin.y),
            },
            PointerButton::Secondary => InteractionState::Selected { id },
        };
    }

    /// Starts a primary-button drag on `id`.
    pub fn begin(&mut self, id: impl Into<ElementId>, origin: Point, pointer: Point) {
        self.pointer_down(id, origin, pointer, PointerButton::Primary);
    }

    /// Computes the dragged element's new top-left as `pointer - offset`.
    ///
    /// Returns `None` when no drag is in progress. The result depends only on
    /// the latest pointer position, never on how many moves preceded it.
    pub fn move_to(&self, pointer: Point) -> Option<DragUpdate> {
        match &self.state {
            InteractionState::Dragging { id, offset } => Some(DragUpdate {
                id: id.clone(),
                x: pointer.x - offset.x,
                y: pointer.y - offset.y,
            }),
            _ => None,
        }
    }

    /// Ends the drag, keeping the selection. Returns the id that was being
    /// dragged, if any.
    pub fn end(&mut self) -> Option<ElementId> {
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging { id, .. } => {
                self.state = InteractionState::Selected { id: id.clone() };
                Some(id)
            }
            other => {
                self.state = other;
                None
            }
        }
    }
}
