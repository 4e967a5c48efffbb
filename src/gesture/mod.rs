//! Gesture recognition: turns raw pointer input into reposition commands.
//!
//! Mouse events and keyboard actions are both fed in as [`Pointer`] events.
//! Each adapter emits at most one [`Move`] per completed gesture and never
//! touches the pyramid itself.

use serde::{Deserialize, Serialize};

/// A completed gesture: move the slot at `from` to `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

/// Raw pointer input in pyramid coordinates (1-based positions)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    /// Button pressed over a slot
    Down { position: usize },
    /// Pointer moved while pressed, over a slot
    Over { position: usize },
    /// Button released, over a slot or outside the pyramid
    Up { position: Option<usize> },
    /// Abandon whatever gesture is in progress
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Tap one slot, then tap where it should go
    #[default]
    Click,
    /// Press on a slot, drag it, release on the destination
    Drag,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            InputMode::Click => "click",
            InputMode::Drag => "drag",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            InputMode::Click => InputMode::Drag,
            InputMode::Drag => InputMode::Click,
        }
    }

    /// Build the adapter for this mode
    pub fn adapter(self) -> Box<dyn GestureAdapter> {
        match self {
            InputMode::Click => Box::new(ClickSelect::default()),
            InputMode::Drag => Box::new(DragDrop::default()),
        }
    }
}

pub trait GestureAdapter: Send {
    /// Feed one pointer event; returns a move when a gesture completes
    fn feed(&mut self, event: Pointer) -> Option<Move>;

    /// Slot currently selected or being carried
    fn selected(&self) -> Option<usize>;

    /// Slot the carried block would land on
    fn target(&self) -> Option<usize> {
        None
    }

    fn mode(&self) -> InputMode;
}

/// Select-then-swap: first tap selects, second tap on another slot moves
/// the selected slot there, tapping the selection again clears it.
#[derive(Debug, Default)]
pub struct ClickSelect {
    selected: Option<usize>,
    pressed: Option<usize>,
}

impl ClickSelect {
    fn tap(&mut self, position: usize) -> Option<Move> {
        match self.selected {
            None => {
                self.selected = Some(position);
                None
            }
            Some(selected) if selected == position => {
                self.selected = None;
                None
            }
            Some(selected) => {
                self.selected = None;
                Some(Move {
                    from: selected,
                    to: position,
                })
            }
        }
    }
}

impl GestureAdapter for ClickSelect {
    fn feed(&mut self, event: Pointer) -> Option<Move> {
        match event {
            Pointer::Down { position } => {
                self.pressed = Some(position);
                None
            }
            Pointer::Over { .. } => None,
            Pointer::Up { position } => {
                let pressed = self.pressed.take()?;
                // Released somewhere else: a slide, not a click
                if position? != pressed {
                    return None;
                }
                self.tap(pressed)
            }
            Pointer::Cancel => {
                self.selected = None;
                self.pressed = None;
                None
            }
        }
    }

    fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn mode(&self) -> InputMode {
        InputMode::Click
    }
}

/// Drag-and-drop: press picks up, release over another slot drops.
#[derive(Debug, Default)]
pub struct DragDrop {
    carrying: Option<usize>,
    over: Option<usize>,
}

impl GestureAdapter for DragDrop {
    fn feed(&mut self, event: Pointer) -> Option<Move> {
        match event {
            Pointer::Down { position } => {
                self.carrying = Some(position);
                self.over = Some(position);
                None
            }
            Pointer::Over { position } => {
                if self.carrying.is_some() {
                    self.over = Some(position);
                }
                None
            }
            Pointer::Up { position } => {
                let from = self.carrying.take();
                self.over = None;
                match (from, position) {
                    (Some(from), Some(to)) if from != to => Some(Move { from, to }),
                    _ => None,
                }
            }
            Pointer::Cancel => {
                self.carrying = None;
                self.over = None;
                None
            }
        }
    }

    fn selected(&self) -> Option<usize> {
        self.carrying
    }

    fn target(&self) -> Option<usize> {
        self.over.filter(|over| Some(*over) != self.carrying)
    }

    fn mode(&self) -> InputMode {
        InputMode::Drag
    }
}
