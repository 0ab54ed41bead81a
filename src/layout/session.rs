use serde::{Deserialize, Serialize};

use super::transform::Point;

/// Which part of a preview the pointer went down on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTarget {
    #[default]
    Body,
    #[serde(alias = "handle")]
    ResizeHandle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        index: usize,
        target: HitTarget,
        client: Point,
    },
    Move {
        client: Point,
    },
    Up,
}

/// The single interactive session. At most one exists at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PointerSession {
    #[default]
    Idle,
    /// `offset` is the pointer position inside the preview at pointer-down.
    Dragging { index: usize, offset: Point },
    /// `anchor` is the client position of the previous move.
    Resizing { index: usize, anchor: Point },
}

impl PointerSession {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Dragging { index, .. } | Self::Resizing { index, .. } => Some(*index),
        }
    }
}
