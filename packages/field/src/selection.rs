//! Selection lifecycle: `Idle -> Selecting -> Selected -> Idle`.
//!
//! The session owns no heat field. Each completed selection is
//! summarized against whatever cells the caller passes in.

use thiserror::Error;
use uhi_map_field_models::{AreaSelection, GridCell, SelectionShape, SelectionStatus};

use crate::{aggregate, geometry};

/// Errors from driving a [`SelectionSession`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// A shape was completed while the session was not selecting.
    #[error("Cannot complete a selection while {status}")]
    NotSelecting {
        /// Status at the time of the call.
        status: SelectionStatus,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Selecting,
    Selected(Box<AreaSelection>),
}

/// Tracks the current map selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSession {
    state: State,
}

impl Default for SelectionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionSession {
    /// Creates an idle session.
    #[must_use]
    pub const fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SelectionStatus {
        match self.state {
            State::Idle => SelectionStatus::Idle,
            State::Selecting => SelectionStatus::Selecting,
            State::Selected(_) => SelectionStatus::Selected,
        }
    }

    /// The completed selection, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&AreaSelection> {
        match &self.state {
            State::Selected(selection) => Some(selection),
            State::Idle | State::Selecting => None,
        }
    }

    /// Starts drawing a new selection, discarding any previous one.
    ///
    /// Returns the discarded selection, if there was one.
    pub fn start(&mut self) -> Option<AreaSelection> {
        let previous = std::mem::replace(&mut self.state, State::Selecting);
        match previous {
            State::Selected(selection) => {
                log::debug!("Discarding previous {} selection", selection.kind);
                Some(*selection)
            }
            State::Idle | State::Selecting => None,
        }
    }

    /// Finishes the selection with `shape`, summarizing it against `cells`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NotSelecting`] unless [`Self::start`] was
    /// called first.
    pub fn complete(
        &mut self,
        shape: SelectionShape,
        cells: &[GridCell],
    ) -> Result<&AreaSelection, SelectionError> {
        if self.state != State::Selecting {
            return Err(SelectionError::NotSelecting {
                status: self.status(),
            });
        }

        let selection = summarize(shape, cells);
        log::info!(
            "Selected {} of {:.2} km² with {} cells, average {:.1}°C",
            selection.kind,
            selection.area_km2,
            selection.heat.cell_count,
            selection.heat.average
        );

        self.state = State::Selected(Box::new(selection));
        match &self.state {
            State::Selected(selection) => Ok(selection),
            State::Idle | State::Selecting => Err(SelectionError::NotSelecting {
                status: self.status(),
            }),
        }
    }

    /// Drops any selection and returns to idle.
    pub fn clear(&mut self) {
        self.state = State::Idle;
    }
}

/// Builds the full [`AreaSelection`] for a shape without touching any
/// session state.
#[must_use]
pub fn summarize(shape: SelectionShape, cells: &[GridCell]) -> AreaSelection {
    let heat = aggregate(&shape, cells);
    AreaSelection {
        kind: shape.kind(),
        coordinates: geometry::display_coordinates(&shape),
        area_km2: geometry::area_km2(&shape),
        bounds: geometry::bounds(&shape),
        shape,
        heat,
    }
}
