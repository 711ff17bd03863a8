//! Grid controller: the state behind the translation grid.
//!
//! Holds the loaded page, committed and in-progress filters, the row
//! selection and the edit dialog, and drives the store and gateway through a
//! [`GridBackend`].

mod backend;
mod controller;
mod debounce;
mod selection;

pub use backend::{GridBackend, LocalBackend};
pub use controller::{EditorState, GridController};
pub use debounce::Debouncer;
pub use selection::{is_selectable, Selection};

use crate::error::ServerError;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Row {0} is not on the current page")]
    RowNotLoaded(i32),

    #[error("Row {0} is already finalized")]
    RowFinalized(i32),

    #[error("Rows {start} and {end} must both be on the current page")]
    RangeNotVisible { start: i32, end: i32 },

    #[error("No rows selected")]
    EmptySelection,

    #[error("No edit in progress")]
    NoEditor,

    #[error("Translation stopped at row {id} after {completed} rows: {source}")]
    BulkHalted {
        id: i32,
        completed: usize,
        #[source]
        source: ServerError,
    },

    #[error(transparent)]
    Backend(#[from] ServerError),
}
