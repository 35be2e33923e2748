mod selection;

pub use selection::{SelectedCandle, SelectionError, SelectionStateMachine};
