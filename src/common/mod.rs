mod state;

pub use state::{AppState, PollSequence, SnapshotStore};
