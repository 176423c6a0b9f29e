//! Clipmarks Editor
//!
//! Stateful layer between an editor host and the timing engine:
//! - **Store:** Ordered marker pairs with creation, moves, deletion and reordering
//! - **History:** Per-pair move undo/redo and pair-level undo/redo
//! - **Merge lists:** Parsing, expansion and duration estimates
//! - **Preview:** Frame-driven speed ducking and marker looping ticks
//!
//! All mutations are synchronous and single-threaded; the host drives ticks.

pub mod error;
pub mod history;
pub mod merge_list;
pub mod preview;
pub mod session;
pub mod store;

pub use error::EditorError;
pub use history::PairHistory;
pub use merge_list::{MergeEntry, MergeGroup};
pub use preview::{FrameContext, PlayerControl, TickOutcome};
pub use session::EditorSession;
pub use store::{MarkerPairStore, PlacedMarker};
