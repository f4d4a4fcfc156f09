// crates/mergecut-media/src/lib.rs
//
// No egui dependency — communicates with mergecut-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Call it from worker.rs (or a new MediaWorker method)

pub mod decode;
pub mod error;
pub mod probe;
pub mod render;
pub mod wav;
pub mod worker;

// Re-export the main public API so mergecut-ui imports are simple.
pub use error::MediaError;
pub use render::RenderSegment;
pub use worker::{MediaWorker, MergeJob};
pub use mergecut_core::media_types::{ClipBuffer, MediaResult, RENDER_SAMPLE_RATE};
