// crates/mergecut-core/src/media_types.rs
//
// Types that flow across the channel between mergecut-media and mergecut-ui.
// No egui, no symphonia — just plain data.

use std::sync::Arc;
use uuid::Uuid;

/// Every decode is resampled to this rate so concatenation offsets are
/// sample-exact regardless of source rates. Matches the rodio output rate.
pub const RENDER_SAMPLE_RATE: u32 = 44_100;

/// Decoded PCM: mono f32 in [-1, 1]. Mono because the offline renderer
/// produces a single-channel mixdown; multi-channel sources are averaged
/// at decode time.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipBuffer {
    pub samples:     Vec<f32>,
    pub sample_rate: u32,
}

impl ClipBuffer {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Results sent from the MediaWorker background threads to the UI.
/// Buffers travel as Arc so the UI can hand them to players without copying.
pub enum MediaResult {
    Duration        { id: Uuid, seconds: f64 },
    ProbeError      { id: Uuid, msg: String },
    ClipDecoded     { id: Uuid, buffer: Arc<ClipBuffer> },
    ClipDecodeError { id: Uuid, msg: String },
    /// A finished offline render. `version` is the timeline version the render
    /// was started from — the UI drops the buffer if the timeline has moved on.
    Merged          { version: u64, buffer: Arc<ClipBuffer> },
    MergeError      { version: u64, msg: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_samples_over_rate() {
        let buf = ClipBuffer {
            samples:     vec![0.0; RENDER_SAMPLE_RATE as usize * 2],
            sample_rate: RENDER_SAMPLE_RATE,
        };
        assert!((buf.duration_seconds() - 2.0).abs() < 1e-9);
    }
}
