// crates/mergecut-media/src/render.rs
//
// Offline merge: one pass over the segment list, copying decoded clips into a
// zero-filled output at cumulative offsets. Pause regions stay silent because
// nothing ever writes to them. Not real-time — a ten-minute timeline renders
// in the time it takes to memcpy ten minutes of PCM.

use std::sync::Arc;

use mergecut_core::media_types::{ClipBuffer, RENDER_SAMPLE_RATE};
use crate::error::MediaError;

/// One entry of the render plan, in timeline order.
pub enum RenderSegment {
    Clip(Arc<ClipBuffer>),
    Silence(f64),
}

impl RenderSegment {
    /// Length of this segment in output frames.
    fn frames(&self) -> usize {
        match self {
            RenderSegment::Clip(buf)    => buf.samples.len(),
            RenderSegment::Silence(sec) => (sec * RENDER_SAMPLE_RATE as f64).round() as usize,
        }
    }
}

/// Concatenate `segments` into a single mono buffer at `RENDER_SAMPLE_RATE`.
///
/// Output length is the exact sum of segment lengths — no gap, no overlap.
/// Zero-duration silences contribute no frames. A plan whose total is zero
/// frames (empty timeline, or all zero-length pauses) aborts with
/// `EmptyRender` and no buffer is produced.
pub fn render_segments(segments: &[RenderSegment]) -> Result<ClipBuffer, MediaError> {
    let total: usize = segments.iter().map(RenderSegment::frames).sum();
    if total == 0 {
        return Err(MediaError::EmptyRender);
    }

    let mut samples = vec![0.0f32; total];
    let mut offset = 0usize;
    for seg in segments {
        if let RenderSegment::Clip(buf) = seg {
            debug_assert_eq!(buf.sample_rate, RENDER_SAMPLE_RATE);
            samples[offset..offset + buf.samples.len()].copy_from_slice(&buf.samples);
        }
        offset += seg.frames();
    }

    Ok(ClipBuffer { samples, sample_rate: RENDER_SAMPLE_RATE })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: usize = RENDER_SAMPLE_RATE as usize;

    fn tone(value: f32, seconds: f64) -> Arc<ClipBuffer> {
        Arc::new(ClipBuffer {
            samples:     vec![value; (seconds * RATE as f64).round() as usize],
            sample_rate: RENDER_SAMPLE_RATE,
        })
    }

    #[test]
    fn clip_pause_clip_lands_at_exact_offsets() {
        // A (2.0s) + pause (1.0s) + B (3.0s) → 6.0s total:
        // [0, 2.0) = A, [2.0, 3.0) = silence, [3.0, 6.0) = B.
        let a = tone(0.5, 2.0);
        let b = tone(-0.25, 3.0);
        let out = render_segments(&[
            RenderSegment::Clip(a),
            RenderSegment::Silence(1.0),
            RenderSegment::Clip(b),
        ])
        .unwrap();

        assert_eq!(out.samples.len(), 6 * RATE);
        assert!((out.duration_seconds() - 6.0).abs() < 1e-9);

        assert!(out.samples[..2 * RATE].iter().all(|&s| s == 0.5));
        assert!(out.samples[2 * RATE..3 * RATE].iter().all(|&s| s == 0.0));
        assert!(out.samples[3 * RATE..].iter().all(|&s| s == -0.25));
    }

    #[test]
    fn output_duration_is_exact_sum_of_segments() {
        let out = render_segments(&[
            RenderSegment::Clip(tone(0.1, 0.5)),
            RenderSegment::Silence(0.25),
            RenderSegment::Clip(tone(0.2, 0.125)),
            RenderSegment::Silence(2.0),
        ])
        .unwrap();
        let expected = ((0.5 + 0.25 + 0.125 + 2.0) * RATE as f64).round() as usize;
        assert_eq!(out.samples.len(), expected);
    }

    #[test]
    fn pause_regions_are_all_zero() {
        let out = render_segments(&[
            RenderSegment::Silence(0.5),
            RenderSegment::Clip(tone(1.0, 0.1)),
            RenderSegment::Silence(0.5),
        ])
        .unwrap();
        let half = RATE / 2;
        assert!(out.samples[..half].iter().all(|&s| s == 0.0));
        assert!(out.samples[out.samples.len() - half..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_duration_pause_contributes_nothing() {
        let out = render_segments(&[
            RenderSegment::Clip(tone(0.3, 1.0)),
            RenderSegment::Silence(0.0),
            RenderSegment::Clip(tone(0.4, 1.0)),
        ])
        .unwrap();
        assert_eq!(out.samples.len(), 2 * RATE);
        // B starts immediately after A — no gap.
        assert_eq!(out.samples[RATE - 1], 0.3);
        assert_eq!(out.samples[RATE], 0.4);
    }

    #[test]
    fn empty_plan_aborts() {
        assert!(matches!(render_segments(&[]), Err(MediaError::EmptyRender)));
    }

    #[test]
    fn all_zero_length_pauses_abort() {
        let plan = [RenderSegment::Silence(0.0), RenderSegment::Silence(0.0)];
        assert!(matches!(render_segments(&plan), Err(MediaError::EmptyRender)));
    }

    #[test]
    fn order_strictly_follows_the_list() {
        let out = render_segments(&[
            RenderSegment::Clip(tone(0.2, 0.01)),
            RenderSegment::Clip(tone(0.7, 0.01)),
        ])
        .unwrap();
        let n = (0.01 * RATE as f64).round() as usize;
        assert_eq!(out.samples[0], 0.2);
        assert_eq!(out.samples[n], 0.7);
    }
}
