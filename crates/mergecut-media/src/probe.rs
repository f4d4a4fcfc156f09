// crates/mergecut-media/src/probe.rs
//
// Metadata-only duration probing. Opens the container, reads the default
// track's codec parameters, and never decodes a packet — probing a long file
// costs the same as probing a short one. The format reader is dropped on
// every exit path, so no handle outlives the call.

use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::MediaError;

/// Playable duration of `path` in seconds.
///
/// Fails with `Decode` when the container cannot be parsed and with
/// `DurationUnknown` when it parses but carries no frame count — both are
/// surfaced per-file at import time, leaving the rest of the timeline alone.
pub fn probe_duration(path: &Path) -> Result<f64, MediaError> {
    let name = path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let file = File::open(path)?;
    let mss  = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| MediaError::Decode { name: name.clone(), reason: e.to_string() })?;

    let track = probed.format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MediaError::Decode {
            name:   name.clone(),
            reason: "no audio track".into(),
        })?;

    let params = &track.codec_params;
    if let Some(n_frames) = params.n_frames {
        // Prefer the track time base when present; fall back to sample rate.
        if let Some(tb) = params.time_base {
            let t = tb.calc_time(n_frames);
            let secs = t.seconds as f64 + t.frac;
            if secs > 0.0 {
                return Ok(secs);
            }
        }
        if let Some(rate) = params.sample_rate {
            let secs = n_frames as f64 / rate as f64;
            if secs > 0.0 {
                return Ok(secs);
            }
        }
    }

    Err(MediaError::DurationUnknown { name })
}
