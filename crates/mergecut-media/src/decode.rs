// crates/mergecut-media/src/decode.rs
//
// Full-file decode: any symphonia-supported container → mono f32 PCM at the
// pinned render rate. Used both for per-clip previews and for the offline
// merge, so a clip decodes identically in both paths.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use mergecut_core::media_types::{ClipBuffer, RENDER_SAMPLE_RATE};
use crate::error::MediaError;

/// Decode `path` completely: probe the container, decode every packet of the
/// default audio track, downmix to mono by channel averaging, and resample to
/// `RENDER_SAMPLE_RATE`.
///
/// Each call produces a fresh buffer — callers that re-decode a clip drop the
/// previous buffer by replacing it, so repeated edits never accumulate PCM.
pub fn decode_clip(path: &Path) -> Result<ClipBuffer, MediaError> {
    let name = display_name(path);

    let file = File::open(path)?;
    let mss  = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| MediaError::Decode { name: name.clone(), reason: e.to_string() })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MediaError::Decode {
            name:   name.clone(),
            reason: "no audio track".into(),
        })?;
    let track_id = track.id;

    let source_rate = track.codec_params.sample_rate.ok_or_else(|| MediaError::Decode {
        name:   name.clone(),
        reason: "sample rate unknown".into(),
    })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| MediaError::Decode { name: name.clone(), reason: e.to_string() })?;

    // Interleaved staging buffer, created lazily on the first decoded frame
    // (the real spec isn't known until then).
    let mut staging: Option<SampleBuffer<f32>> = None;
    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break; // end of stream
            }
            Err(e) => {
                return Err(MediaError::Decode { name: name.clone(), reason: e.to_string() });
            }
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // A corrupt packet poisons the whole clip — the merge contract is
            // all-or-nothing, and a preview of half a clip would lie about
            // the duration used by the renderer.
            Err(e) => return Err(MediaError::Decode { name: name.clone(), reason: e.to_string() }),
        };

        let spec     = *decoded.spec();
        let channels = spec.channels.count().max(1);

        // Recreate the staging buffer if this packet is larger than anything
        // seen so far (rare, but copy_interleaved_ref panics on overflow).
        let needed = decoded.frames() * channels;
        if staging.as_ref().map_or(true, |b| b.capacity() < needed) {
            staging = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }
        if let Some(sb) = staging.as_mut() {
            sb.copy_interleaved_ref(decoded);
            mono.reserve(sb.samples().len() / channels);
            for frame in sb.samples().chunks_exact(channels) {
                mono.push(frame.iter().sum::<f32>() / channels as f32);
            }
        }
    }

    let samples = resample_linear(&mono, source_rate, RENDER_SAMPLE_RATE);
    Ok(ClipBuffer { samples, sample_rate: RENDER_SAMPLE_RATE })
}

/// Linear-interpolation resampler. Good enough for speech/music previews and
/// keeps the merge offsets sample-exact without pulling in a DSP crate.
pub(crate) fn resample_linear(input: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || input.is_empty() {
        return input.to_vec();
    }
    let out_len = (input.len() as f64 * to as f64 / from as f64).round() as usize;
    let step    = from as f64 / to as f64;

    let mut out = Vec::with_capacity(out_len);
    let last = input.len() - 1;
    for i in 0..out_len {
        let pos  = i as f64 * step;
        let i0   = (pos as usize).min(last);
        let i1   = (i0 + 1).min(last);
        let frac = (pos - i0 as f64) as f32;
        out.push(input[i0] + (input[i1] - input[i0]) * frac);
    }
    out
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_identity_when_rates_match() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(resample_linear(&input, 44_100, 44_100), input);
    }

    #[test]
    fn resample_scales_length_by_rate_ratio() {
        let input = vec![0.0; 48_000];
        let out = resample_linear(&input, 48_000, 44_100);
        assert_eq!(out.len(), 44_100);
    }

    #[test]
    fn resample_interpolates_between_neighbors() {
        // 1 Hz → 2 Hz doubles the length; odd indices sit halfway between.
        let input = vec![0.0, 1.0];
        let out = resample_linear(&input, 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert!((out[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn resample_empty_input_stays_empty() {
        assert!(resample_linear(&[], 48_000, 44_100).is_empty());
    }

    #[test]
    fn decode_rejects_non_audio_file() {
        let dir = std::env::temp_dir().join("mergecut_decode_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("not_audio.mp3");
        std::fs::write(&path, b"definitely not an mp3").unwrap();

        let err = decode_clip(&path).unwrap_err();
        assert!(matches!(err, MediaError::Decode { .. }));
    }

    #[test]
    fn decode_missing_file_is_io_error() {
        let err = decode_clip(Path::new("/nonexistent/clip.flac")).unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
    }
}
