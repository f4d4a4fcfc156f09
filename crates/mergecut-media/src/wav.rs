// crates/mergecut-media/src/wav.rs
//
// WAV serialization for export. 32-bit IEEE float samples so the file is a
// bit-exact image of the rendered buffer — no quantization on the way out.

use std::io::Cursor;

use chrono::{DateTime, TimeZone};
use hound::{SampleFormat, WavSpec, WavWriter};

use mergecut_core::media_types::ClipBuffer;
use crate::error::MediaError;

/// Serialize `buffer` to an in-memory WAV file (header + interleaved
/// little-endian float samples). Pure and synchronous — the caller decides
/// where the bytes go.
pub fn serialize_wav(buffer: &ClipBuffer) -> Result<Vec<u8>, MediaError> {
    let spec = WavSpec {
        channels:        1,
        sample_rate:     buffer.sample_rate,
        bits_per_sample: 32,
        sample_format:   SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &s in &buffer.samples {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Timestamped default filename for the save dialog:
/// `merged-audio-<YYYY-MM-DDTHH-MM-SS>.wav`. Colons are replaced by hyphens
/// so the name is valid on every filesystem.
pub fn export_filename<Tz: TimeZone>(now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("merged-audio-{}.wav", now.format("%Y-%m-%dT%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mergecut_core::media_types::RENDER_SAMPLE_RATE;

    #[test]
    fn wav_round_trips_through_hound() {
        let buffer = ClipBuffer {
            samples:     vec![0.0, 0.5, -0.5, 1.0, -1.0],
            sample_rate: RENDER_SAMPLE_RATE,
        };
        let bytes = serialize_wav(&buffer).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, RENDER_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let samples: Vec<f32> = reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(samples, buffer.samples);
    }

    #[test]
    fn wav_duration_matches_buffer() {
        let buffer = ClipBuffer {
            samples:     vec![0.25; RENDER_SAMPLE_RATE as usize], // exactly 1s
            sample_rate: RENDER_SAMPLE_RATE,
        };
        let bytes = serialize_wav(&buffer).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.duration(), RENDER_SAMPLE_RATE);
    }

    #[test]
    fn empty_buffer_still_produces_a_valid_header() {
        let buffer = ClipBuffer { samples: Vec::new(), sample_rate: RENDER_SAMPLE_RATE };
        let bytes = serialize_wav(&buffer).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.duration(), 0);
    }

    #[test]
    fn filename_is_timestamped_and_colon_free() {
        let now = DateTime::parse_from_rfc3339("2026-08-26T14:30:05+00:00").unwrap();
        let name = export_filename(now);
        assert_eq!(name, "merged-audio-2026-08-26T14-30-05.wav");
        assert!(!name.contains(':'));
    }
}
