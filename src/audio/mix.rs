use std::{path::Path, sync::Arc};

use crate::assets::media::{self, AudioPcm, clip_source_time_sec};
use crate::assets::store::PreparedAssets;
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::timeline::model::{MediaKind, Project};

#[derive(Clone, Debug)]
/// One audible clip's contribution to the mix.
pub struct AudioSegment {
    /// First mix sample (per channel) this segment writes.
    pub timeline_start_sample: u64,
    /// One-past-last mix sample this segment writes.
    pub timeline_end_sample: u64,
    /// Intra-source time at the segment start, in seconds.
    pub source_start_sec: f64,
    /// Per-clip gain, `volume_pct / 100` clamped to `[0, 1]`.
    pub gain: f32,
    /// Predecoded source PCM.
    pub source: Arc<AudioPcm>,
}

#[derive(Clone, Debug)]
/// Everything needed to produce the final interleaved mix.
pub struct AudioManifest {
    /// Mix sample rate.
    pub sample_rate: u32,
    /// Mix channel count (always 2).
    pub channels: u16,
    /// Mix length in per-channel samples.
    pub total_samples: u64,
    /// Contributing segments.
    pub segments: Vec<AudioSegment>,
}

/// Collect every audible clip's window into a mix manifest covering `[0, duration]`.
///
/// A clip contributes when it is a video with positive volume whose source carried audio.
/// Each contribution is the clip's visibility window intersected with the export range,
/// played from the clip's trim offset.
pub fn build_audio_manifest(
    project: &Project,
    assets: &PreparedAssets,
) -> GreenroomResult<AudioManifest> {
    if !project.duration_sec.is_finite() || project.duration_sec <= 0.0 {
        return Err(GreenroomError::validation(
            "audio manifest duration must be > 0",
        ));
    }

    let sample_rate = media::MIX_SAMPLE_RATE;
    let mut segments = Vec::<AudioSegment>::new();
    for clip in &project.media {
        if clip.kind != MediaKind::Video || clip.gain() <= 0.0 {
            continue;
        }
        let Some(audio) = assets.video(&clip.source).and_then(|v| v.audio.clone()) else {
            continue;
        };

        let start_sec = clip.placement.range.start_sec.max(0.0);
        let end_sec = clip.placement.range.end_sec.min(project.duration_sec);
        if start_sec >= end_sec {
            continue;
        }

        segments.push(AudioSegment {
            timeline_start_sample: sec_to_sample(start_sec, sample_rate),
            timeline_end_sample: sec_to_sample(end_sec, sample_rate),
            source_start_sec: clip_source_time_sec(clip, start_sec),
            gain: clip.gain(),
            source: audio,
        });
    }

    Ok(AudioManifest {
        sample_rate,
        channels: 2,
        total_samples: sec_to_sample(project.duration_sec, sample_rate),
        segments,
    })
}

/// Mix all segments into one interleaved stereo buffer, linearly interpolating source
/// positions and clamping the result to `[-1, 1]`.
pub fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        let src = &seg.source.interleaved_f32;
        let src_channels = usize::from(seg.source.channels.max(1));
        let src_frames = src.len() / src_channels;
        if src_frames == 0 || seg.timeline_end_sample <= seg.timeline_start_sample {
            continue;
        }

        for dst_sample in seg.timeline_start_sample..seg.timeline_end_sample.min(manifest.total_samples) {
            let rel_sec =
                ((dst_sample - seg.timeline_start_sample) as f64) / f64::from(manifest.sample_rate);
            let src_pos = (seg.source_start_sec + rel_sec) * f64::from(seg.source.sample_rate);
            if !src_pos.is_finite() || src_pos < 0.0 {
                break;
            }
            let src_frame0 = src_pos.floor() as usize;
            if src_frame0 >= src_frames {
                break;
            }
            let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
            let frac = (src_pos - src_frame0 as f64) as f32;

            let (l, r) = if src_channels == 1 {
                let v0 = src[src_frame0];
                let v1 = src[src_frame1];
                let v = v0 + (v1 - v0) * frac;
                (v, v)
            } else {
                let i0 = src_frame0 * src_channels;
                let i1 = src_frame1 * src_channels;
                (
                    src[i0] + (src[i1] - src[i0]) * frac,
                    src[i0 + 1] + (src[i1 + 1] - src[i0 + 1]) * frac,
                )
            };

            let dst_idx = dst_sample as usize * usize::from(manifest.channels);
            out[dst_idx] += l * seg.gain;
            out[dst_idx + 1] += r * seg.gain;
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Write interleaved f32 samples as raw little-endian bytes for ffmpeg's `f32le` input.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> GreenroomResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            GreenroomError::encoder(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        GreenroomError::encoder(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

fn sec_to_sample(sec: f64, sample_rate: u32) -> u64 {
    (sec * f64::from(sample_rate)).round().max(0.0) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
