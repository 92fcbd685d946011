use super::*;

fn pcm(sample_rate: u32, channels: u16, interleaved_f32: Vec<f32>) -> Arc<AudioPcm> {
    Arc::new(AudioPcm {
        sample_rate,
        channels,
        interleaved_f32,
    })
}

fn manifest(sample_rate: u32, total_samples: u64, segments: Vec<AudioSegment>) -> AudioManifest {
    AudioManifest {
        sample_rate,
        channels: 2,
        total_samples,
        segments,
    }
}

#[test]
fn sec_to_sample_rounds_to_nearest() {
    assert_eq!(sec_to_sample(1.0, 48_000), 48_000);
    assert_eq!(sec_to_sample(0.5, 10), 5);
    assert_eq!(sec_to_sample(0.44, 10), 4);
    assert_eq!(sec_to_sample(-1.0, 10), 0);
}

#[test]
fn mono_source_duplicates_into_both_channels_with_gain() {
    let seg = AudioSegment {
        timeline_start_sample: 2,
        timeline_end_sample: 6,
        source_start_sec: 0.0,
        gain: 0.5,
        source: pcm(10, 1, vec![1.0; 10]),
    };
    let out = mix_manifest(&manifest(10, 8, vec![seg]));

    assert_eq!(out.len(), 16);
    assert_eq!(out[0], 0.0);
    assert_eq!(out[1], 0.0);
    assert_eq!(out[4], 0.5);
    assert_eq!(out[5], 0.5);
    assert_eq!(out[11], 0.5);
    // Past the segment end the mix stays silent.
    assert_eq!(out[12], 0.0);
}

#[test]
fn stereo_source_interpolates_between_frames() {
    // Mix at twice the source rate: the odd output frame sits halfway between source frames.
    let seg = AudioSegment {
        timeline_start_sample: 0,
        timeline_end_sample: 2,
        source_start_sec: 0.0,
        gain: 1.0,
        source: pcm(10, 2, vec![0.0, 1.0, 1.0, 0.0]),
    };
    let out = mix_manifest(&manifest(20, 2, vec![seg]));

    assert_eq!(out[0], 0.0);
    assert_eq!(out[1], 1.0);
    assert!((out[2] - 0.5).abs() < 1e-6);
    assert!((out[3] - 0.5).abs() < 1e-6);
}

#[test]
fn overlapping_segments_sum_and_clamp() {
    let make = || AudioSegment {
        timeline_start_sample: 0,
        timeline_end_sample: 4,
        source_start_sec: 0.0,
        gain: 1.0,
        source: pcm(10, 1, vec![0.8; 10]),
    };
    let out = mix_manifest(&manifest(10, 4, vec![make(), make()]));
    for &s in &out {
        assert_eq!(s, 1.0);
    }
}

#[test]
fn segment_past_source_end_stops_writing() {
    let seg = AudioSegment {
        timeline_start_sample: 0,
        timeline_end_sample: 8,
        source_start_sec: 0.0,
        gain: 1.0,
        source: pcm(10, 1, vec![1.0; 3]),
    };
    let out = mix_manifest(&manifest(10, 8, vec![seg]));
    assert_eq!(out[0], 1.0);
    assert_eq!(out[4], 1.0);
    // Only three source frames exist; the rest of the window is silence.
    assert_eq!(out[6], 0.0);
    assert_eq!(out[15], 0.0);
}

#[test]
fn trim_offsets_the_source_read_position() {
    let seg = AudioSegment {
        timeline_start_sample: 0,
        timeline_end_sample: 2,
        source_start_sec: 0.5,
        gain: 1.0,
        source: pcm(10, 1, vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.9, 0.9, 0.9, 0.9, 0.9]),
    };
    let out = mix_manifest(&manifest(10, 2, vec![seg]));
    assert!((out[0] - 0.9).abs() < 1e-6);
}

#[test]
fn manifest_for_silent_project_has_no_segments() {
    use crate::foundation::core::{Resolution, Rgb8};
    use crate::timeline::model::Project;

    let project = Project {
        name: "quiet".to_string(),
        resolution: Resolution {
            width: 320,
            height: 180,
        },
        duration_sec: 2.0,
        background: Rgb8::new(0, 0, 0),
        media: Vec::new(),
        texts: Vec::new(),
        chats: Vec::new(),
        caption_tracks: Vec::new(),
    };
    let assets = PreparedAssets::new(Path::new("."));
    let manifest = build_audio_manifest(&project, &assets).unwrap();

    assert!(manifest.segments.is_empty());
    assert_eq!(manifest.sample_rate, media::MIX_SAMPLE_RATE);
    assert_eq!(manifest.channels, 2);
    assert_eq!(manifest.total_samples, 2 * u64::from(media::MIX_SAMPLE_RATE));
}
