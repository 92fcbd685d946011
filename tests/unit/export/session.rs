use super::*;
use std::path::Path;

use crate::foundation::core::{Resolution, Rgb8, total_frames};
use crate::timeline::model::Project;

fn project(duration_sec: f64) -> Project {
    Project {
        name: "demo".to_string(),
        resolution: Resolution {
            width: 1280,
            height: 720,
        },
        duration_sec,
        background: Rgb8::new(0, 0, 0),
        media: Vec::new(),
        texts: Vec::new(),
        chats: Vec::new(),
        caption_tracks: Vec::new(),
    }
}

#[test]
fn quality_presets_map_to_increasing_bitrates() {
    assert!(Quality::Low.bitrate_kbps() < Quality::Medium.bitrate_kbps());
    assert!(Quality::Medium.bitrate_kbps() < Quality::High.bitrate_kbps());
    assert!(Quality::High.bitrate_kbps() < Quality::Ultra.bitrate_kbps());
}

#[test]
fn quality_and_codec_parse_from_cli_strings() {
    assert_eq!("ultra".parse::<Quality>().unwrap(), Quality::Ultra);
    assert_eq!("HIGH".parse::<Quality>().unwrap(), Quality::High);
    assert!("extreme".parse::<Quality>().is_err());
    assert_eq!(
        "vp8".parse::<crate::encode::Codec>().unwrap(),
        crate::encode::Codec::Vp8
    );
    assert!("h264".parse::<crate::encode::Codec>().is_err());
}

#[test]
fn settings_reject_unsupported_fps() {
    for fps in SUPPORTED_FPS {
        let settings = ExportSettings {
            fps,
            ..ExportSettings::default()
        };
        assert!(settings.validate().is_ok());
    }
    let settings = ExportSettings {
        fps: 25,
        ..ExportSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn frame_count_is_ceiling_of_duration_times_fps() {
    assert_eq!(total_frames(10.0, 30), 300);
    assert_eq!(total_frames(10.02, 30), 301);
    assert_eq!(total_frames(1.0, 60), 60);
}

#[test]
fn session_rejects_invalid_projects_and_settings() {
    let mut bad_project = project(10.0);
    bad_project.duration_sec = -1.0;
    assert!(
        ExportSession::new(
            bad_project,
            Path::new("."),
            Path::new("."),
            ExportSettings::default()
        )
        .is_err()
    );

    let bad_settings = ExportSettings {
        fps: 23,
        ..ExportSettings::default()
    };
    assert!(ExportSession::new(project(10.0), Path::new("."), Path::new("."), bad_settings).is_err());
}

#[test]
fn output_file_is_named_after_the_project() {
    let session = ExportSession::new(
        project(10.0),
        Path::new("."),
        Path::new("/tmp/renders"),
        ExportSettings::default(),
    )
    .unwrap();
    assert_eq!(
        session.output_path(),
        Path::new("/tmp/renders/demo_transparent.webm")
    );
    assert_eq!(session.status(), ExportStatus::Idle);
}

#[test]
fn opaque_remux_requires_a_completed_export() {
    let session = ExportSession::new(
        project(10.0),
        Path::new("."),
        Path::new("."),
        ExportSettings::default(),
    )
    .unwrap();
    assert!(session.remux_opaque_mp4(Path::new("demo.mp4")).is_err());
}

#[test]
fn cancel_flag_is_shared() {
    use std::sync::atomic::Ordering;

    let session = ExportSession::new(
        project(10.0),
        Path::new("."),
        Path::new("."),
        ExportSettings::default(),
    )
    .unwrap();
    let flag = session.cancel_flag();
    assert!(!flag.load(Ordering::Relaxed));
    flag.store(true, Ordering::Relaxed);
    assert!(session.cancel_flag().load(Ordering::Relaxed));
}
