//! The export session: a synchronous state machine driving render and encode.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::assets::store::PreparedAssets;
use crate::audio::mix::{build_audio_manifest, mix_manifest, write_mix_to_f32le_file};
use crate::encode::ffmpeg::{EncodeConfig, FfmpegEncoder};
use crate::export::{ExportSettings, ExportStatus, Progress};
use crate::foundation::core::total_frames;
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::render::compositor::FrameCompositor;
use crate::timeline::model::Project;

/// Removes a scratch file when the session ends, on every exit path.
struct TempFileGuard(PathBuf);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// Drives one export from project to finished WebM.
///
/// The session is synchronous; callers wanting cancellation hand the returned flag to another
/// thread and flip it. Progress lands in the callback passed to [`ExportSession::run`].
pub struct ExportSession {
    project: Project,
    base_dir: PathBuf,
    out_dir: PathBuf,
    settings: ExportSettings,
    cancel: Arc<AtomicBool>,
    status: ExportStatus,
}

impl ExportSession {
    /// Validate inputs and build an idle session.
    pub fn new(
        project: Project,
        base_dir: &Path,
        out_dir: &Path,
        settings: ExportSettings,
    ) -> GreenroomResult<Self> {
        project.validate()?;
        settings.validate()?;
        Ok(Self {
            project,
            base_dir: base_dir.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
            settings,
            cancel: Arc::new(AtomicBool::new(false)),
            status: ExportStatus::Idle,
        })
    }

    /// Cooperative cancellation flag. Setting it aborts the export at the next frame boundary.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Current stage.
    pub fn status(&self) -> ExportStatus {
        self.status
    }

    /// The file the export will produce.
    pub fn output_path(&self) -> PathBuf {
        self.out_dir
            .join(format!("{}_transparent.webm", self.project.name))
    }

    /// Run the export to completion, cancellation or failure.
    ///
    /// On any terminal failure the encoder is aborted and partial output removed before the
    /// error propagates; the session ends in [`ExportStatus::Failed`].
    #[tracing::instrument(skip(self, progress), fields(project = %self.project.name))]
    pub fn run(&mut self, mut progress: impl FnMut(&Progress)) -> GreenroomResult<PathBuf> {
        let fps = self.settings.fps;
        let total = total_frames(self.project.duration_sec, fps);

        self.status = ExportStatus::Preparing;
        progress(&self.report(0, total, 0.0));
        tracing::info!(total_frames = total, fps, "export starting");

        let assets = PreparedAssets::prepare(&self.project, &self.base_dir);

        let (audio_path, _audio_guard) = match self.prepare_audio(&assets) {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };

        let cfg = EncodeConfig {
            width: self.project.resolution.width,
            height: self.project.resolution.height,
            fps,
            codec: self.settings.codec,
            bitrate_kbps: self.settings.quality.bitrate_kbps(),
            out_path: self.output_path(),
            audio_f32le: audio_path,
        };
        let mut encoder = match FfmpegEncoder::new(cfg) {
            Ok(enc) => enc,
            Err(e) => return self.fail(e),
        };
        let mut compositor = FrameCompositor::new(&self.project, assets);

        self.status = ExportStatus::Recording;
        let started = Instant::now();
        for frame_idx in 0..total {
            if self.cancel.load(Ordering::Relaxed) {
                encoder.abort();
                tracing::info!(processed = frame_idx, "export cancelled");
                return self.fail(GreenroomError::Cancelled);
            }

            let t = frame_idx as f64 / f64::from(fps);
            let mut frame = match compositor.render_frame(t) {
                Ok(frame) => frame,
                Err(e) => {
                    encoder.abort();
                    return self.fail(e);
                }
            };
            frame.unpremultiply_in_place();
            if let Err(e) = encoder.write_frame(&frame) {
                encoder.abort();
                return self.fail(e);
            }

            progress(&self.report(frame_idx + 1, total, started.elapsed().as_secs_f64()));
        }

        self.status = ExportStatus::Finalizing;
        progress(&self.report(total, total, started.elapsed().as_secs_f64()));
        let out_path = match encoder.finish() {
            Ok(path) => path,
            Err(e) => return self.fail(e),
        };

        self.status = ExportStatus::Completed;
        progress(&self.report(total, total, started.elapsed().as_secs_f64()));
        tracing::info!(out = %out_path.display(), "export complete");
        Ok(out_path)
    }

    /// Flatten the finished WebM over the project background into an opaque MP4 at `mp4`.
    ///
    /// A second, lossy pass for players without VP9 alpha support. Only valid once the
    /// session has completed.
    pub fn remux_opaque_mp4(&self, mp4: &Path) -> GreenroomResult<PathBuf> {
        if self.status != ExportStatus::Completed {
            return Err(GreenroomError::encoder(
                "opaque MP4 remux requires a completed export",
            ));
        }
        crate::encode::ffmpeg::remux_opaque_mp4(
            &self.output_path(),
            mp4,
            self.project.background,
            self.project.resolution.width,
            self.project.resolution.height,
            self.settings.fps,
        )?;
        Ok(mp4.to_path_buf())
    }

    /// Mix the project's audio to a scratch f32le file, if any clip is audible.
    fn prepare_audio(
        &self,
        assets: &PreparedAssets,
    ) -> GreenroomResult<(Option<PathBuf>, Option<TempFileGuard>)> {
        let manifest = build_audio_manifest(&self.project, assets)?;
        if manifest.segments.is_empty() {
            return Ok((None, None));
        }

        let samples = mix_manifest(&manifest);
        let path = self
            .out_dir
            .join(format!("{}_audio_mix.f32le", self.project.name));
        write_mix_to_f32le_file(&samples, &path)?;
        Ok((Some(path.clone()), Some(TempFileGuard(path))))
    }

    fn report(&self, processed: u64, total: u64, elapsed_sec: f64) -> Progress {
        let percent = if total == 0 {
            100.0
        } else {
            processed as f64 / total as f64 * 100.0
        };
        let estimated_remaining_sec = (processed > 0 && matches!(self.status, ExportStatus::Recording))
            .then(|| elapsed_sec / processed as f64 * (total - processed) as f64);
        Progress {
            status: self.status,
            percent,
            processed_frames: processed,
            total_frames: total,
            elapsed_sec,
            estimated_remaining_sec,
        }
    }

    fn fail<T>(&mut self, err: GreenroomError) -> GreenroomResult<T> {
        self.status = ExportStatus::Failed;
        tracing::error!(error = %err, "export failed");
        Err(err)
    }
}
