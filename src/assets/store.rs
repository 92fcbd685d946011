use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::media::{
    self, AudioPcm, MIX_SAMPLE_RATE, VideoSourceInfo, decode_audio_f32_stereo, probe_video,
};
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::timeline::model::{MediaKind, Project};

/// Decoded video frames kept hot during rendering. Sized for a few overlapping clips.
const FRAME_CACHE_CAP: usize = 16;

/// Video frame timestamps are quantized to milliseconds for frame-cache keys.
const CACHE_TIME_QUANTUM: f64 = 1000.0;

/// Font files tried when an element does not name one.
const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

#[derive(Clone, Debug)]
/// A decoded still image, straight-alpha RGBA8.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major straight-alpha pixels, `width * height * 4` bytes.
    pub rgba8: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// A probed video plus its predecoded audio.
pub struct PreparedVideo {
    /// Probed stream properties.
    pub info: VideoSourceInfo,
    /// Full-length stereo PCM at [`MIX_SAMPLE_RATE`], absent for silent or muted sources.
    pub audio: Option<Arc<AudioPcm>>,
}

/// Every IO-backed resource an export needs, loaded up front during Preparing.
///
/// A single element's load failure is recorded rather than propagated: the element renders
/// degraded (skipped) for the whole export while everything else proceeds. Only video frame
/// decode happens lazily during rendering, behind a small LRU.
pub struct PreparedAssets {
    base_dir: PathBuf,
    images: HashMap<String, PreparedImage>,
    videos: HashMap<String, PreparedVideo>,
    fonts: HashMap<String, Arc<Vec<u8>>>,
    default_font: Option<Arc<Vec<u8>>>,
    failed: HashSet<String>,
    frame_cache: HashMap<(String, u64), Arc<Vec<u8>>>,
    frame_lru: VecDeque<(String, u64)>,
}

impl PreparedAssets {
    /// An empty store resolving sources relative to `base_dir`.
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            images: HashMap::new(),
            videos: HashMap::new(),
            fonts: HashMap::new(),
            default_font: load_default_font(),
            failed: HashSet::new(),
            frame_cache: HashMap::new(),
            frame_lru: VecDeque::new(),
        }
    }

    /// Preload everything `project` references.
    #[tracing::instrument(skip_all, fields(media = project.media.len(), texts = project.texts.len()))]
    pub fn prepare(project: &Project, base_dir: &Path) -> Self {
        let mut store = Self::new(base_dir);

        for clip in &project.media {
            let result = match clip.kind {
                MediaKind::Image => store.load_image(&clip.source),
                MediaKind::Video => store.load_video(&clip.source, clip.gain() > 0.0),
            };
            if let Err(e) = result {
                tracing::warn!(clip = %clip.id, "media preload failed, clip will be skipped: {e}");
                store.failed.insert(clip.id.clone());
            }
        }

        for text in &project.texts {
            if let Some(font) = &text.font
                && let Err(e) = store.load_font(font)
            {
                tracing::warn!(text = %text.id, "font preload failed, overlay will be skipped: {e}");
                store.failed.insert(text.id.clone());
            }
        }

        for chat in &project.chats {
            for msg in &chat.messages {
                if let Some(avatar) = &msg.avatar
                    && let Err(e) = store.load_image(avatar)
                {
                    // A missing avatar degrades to a placeholder disc, not a skip.
                    tracing::warn!(chat = %chat.id, "avatar preload failed: {e}");
                }
            }
        }

        for track in &project.caption_tracks {
            if let Some(font) = &track.style.font
                && let Err(e) = store.load_font(font)
            {
                tracing::warn!(track = %track.id, "caption font preload failed: {e}");
                store.failed.insert(track.id.clone());
            }
        }

        store
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let p = Path::new(source);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    fn load_image(&mut self, source: &str) -> GreenroomResult<()> {
        if self.images.contains_key(source) {
            return Ok(());
        }
        let path = self.resolve(source);
        let img = image::open(&path)
            .map_err(|e| {
                GreenroomError::resource(format!("decode image '{}': {e}", path.display()))
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        self.images.insert(
            source.to_string(),
            PreparedImage {
                width,
                height,
                rgba8: Arc::new(img.into_raw()),
            },
        );
        Ok(())
    }

    fn load_video(&mut self, source: &str, wants_audio: bool) -> GreenroomResult<()> {
        if self.videos.contains_key(source) {
            return Ok(());
        }
        let path = self.resolve(source);
        let info = probe_video(&path)?;
        let audio = if wants_audio && info.has_audio {
            let pcm = decode_audio_f32_stereo(&path, MIX_SAMPLE_RATE)?;
            (!pcm.interleaved_f32.is_empty()).then(|| Arc::new(pcm))
        } else {
            None
        };
        self.videos
            .insert(source.to_string(), PreparedVideo { info, audio });
        Ok(())
    }

    fn load_font(&mut self, source: &str) -> GreenroomResult<()> {
        if self.fonts.contains_key(source) {
            return Ok(());
        }
        let path = self.resolve(source);
        let bytes = std::fs::read(&path).map_err(|e| {
            GreenroomError::resource(format!("read font '{}': {e}", path.display()))
        })?;
        self.fonts.insert(source.to_string(), Arc::new(bytes));
        Ok(())
    }

    /// Whether `element_id`'s resources failed to load during Preparing.
    pub fn is_failed(&self, element_id: &str) -> bool {
        self.failed.contains(element_id)
    }

    /// Decoded still image for `source`, if prepared.
    pub fn image(&self, source: &str) -> Option<&PreparedImage> {
        self.images.get(source)
    }

    /// Prepared video for `source`, if prepared.
    pub fn video(&self, source: &str) -> Option<&PreparedVideo> {
        self.videos.get(source)
    }

    /// Font bytes for `source`, falling back to the default font when `source` is `None`.
    pub fn font(&self, source: Option<&str>) -> Option<Arc<Vec<u8>>> {
        match source {
            Some(s) => self.fonts.get(s).cloned(),
            None => self.default_font.clone(),
        }
    }

    /// Every prepared video keyed by source, for audio mixing.
    pub fn videos(&self) -> impl Iterator<Item = (&str, &PreparedVideo)> {
        self.videos.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Straight-alpha RGBA8 frame of `source` at `source_time_sec`, through the LRU.
    pub fn video_frame(
        &mut self,
        source: &str,
        source_time_sec: f64,
    ) -> GreenroomResult<Arc<Vec<u8>>> {
        let key = (
            source.to_string(),
            (source_time_sec * CACHE_TIME_QUANTUM).round().max(0.0) as u64,
        );
        if let Some(frame) = self.frame_cache.get(&key) {
            return Ok(frame.clone());
        }

        let info = self
            .videos
            .get(source)
            .map(|v| v.info.clone())
            .ok_or_else(|| {
                GreenroomError::resource(format!("video '{source}' was not prepared"))
            })?;
        let frame = Arc::new(media::decode_video_frame_rgba8(&info, source_time_sec)?);

        if self.frame_lru.len() >= FRAME_CACHE_CAP
            && let Some(evicted) = self.frame_lru.pop_front()
        {
            self.frame_cache.remove(&evicted);
        }
        self.frame_cache.insert(key.clone(), frame.clone());
        self.frame_lru.push_back(key);
        Ok(frame)
    }

    /// Register an already-decoded image under `key`. Used by embedders and tests to supply
    /// pixels without touching the filesystem.
    pub fn insert_image(&mut self, key: &str, width: u32, height: u32, rgba8: Vec<u8>) {
        self.images.insert(
            key.to_string(),
            PreparedImage {
                width,
                height,
                rgba8: Arc::new(rgba8),
            },
        );
    }

    /// Register font bytes under `key`.
    pub fn insert_font(&mut self, key: &str, bytes: Vec<u8>) {
        self.fonts.insert(key.to_string(), Arc::new(bytes));
    }

    /// Drop all cached decoded frames.
    pub fn clear_frame_cache(&mut self) {
        self.frame_cache.clear();
        self.frame_lru.clear();
    }
}

fn load_default_font() -> Option<Arc<Vec<u8>>> {
    for candidate in DEFAULT_FONT_CANDIDATES {
        if let Ok(bytes) = std::fs::read(candidate) {
            return Some(Arc::new(bytes));
        }
    }
    tracing::debug!("no default font found, unstyled text will render degraded");
    None
}
