use std::path::Path;

use crate::animation::spec::AnimationSpec;
use crate::chroma::ChromaKeyParams;
use crate::foundation::core::{Rect, Resolution, Rgb8, TimeRange};
use crate::foundation::error::{GreenroomError, GreenroomResult};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A complete project: canvas, duration and every timeline element.
///
/// A project is a pure data model, loaded from JSON or built programmatically. Rendering and
/// export only ever read it.
pub struct Project {
    /// Project name; the export output is named `{name}_transparent.webm`.
    pub name: String,
    /// Output canvas dimensions.
    pub resolution: Resolution,
    /// Total timeline duration in seconds.
    pub duration_sec: f64,
    /// Canvas background when no visible clip uses chroma key.
    #[serde(default = "default_background")]
    pub background: Rgb8,
    /// Video and image clips.
    #[serde(default)]
    pub media: Vec<MediaClip>,
    /// Text overlays.
    #[serde(default)]
    pub texts: Vec<TextOverlay>,
    /// Chat-simulation overlays.
    #[serde(default)]
    pub chats: Vec<ChatOverlay>,
    /// Caption tracks, rendered above everything else.
    #[serde(default)]
    pub caption_tracks: Vec<CaptionTrack>,
}

fn default_background() -> Rgb8 {
    Rgb8::new(0, 0, 0)
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Timeline placement shared by every element type.
pub struct Placement {
    /// Visibility window on the timeline, inclusive on both ends.
    pub range: TimeRange,
    /// Track index; lower rows paint in front when no explicit z-index is set.
    pub row: u32,
    /// Explicit paint-order override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// Opacity percentage in `[0, 100]`.
    #[serde(default = "default_opacity_pct")]
    pub opacity_pct: f64,
}

fn default_opacity_pct() -> f64 {
    100.0
}

impl Placement {
    /// Placement covering `[start, end]` on `row` at full opacity.
    pub fn new(start_sec: f64, end_sec: f64, row: u32) -> GreenroomResult<Self> {
        Ok(Self {
            range: TimeRange::new(start_sec, end_sec)?,
            row,
            z_index: None,
            opacity_pct: default_opacity_pct(),
        })
    }

    /// Retime the element. An invalid window is rejected and the prior timing is retained.
    pub fn set_range(&mut self, start_sec: f64, end_sec: f64) -> GreenroomResult<()> {
        self.range = TimeRange::new(start_sec, end_sec)?;
        Ok(())
    }

    /// Opacity normalized to `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        (self.opacity_pct / 100.0).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Explicit element geometry in canvas pixels. Absent geometry means full canvas.
pub struct Geometry {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Geometry {
    /// The geometry as a rectangle.
    pub fn rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn validate(self, id: &str) -> GreenroomResult<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !v.is_finite() {
                return Err(GreenroomError::validation(format!(
                    "element '{id}' geometry {name} must be finite"
                )));
            }
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(GreenroomError::validation(format!(
                "element '{id}' geometry width/height must be > 0"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Kind of media a clip points at.
pub enum MediaKind {
    /// Still image, shown for the whole window.
    Image,
    /// Video file, played from `trim_start_sec`.
    Video,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A video or image clip on the timeline.
pub struct MediaClip {
    /// Clip identifier, stable within a project.
    pub id: String,
    /// Path to the source file, relative to the project file.
    pub source: String,
    /// Image or video.
    pub kind: MediaKind,
    /// Timeline placement.
    pub placement: Placement,
    /// Target rectangle; full canvas when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    /// Source offset in seconds at the window start (video only).
    #[serde(default)]
    pub trim_start_sec: f64,
    /// Audio volume percentage in `[0, 100]` (video only).
    #[serde(default = "default_opacity_pct")]
    pub volume_pct: f64,
    /// Background removal; `None` disables keying for this clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chroma_key: Option<ChromaKeyParams>,
    /// Enter/exit/loop animation.
    #[serde(default)]
    pub animation: AnimationSpec,
}

impl MediaClip {
    /// Per-clip audio gain in `[0, 1]`.
    pub fn gain(&self) -> f32 {
        (self.volume_pct / 100.0).clamp(0.0, 1.0) as f32
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Case transform applied before measuring and wrapping.
pub enum TextCase {
    /// Render the text as authored.
    #[default]
    None,
    /// Uppercase.
    Upper,
    /// Lowercase.
    Lower,
    /// Capitalize the first letter of each word.
    Capitalize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Background shape drawn behind a text overlay.
pub enum BackgroundShape {
    /// Sharp-cornered rectangle.
    Rectangle,
    /// Rounded rectangle.
    Rounded,
    /// Fully rounded capsule.
    Pill,
    /// Ellipse enclosing the text block.
    Bubble,
    /// Skewed highlighter stripe behind the text.
    Marker,
    /// Thick bar under the text block only.
    Underline,
    /// Rounded rectangle with a tail at the bottom left.
    SpeechBubble,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Background style for a text overlay.
pub struct TextBackground {
    /// Shape variant.
    pub shape: BackgroundShape,
    /// Fill color.
    pub color: Rgb8,
    /// Background opacity percentage in `[0, 100]`.
    #[serde(default = "default_opacity_pct")]
    pub opacity_pct: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Outline stroke drawn behind the text fill.
pub struct TextOutline {
    /// Outline color.
    pub color: Rgb8,
    /// Outline thickness in pixels.
    pub width_px: f32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// An animated text overlay.
pub struct TextOverlay {
    /// Element identifier.
    pub id: String,
    /// UTF-8 text content.
    pub content: String,
    /// Path to a font file; the renderer's default font when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Text color.
    pub color: Rgb8,
    /// Case transform.
    #[serde(default)]
    pub case: TextCase,
    /// Background shape behind the wrapped text block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<TextBackground>,
    /// Outline stroke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<TextOutline>,
    /// Underline the text.
    #[serde(default)]
    pub underline: bool,
    /// Timeline placement.
    pub placement: Placement,
    /// Position and wrap width; centered full-canvas block when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    /// Enter/exit/loop animation, keyed off the text center.
    #[serde(default)]
    pub animation: AnimationSpec,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Chat overlay styling variant.
pub enum ChatPlatform {
    /// Instagram direct-message styling.
    Instagram,
    /// WhatsApp styling.
    WhatsApp,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// One message inside a chat overlay.
pub struct ChatMessage {
    /// Message text.
    pub text: String,
    /// `true` for the right-aligned "own" side of the conversation.
    #[serde(default)]
    pub outgoing: bool,
    /// Sender display name (incoming messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Path to an avatar image (incoming messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Authored reveal time in seconds relative to the overlay's window start.
    /// When unset the reveal schedule is derived from message length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appear_at_sec: Option<f64>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A chat-simulation overlay revealing messages over time.
pub struct ChatOverlay {
    /// Element identifier.
    pub id: String,
    /// Styling variant.
    pub platform: ChatPlatform,
    /// Conversation title shown in the header.
    #[serde(default)]
    pub title: String,
    /// Messages in conversation order.
    pub messages: Vec<ChatMessage>,
    /// Timeline placement.
    pub placement: Placement,
    /// Target rectangle; scale-fit centered on the canvas when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Vertical anchor for caption placement.
pub enum CaptionAnchor {
    /// Near the top edge.
    Top,
    /// Vertically centered.
    Middle,
    /// Near the bottom edge.
    #[default]
    Bottom,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Track-level caption styling.
pub struct CaptionStyle {
    /// Path to a font file; the renderer's default font when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Text color.
    pub color: Rgb8,
    /// Solid background behind the caption text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgb8>,
    /// Outline stroke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<TextOutline>,
    /// Vertical placement.
    #[serde(default)]
    pub anchor: CaptionAnchor,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// One timed caption.
pub struct CaptionCue {
    /// Caption text, possibly multi-line.
    pub text: String,
    /// Active window, inclusive on both ends.
    pub range: TimeRange,
}

impl CaptionCue {
    /// Retime the cue. An invalid window is rejected and the prior timing is retained.
    pub fn set_range(&mut self, start_sec: f64, end_sec: f64) -> GreenroomResult<()> {
        self.range = TimeRange::new(start_sec, end_sec)?;
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A caption track: shared style plus timed cues. At most one cue is active per timestamp.
pub struct CaptionTrack {
    /// Track identifier.
    pub id: String,
    /// Style applied to every cue on this track.
    pub style: CaptionStyle,
    /// Cues in authored order. Overlaps resolve to the first matching cue.
    pub cues: Vec<CaptionCue>,
}

impl Project {
    /// Load and validate a project from a JSON file.
    pub fn from_json_file(path: &Path) -> GreenroomResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            GreenroomError::resource(format!("read project {}: {e}", path.display()))
        })?;
        let project: Self = serde_json::from_slice(&bytes).map_err(|e| {
            GreenroomError::validation(format!("parse project {}: {e}", path.display()))
        })?;
        project.validate()?;
        Ok(project)
    }

    /// Validate project invariants: canvas, duration, ranges and per-element parameters.
    pub fn validate(&self) -> GreenroomResult<()> {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(GreenroomError::validation(
                "resolution width/height must be > 0",
            ));
        }
        if !self.duration_sec.is_finite() || self.duration_sec <= 0.0 {
            return Err(GreenroomError::validation(
                "duration_sec must be finite and > 0",
            ));
        }

        for clip in &self.media {
            validate_source(&clip.source, &clip.id)?;
            validate_placement(&clip.placement, &clip.id)?;
            if let Some(g) = clip.geometry {
                g.validate(&clip.id)?;
            }
            if !clip.trim_start_sec.is_finite() || clip.trim_start_sec < 0.0 {
                return Err(GreenroomError::validation(format!(
                    "clip '{}' trim_start_sec must be finite and >= 0",
                    clip.id
                )));
            }
            if !clip.volume_pct.is_finite() || clip.volume_pct < 0.0 {
                return Err(GreenroomError::validation(format!(
                    "clip '{}' volume_pct must be finite and >= 0",
                    clip.id
                )));
            }
            if let Some(key) = &clip.chroma_key {
                key.validate()?;
            }
            clip.animation.validate()?;
        }

        for text in &self.texts {
            if text.content.trim().is_empty() {
                return Err(GreenroomError::validation(format!(
                    "text '{}' content must be non-empty",
                    text.id
                )));
            }
            if !text.font_size_px.is_finite() || text.font_size_px <= 0.0 {
                return Err(GreenroomError::validation(format!(
                    "text '{}' font_size_px must be finite and > 0",
                    text.id
                )));
            }
            validate_placement(&text.placement, &text.id)?;
            if let Some(g) = text.geometry {
                g.validate(&text.id)?;
            }
            text.animation.validate()?;
        }

        for chat in &self.chats {
            if chat.messages.is_empty() {
                return Err(GreenroomError::validation(format!(
                    "chat '{}' must have at least one message",
                    chat.id
                )));
            }
            validate_placement(&chat.placement, &chat.id)?;
            if let Some(g) = chat.geometry {
                g.validate(&chat.id)?;
            }
            for (i, msg) in chat.messages.iter().enumerate() {
                if let Some(at) = msg.appear_at_sec
                    && (!at.is_finite() || at < 0.0)
                {
                    return Err(GreenroomError::validation(format!(
                        "chat '{}' message {i} appear_at_sec must be finite and >= 0",
                        chat.id
                    )));
                }
            }
        }

        for track in &self.caption_tracks {
            if !track.style.font_size_px.is_finite() || track.style.font_size_px <= 0.0 {
                return Err(GreenroomError::validation(format!(
                    "caption track '{}' font_size_px must be finite and > 0",
                    track.id
                )));
            }
            for cue in &track.cues {
                TimeRange::new(cue.range.start_sec, cue.range.end_sec)?;
            }
        }

        Ok(())
    }
}

fn validate_source(source: &str, id: &str) -> GreenroomResult<()> {
    if source.trim().is_empty() {
        return Err(GreenroomError::validation(format!(
            "clip '{id}' source must be non-empty"
        )));
    }
    Ok(())
}

fn validate_placement(placement: &Placement, id: &str) -> GreenroomResult<()> {
    TimeRange::new(placement.range.start_sec, placement.range.end_sec).map_err(|_| {
        GreenroomError::validation(format!("element '{id}' has an invalid visibility window"))
    })?;
    if !placement.opacity_pct.is_finite() || placement.opacity_pct < 0.0 {
        return Err(GreenroomError::validation(format!(
            "element '{id}' opacity_pct must be finite and >= 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
