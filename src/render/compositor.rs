//! The frame compositor: resolves the scene graph at a timestamp and paints it.

use crate::assets::store::PreparedAssets;
use crate::chroma::{ChromaKeyer, create_keyer};
use crate::foundation::core::Rgb8;
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::render::caption::render_caption;
use crate::render::chat::render_chat;
use crate::render::frame::Frame;
use crate::render::media::render_media;
use crate::render::text::{TextShaper, render_text};
use crate::render::{affine_to_cpu, color_from_rgb8, rect_to_cpu};
use crate::timeline::model::Project;
use crate::timeline::resolve::{ElementRef, visible_at};

const CHROMA_BACKDROP: Rgb8 = Rgb8 {
    r: 255,
    g: 255,
    b: 255,
};

/// Renders timeline frames for one project.
///
/// Owns the per-project scratch state: prepared assets, the chroma keyer and the text shaper.
/// Rendering the same timestamp twice yields byte-identical frames.
pub struct FrameCompositor<'p> {
    project: &'p Project,
    assets: PreparedAssets,
    keyer: Box<dyn ChromaKeyer>,
    shaper: TextShaper,
}

impl<'p> FrameCompositor<'p> {
    /// Build a compositor over already-prepared assets.
    pub fn new(project: &'p Project, assets: PreparedAssets) -> Self {
        Self {
            project,
            assets,
            keyer: create_keyer(),
            shaper: TextShaper::new(),
        }
    }

    /// The prepared asset store, for cache management between frames.
    pub fn assets_mut(&mut self) -> &mut PreparedAssets {
        &mut self.assets
    }

    /// Render the full frame at timestamp `t` seconds.
    ///
    /// Elements paint back-to-front by resolved z order; caption tracks paint last. An element
    /// whose resources are missing is skipped with a warning instead of failing the frame.
    #[tracing::instrument(skip(self), fields(t))]
    pub fn render_frame(&mut self, t: f64) -> GreenroomResult<Frame> {
        let project = self.project;
        let canvas = project.resolution;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| GreenroomError::render("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| GreenroomError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let visible = visible_at(t, project);

        // Keyed footage reads best against white; an untouched canvas keeps the authored
        // background color.
        let uses_chroma = visible.iter().any(|el| {
            matches!(el, ElementRef::Media(clip) if clip.chroma_key.is_some())
        });
        let background = if uses_chroma {
            CHROMA_BACKDROP
        } else {
            project.background
        };
        ctx.set_transform(affine_to_cpu(crate::foundation::core::Affine::IDENTITY));
        ctx.set_paint(color_from_rgb8(background, 255));
        ctx.fill_rect(&rect_to_cpu(canvas.rect()));

        for el in visible {
            let (id, result) = match el {
                ElementRef::Media(clip) => {
                    if self.assets.is_failed(&clip.id) {
                        continue;
                    }
                    let r = render_media(
                        &mut ctx,
                        clip,
                        t,
                        &mut self.assets,
                        self.keyer.as_mut(),
                        canvas,
                    );
                    (clip.id.as_str(), r)
                }
                ElementRef::Text(text) => {
                    if self.assets.is_failed(&text.id) {
                        continue;
                    }
                    let r = render_text(&mut ctx, &mut self.shaper, text, t, &self.assets, canvas);
                    (text.id.as_str(), r)
                }
                ElementRef::Chat(chat) => {
                    if self.assets.is_failed(&chat.id) {
                        continue;
                    }
                    let r = render_chat(&mut ctx, &mut self.shaper, chat, t, &self.assets, canvas);
                    (chat.id.as_str(), r)
                }
            };
            match result {
                Ok(()) => {}
                Err(GreenroomError::ResourceLoad(msg)) => {
                    tracing::warn!(element = id, %msg, "skipping element with missing resources");
                }
                Err(e) => return Err(e),
            }
        }

        for track in &project.caption_tracks {
            match render_caption(&mut ctx, &mut self.shaper, track, t, &self.assets, canvas) {
                Ok(()) => {}
                Err(GreenroomError::ResourceLoad(msg)) => {
                    tracing::warn!(track = %track.id, %msg, "skipping caption track");
                }
                Err(e) => return Err(e),
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(Frame {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}
