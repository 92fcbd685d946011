//! Media-clip renderer: still images and decoded video frames, optionally chroma-keyed.

use crate::animation::sample;
use crate::assets::media::clip_source_time_sec;
use crate::assets::store::PreparedAssets;
use crate::chroma::ChromaKeyer;
use crate::foundation::core::{Affine, Point, Resolution};
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::render::{affine_to_cpu, image_paint, premul_bytes_to_pixmap, premultiply_rgba8};
use crate::timeline::model::{MediaClip, MediaKind};

/// Render one media clip at timestamp `t`.
///
/// Resource problems surface as [`GreenroomError::ResourceLoad`]; the compositor downgrades
/// those to a skipped element instead of failing the frame.
pub fn render_media(
    ctx: &mut vello_cpu::RenderContext,
    clip: &MediaClip,
    t: f64,
    assets: &mut PreparedAssets,
    keyer: &mut dyn ChromaKeyer,
    canvas: Resolution,
) -> GreenroomResult<()> {
    let (src_w, src_h, straight) = match clip.kind {
        MediaKind::Image => {
            let img = assets.image(&clip.source).ok_or_else(|| {
                GreenroomError::resource(format!("image '{}' was not prepared", clip.source))
            })?;
            (img.width, img.height, img.rgba8.clone())
        }
        MediaKind::Video => {
            let (w, h) = assets
                .video(&clip.source)
                .map(|v| (v.info.width, v.info.height))
                .ok_or_else(|| {
                    GreenroomError::resource(format!("video '{}' was not prepared", clip.source))
                })?;
            let frame = assets.video_frame(&clip.source, clip_source_time_sec(clip, t))?;
            (w, h, frame)
        }
    };

    let premul = match &clip.chroma_key {
        Some(params) => keyer.key(&straight, src_w, src_h, params)?,
        None => premultiply_rgba8(&straight),
    };
    let pixmap = premul_bytes_to_pixmap(&premul, src_w, src_h)?;

    let target = clip
        .geometry
        .map(|g| g.rect())
        .unwrap_or_else(|| canvas.rect());
    let place = Affine::translate(target.origin().to_vec2())
        * Affine::scale_non_uniform(
            target.width() / f64::from(src_w),
            target.height() / f64::from(src_h),
        );

    let range = clip.placement.range;
    let state = sample(&clip.animation, t - range.start_sec, range.duration_sec());
    let opacity = (clip.placement.opacity() * state.opacity) as f32;
    if opacity <= 0.0 {
        return Ok(());
    }

    let pivot = Point::new(target.center().x, target.center().y);
    ctx.set_transform(affine_to_cpu(state.to_affine(pivot) * place));
    ctx.set_paint(image_paint(pixmap));

    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(src_w),
        f64::from(src_h),
    ));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
    Ok(())
}
