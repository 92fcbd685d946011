#[derive(Clone, Debug, PartialEq, Eq)]
/// One composited frame.
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels.
    pub data: Vec<u8>,
    /// Whether `data` carries premultiplied alpha.
    pub premultiplied: bool,
}

impl Frame {
    /// Convert premultiplied pixels back to straight alpha in place.
    ///
    /// The encoder's `rgba` raw input expects straight alpha; this is the last step before a
    /// frame leaves the compositor's premultiplied world.
    pub fn unpremultiply_in_place(&mut self) {
        if !self.premultiplied {
            return;
        }
        for px in self.data.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 || a == 255 {
                continue;
            }
            for c in px.iter_mut().take(3) {
                *c = ((u32::from(*c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
            }
        }
        self.premultiplied = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpremultiply_restores_straight_alpha() {
        let mut frame = Frame {
            width: 1,
            height: 1,
            data: vec![64, 32, 16, 128],
            premultiplied: true,
        };
        frame.unpremultiply_in_place();
        assert!(!frame.premultiplied);
        assert_eq!(frame.data[3], 128);
        assert_eq!(frame.data[0], 128);
    }

    #[test]
    fn unpremultiply_is_idempotent_on_straight_frames() {
        let mut frame = Frame {
            width: 1,
            height: 1,
            data: vec![128, 64, 32, 128],
            premultiplied: false,
        };
        frame.unpremultiply_in_place();
        assert_eq!(frame.data, vec![128, 64, 32, 128]);
    }
}
