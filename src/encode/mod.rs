//! Stream encoding via the system `ffmpeg` binary.

pub mod ffmpeg;

pub use ffmpeg::{EncodeConfig, FfmpegEncoder, is_ffmpeg_on_path};

/// Output video codec. Both support an alpha channel inside WebM.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Codec {
    /// libvpx-vp9, the default.
    #[default]
    Vp9,
    /// libvpx (VP8), for players without VP9 support.
    Vp8,
}

impl Codec {
    /// The ffmpeg encoder name.
    pub fn encoder_name(self) -> &'static str {
        match self {
            Codec::Vp9 => "libvpx-vp9",
            Codec::Vp8 => "libvpx",
        }
    }
}

impl std::str::FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vp9" => Ok(Codec::Vp9),
            "vp8" => Ok(Codec::Vp8),
            other => Err(format!("unknown codec '{other}' (expected vp9 or vp8)")),
        }
    }
}
