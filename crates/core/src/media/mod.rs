//! Media categories, target formats and the unit of conversion work.
//!
//! A batch always targets a single [`MediaCategory`]. The user-facing format
//! tag (for example `"JPG"` or `"MP4 (Video)"`) is parsed once into a
//! [`TargetFormat`], which decides both the encoder and the output extension.

mod types;

pub use types::{
    AvFormat, AvKind, ConversionItem, ImageFormat, MediaCategory, TargetFormat,
    AUDIO_VIDEO_FORMATS, IMAGE_FORMATS,
};
