/// Intensity used for every pixel of a frame whose value range is empty.
pub const MID_GRAY: u8 = 128;

/// Largest 8-bit display intensity.
pub const MAX_INTENSITY: f32 = 255.0;

/// Number of channels in a display-ready frame (R, G, B).
pub const RGB_CHANNEL_COUNT: usize = 3;

/// Default output frame rate, shared by the array presets.
pub const DEFAULT_FPS: f64 = 8.0;

/// File name pattern of the temporary PNG sequence handed to ffmpeg.
pub const FFMPEG_FRAME_PATTERN: &str = "frame_%06d.png";

/// Default constant rate factor for libx264 (ffmpeg's own default).
pub const DEFAULT_CRF: u8 = 23;

/// Default libx264 speed/compression preset.
pub const DEFAULT_X264_PRESET: &str = "medium";

/// Pixel format for broad player compatibility. Requires even dimensions.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Default input array file for the single-array presets.
pub const DEFAULT_TARGET_ARRAY: &str = "tactile_target_array.npy";

/// Input array file for the ffmpeg preset.
pub const DEFAULT_OUTPUT_ARRAY: &str = "tactile_output_array.npy";

/// File name prefix of the frames read by the animation preset.
pub const DEFAULT_IMAGE_PREFIX: &str = "frame_";

/// Width used when fitting arrays of unknown shape (aspect ratio kept).
pub const DEFAULT_FIT_WIDTH: u32 = 256;
