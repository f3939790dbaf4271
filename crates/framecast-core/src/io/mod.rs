pub mod images;
pub mod npy;
pub mod sources;

pub use images::{list_images, load_image, load_image_dir, ImageFilter};
pub use npy::{inspect_npy, load_npy, ArrayInfo};
pub use sources::{list_npy_files, load_npy_dir, ErrorPolicy, LoadReport};
