pub mod f32;
pub mod io;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::io::{load_grayscale_image, save_binary_map, write_json_file};
pub use self::u8::{GrayImageU8, ImageU8};
