pub mod convert;
pub mod frame;
pub mod manifest;
pub mod verify;

pub use convert::{convert, output_path, output_paths, ConvertOptions};
pub use frame::{read_csv, DataFrame, ReadOptions};
pub use manifest::Manifest;
