pub mod image;
pub mod item;
pub mod location;
pub mod storage_box;
pub mod user;

pub use image::*;
pub use item::*;
pub use location::*;
pub use storage_box::*;
pub use user::*;
