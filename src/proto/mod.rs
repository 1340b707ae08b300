// Messages are hand-written prost structs; each module includes the service
// stubs that build.rs generates into OUT_DIR.

pub mod auth;
pub mod boxes;
pub mod common;
pub mod health;
pub mod images;
pub mod items;
pub mod search;
