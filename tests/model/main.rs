#[path = "../common/mod.rs"]
mod common;

mod content_type;
mod frames;
