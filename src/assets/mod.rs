pub mod color;
pub mod font;
pub mod image;
pub mod music;
