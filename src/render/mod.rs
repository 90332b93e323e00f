pub mod composite;
pub mod motion;
pub mod normalize;
pub mod scene;
pub mod text;
pub mod watermark;
