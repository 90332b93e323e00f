pub mod catalog;
pub mod style;

pub use catalog::{all, by_category, categories, get};
pub use style::{PresetOverrides, StylePreset, WorkingPreset};
