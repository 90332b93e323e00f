use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::preset::style::StylePreset;
use crate::render::motion::AnimationKind;

/// The built-in style catalog, keyed by preset id.
///
/// Loaded once at first use and read-only afterwards; jobs work on derived
/// copies. Some entries carry animation ids that predate the closed
/// animation table and intentionally resolve to the static fallback.
static CATALOG: LazyLock<BTreeMap<&'static str, StylePreset>> = LazyLock::new(build_catalog);

fn entry(
    id: &'static str,
    display_name: &str,
    font_ref: &str,
    text_color: &str,
    text_bg_color: Option<&str>,
    animation: &str,
    duration_secs: f64,
    music_genre: Option<&str>,
) -> (&'static str, StylePreset) {
    (
        id,
        StylePreset {
            id: id.to_string(),
            display_name: display_name.to_string(),
            font_ref: font_ref.to_string(),
            text_color: text_color.to_string(),
            text_bg_color: text_bg_color.map(str::to_string),
            animation: AnimationKind::from_id(animation),
            duration_secs,
            music_genre: music_genre.map(str::to_string),
        },
    )
}

fn build_catalog() -> BTreeMap<&'static str, StylePreset> {
    BTreeMap::from([
        // Food
        entry("Food_Luxury", "Food Luxury", "Mincho", "#FFFFFF", None, "zoom_in_crossfade", 3.0, Some("Chill")),
        entry("Food_Casual", "Food Casual", "Round", "#333333", Some("#FFCC00"), "slide_in_left", 2.5, Some("Pop")),
        entry("Food_Sizzle", "Food Sizzle", "ExtraBold", "#FF0000", Some("#FFFFFF"), "zoom_center_impact", 1.5, Some("Rock")),
        entry("Food_Izakaya", "Food Izakaya", "Brush", "#FFFFFF", Some("#000000"), "slide_in_vertical", 2.0, Some("Pop")),
        // Beauty / fitness
        entry("Beauty_Salon", "Beauty Salon", "Thin", "#555555", Some("#F0F0F0"), "soft_pan", 4.0, Some("Chill")),
        entry("Fitness_Gym", "Fitness Gym", "Italic", "#FFFF00", Some("#000000"), "fast_cut_shake", 1.0, Some("Rock")),
        // Business
        entry("RealEstate", "Real Estate", "Gothic", "#FFFFFF", Some("#003366"), "pan_horizontal", 3.5, Some("Corporate")),
        entry("Fashion", "Fashion", "Serif", "#000000", Some("#FFFFFF"), "flash_cut", 0.8, Some("Pop")),
        entry("Corporate", "Corporate", "Standard", "#FFFFFF", Some("#000000"), "static_fade", 3.0, Some("Corporate")),
        entry("Tech_Startup", "Tech Startup", "Digital", "#00FFFF", Some("#00000080"), "slide_fast_tint", 2.0, Some("Electronic")),
        entry("Recruit", "Recruit", "BoldGothic", "#FFFFFF", Some("#FF6600"), "zoom_face_text", 3.0, Some("Corporate")),
        // Other
        entry("Kids_Edu", "Kids Education", "Round", "#FFFFFF", Some("#FF99CC"), "bounce_zoom", 2.5, Some("Pop")),
        entry("Wedding", "Wedding", "Mincho", "#FFFFFF", None, "slow_dissolve", 4.0, Some("Wed")),
        entry("Sale_Campaign", "Sale Campaign", "ExtraBold", "#FFFFFF", Some("#FF0000"), "pulse_zoom", 1.5, Some("Upbeat")),
        entry("Night_Bar", "Night Bar", "ThinGothic", "#FFFFFF", None, "fade_dark", 3.0, Some("Jazz")),
    ])
}

/// All catalog entries in id order.
pub fn all() -> impl Iterator<Item = &'static StylePreset> {
    CATALOG.values()
}

/// Look up a preset by id.
pub fn get(id: &str) -> Option<&'static StylePreset> {
    CATALOG.get(id)
}

/// Distinct category prefixes, sorted.
pub fn categories() -> Vec<&'static str> {
    let mut cats: Vec<&'static str> = CATALOG
        .keys()
        .map(|id| id.split('_').next().unwrap_or(id))
        .collect();
    cats.sort_unstable();
    cats.dedup();
    cats
}

/// All presets in a category, in id order.
pub fn by_category(category: &str) -> Vec<&'static StylePreset> {
    CATALOG
        .values()
        .filter(|p| p.category() == category)
        .collect()
}
