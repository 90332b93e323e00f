use std::path::{Path, PathBuf};

/// Fallback font file probed when the requested reference is missing.
const BUNDLED_FALLBACK: &str = "BoldGothic.otf";

/// Extensions probed for a font reference, in order.
const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// Outcome of the font resolution chain.
///
/// The chain is an explicit ordered list of attempts with a terminal
/// default: requested file → bundled fallback → system default family.
/// Resolution never fails; an unreadable font degrades the caption to the
/// platform sans-serif instead of aborting the render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedFont {
    /// A concrete font file on disk plus the family name to request.
    File(PathBuf),
    /// No file found; use the system default sans-serif family.
    SystemDefault,
}

/// Resolve a preset font reference against `<assets_dir>/fonts/`.
pub fn resolve(assets_dir: &Path, font_ref: &str) -> ResolvedFont {
    let fonts_dir = assets_dir.join("fonts");

    for ext in FONT_EXTENSIONS {
        let candidate = fonts_dir.join(format!("{font_ref}.{ext}"));
        if candidate.is_file() {
            return ResolvedFont::File(candidate);
        }
    }

    let fallback = fonts_dir.join(BUNDLED_FALLBACK);
    if fallback.is_file() {
        tracing::debug!(font_ref, "font reference not found, using bundled fallback");
        return ResolvedFont::File(fallback);
    }

    tracing::warn!(font_ref, "no font file resolved, using system default");
    ResolvedFont::SystemDefault
}
