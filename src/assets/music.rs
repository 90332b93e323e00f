use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Scan `<assets_dir>/bgm/<Genre>/*.mp3` into a genre → tracks map.
///
/// Tracks are sorted by filename so every consumer sees the same order.
/// A missing bgm directory yields an empty map, not an error.
pub fn discover(assets_dir: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut out = BTreeMap::new();
    let root = assets_dir.join("bgm");
    let Ok(genres) = std::fs::read_dir(&root) else {
        return out;
    };

    for genre in genres.flatten() {
        let genre_path = genre.path();
        if !genre_path.is_dir() {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&genre_path) else {
            continue;
        };
        let mut tracks: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("mp3"))
            })
            .collect();
        if tracks.is_empty() {
            continue;
        }
        tracks.sort();
        out.insert(genre.file_name().to_string_lossy().into_owned(), tracks);
    }

    out
}

/// Pick a track for `genre`: first in sorted order, deterministic.
pub fn pick(assets_dir: &Path, genre: &str) -> Option<PathBuf> {
    discover(assets_dir)
        .get(genre)
        .and_then(|tracks| tracks.first().cloned())
}
