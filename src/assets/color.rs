use crate::foundation::error::{ReelError, ReelResult};

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8 {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
    pub const BLACK: Rgba8 = Rgba8 {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// CSS-style `rgb(...)` / `rgba(...)` string for embedding in SVG.
    pub fn to_svg(self) -> String {
        if self.a == 255 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({},{},{},{:.3})",
                self.r,
                self.g,
                self.b,
                f32::from(self.a) / 255.0
            )
        }
    }
}

/// Parse a caption color string.
///
/// Accepts `#RGB`, `#RRGGBB`, `#RRGGBBAA` and the two named colors the
/// preset catalog has historically used.
pub fn parse(s: &str) -> ReelResult<Rgba8> {
    let t = s.trim();
    match t.to_ascii_lowercase().as_str() {
        "white" => return Ok(Rgba8::WHITE),
        "black" => return Ok(Rgba8::BLACK),
        _ => {}
    }

    let hex = t
        .strip_prefix('#')
        .ok_or_else(|| ReelError::validation(format!("unrecognized color '{s}'")))?;

    fn byte(pair: &str) -> ReelResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| ReelError::validation(format!("invalid hex byte \"{pair}\"")))
    }
    fn nibble(ch: &str) -> ReelResult<u8> {
        let v = byte(&format!("{ch}{ch}"))?;
        Ok(v)
    }

    let (r, g, b, a) = match hex.len() {
        3 => (
            nibble(&hex[0..1])?,
            nibble(&hex[1..2])?,
            nibble(&hex[2..3])?,
            255,
        ),
        6 => (byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255),
        8 => (
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        ),
        _ => {
            return Err(ReelError::validation(
                "hex color must be #RGB, #RRGGBB or #RRGGBBAA",
            ));
        }
    };

    Ok(Rgba8 { r, g, b, a })
}

/// Pick the caption outline color for a given text color string.
///
/// Black stroke by default; white stroke when the text itself reads as near
/// black. The comparison is lexicographic on the raw string, not a luminance
/// check. Known approximation, kept for output parity with existing renders.
pub fn stroke_for(text_color: &str) -> Rgba8 {
    let lower = text_color.to_ascii_lowercase();
    let near_black = matches!(lower.as_str(), "black" | "#000000" | "#000")
        || (lower.starts_with('#') && lower.as_str() < "#444");
    if near_black { Rgba8::WHITE } else { Rgba8::BLACK }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(
            parse("#FF0000").unwrap(),
            Rgba8 {
                r: 255,
                g: 0,
                b: 0,
                a: 255
            }
        );
        assert_eq!(
            parse("#fff").unwrap(),
            Rgba8::WHITE
        );
        let c = parse("#00000080").unwrap();
        assert_eq!(c.a, 128);
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!(parse("white").unwrap(), Rgba8::WHITE);
        assert_eq!(parse("Black").unwrap(), Rgba8::BLACK);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("teal").is_err());
        assert!(parse("#12345").is_err());
        assert!(parse("#GGGGGG").is_err());
    }

    #[test]
    fn svg_string_includes_alpha_only_when_translucent() {
        assert_eq!(Rgba8::WHITE.to_svg(), "rgb(255,255,255)");
        let c = parse("#00000080").unwrap();
        assert!(c.to_svg().starts_with("rgba(0,0,0,"));
    }

    #[test]
    fn stroke_is_white_for_near_black_text() {
        assert_eq!(stroke_for("black"), Rgba8::WHITE);
        assert_eq!(stroke_for("#000000"), Rgba8::WHITE);
        assert_eq!(stroke_for("#000"), Rgba8::WHITE);
        assert_eq!(stroke_for("#333333"), Rgba8::WHITE);
    }

    #[test]
    fn stroke_is_black_for_light_text() {
        assert_eq!(stroke_for("#FFFFFF"), Rgba8::BLACK);
        assert_eq!(stroke_for("#FFFF00"), Rgba8::BLACK);
        assert_eq!(stroke_for("white"), Rgba8::BLACK);
    }

    #[test]
    fn stroke_heuristic_is_lexicographic_not_luminance() {
        // "#443..." sorts below "#444" and is treated as near black even
        // though its actual luminance is not what a luma check would say.
        assert_eq!(stroke_for("#443FFF"), Rgba8::WHITE);
        assert_eq!(stroke_for("#444444"), Rgba8::BLACK);
    }
}
