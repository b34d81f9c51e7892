use crate::parsers::colors::is_color_literal;
use crate::results::{AggregatedScrape, TopColors};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const PRIMARY_KEYWORDS: &[&str] = &[
    "primary",
    "brand",
    "button-background",
    "color-button",
    "color-base",
];
const SECONDARY_KEYWORDS: &[&str] = &["secondary", "color-secondary"];
const ACCENT_KEYWORDS: &[&str] = &["accent", "color-accent", "link", "color-link"];
const ACCENT_FALLBACK_KEYWORDS: &[&str] = &["brand"];

const NEUTRAL_KEYWORDS: &[&str] = &["white", "black", "transparent", "gray", "grey", "silver"];

static RGB_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^rgba?\(\s*([\d.]+)[\s,]+([\d.]+)[\s,]+([\d.]+)\s*(?:[,/]\s*([\d.]+%?)\s*)?\)$",
    )
    .expect("rgb function pattern is valid")
});

static HSL_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^hsla?\(\s*([\d.]+)(?:deg)?[\s,]+([\d.]+)%[\s,]+([\d.]+)%\s*(?:[,/]\s*([\d.]+%?)\s*)?\)$",
    )
    .expect("hsl function pattern is valid")
});

/// An sRGB color with an optional alpha channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: Option<f32>,
}

impl Rgb {
    fn average(&self) -> f32 {
        (self.r as f32 + self.g as f32 + self.b as f32) / 3.0
    }

    fn spread(&self) -> u8 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        max - min
    }
}

/// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`, `hsl()`
/// and `hsla()`
pub fn parse_rgb(value: &str) -> Option<Rgb> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(caps) = HSL_FUNCTION.captures(value) {
        return parse_hsl(&caps);
    }

    let caps = RGB_FUNCTION.captures(value)?;
    let channel = |i: usize| -> Option<u8> {
        let v: f32 = caps.get(i)?.as_str().parse().ok()?;
        Some(v.round().clamp(0.0, 255.0) as u8)
    };

    Some(Rgb {
        r: channel(1)?,
        g: channel(2)?,
        b: channel(3)?,
        alpha: parse_alpha(caps.get(4))?,
    })
}

/// `Some(None)` when no alpha was given, `None` when it doesn't parse
fn parse_alpha(alpha: Option<regex::Match<'_>>) -> Option<Option<f32>> {
    let Some(alpha) = alpha else {
        return Some(None);
    };
    let alpha = alpha.as_str();
    let value = match alpha.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok()? / 100.0,
        None => alpha.parse::<f32>().ok()?,
    };
    Some(Some(value))
}

fn parse_hsl(caps: &regex::Captures<'_>) -> Option<Rgb> {
    let number = |i: usize| caps.get(i)?.as_str().parse::<f32>().ok();
    let hue = number(1)?.rem_euclid(360.0);
    let saturation = (number(2)? / 100.0).clamp(0.0, 1.0);
    let lightness = (number(3)? / 100.0).clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - chroma / 2.0;
    let (r, g, b) = match hue {
        h if h < 60.0 => (chroma, x, 0.0),
        h if h < 120.0 => (x, chroma, 0.0),
        h if h < 180.0 => (0.0, chroma, x),
        h if h < 240.0 => (0.0, x, chroma),
        h if h < 300.0 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;

    Some(Rgb {
        r: channel(r),
        g: channel(g),
        b: channel(b),
        alpha: parse_alpha(caps.get(4))?,
    })
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 | 4 => Some(Rgb {
            r: digit(0)?,
            g: digit(1)?,
            b: digit(2)?,
            alpha: if hex.len() == 4 {
                Some(digit(3)? as f32 / 255.0)
            } else {
                None
            },
        }),
        6 | 8 => Some(Rgb {
            r: pair(0)?,
            g: pair(2)?,
            b: pair(4)?,
            alpha: if hex.len() == 8 {
                Some(pair(6)? as f32 / 255.0)
            } else {
                None
            },
        }),
        _ => None,
    }
}

/// Comparable form of a color: opaque colors become `#rrggbb`, anything else
/// is lowercased with whitespace removed
pub fn normalize_color(value: &str) -> String {
    match parse_rgb(value) {
        Some(Rgb {
            r,
            g,
            b,
            alpha: None,
        }) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        _ => value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase(),
    }
}

/// Near-white, near-black and low-saturation mid-gray colors carry no brand
/// identity
pub fn is_neutral(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    if NEUTRAL_KEYWORDS.contains(&lower.as_str()) {
        return true;
    }
    match parse_rgb(&lower) {
        Some(rgb) => {
            let (avg, spread) = (rgb.average(), rgb.spread());
            (spread < 30 && (avg > 240.0 || avg < 25.0)) || (spread < 40 && avg > 100.0 && avg < 180.0)
        }
        None => false,
    }
}

fn is_candidate(value: &str) -> bool {
    is_color_literal(value) && !is_neutral(value)
}

/// Custom property values whose names contain one of `keywords`, keyword
/// order first and property order within a keyword
fn vars_matching<'a>(
    vars: &'a IndexMap<String, String>,
    keywords: &'a [&'a str],
) -> impl Iterator<Item = &'a str> + 'a {
    keywords.iter().flat_map(move |keyword| {
        vars.iter()
            .filter(move |(name, _)| name.to_ascii_lowercase().contains(keyword))
            .map(|(_, value)| value.trim())
    })
}

/// First candidate not yet used; marks it used
fn claim<'a>(candidates: impl IntoIterator<Item = &'a str>, used: &mut HashSet<String>) -> Option<String> {
    candidates
        .into_iter()
        .filter(|c| is_candidate(c))
        .map(normalize_color)
        .find(|c| used.insert(c.clone()))
}

/// Primary, secondary and accent colors for a scrape.
///
/// Each slot walks its cascade: named custom properties, then the legacy
/// color list at the slot's index. Slots still empty are filled from the
/// sampled element colors. Neutral colors are never chosen and no two slots
/// share a value.
pub fn pick_top_colors(scrape: &AggregatedScrape) -> TopColors {
    let vars = &scrape.color_system_raw;
    let legacy: Vec<&str> = scrape
        .colors
        .iter()
        .map(|c| c.trim())
        .filter(|c| is_color_literal(c))
        .collect();
    let mut used = HashSet::new();

    let primary = claim(
        vars_matching(vars, PRIMARY_KEYWORDS).chain(legacy.first().copied()),
        &mut used,
    );
    let secondary = claim(
        vars_matching(vars, SECONDARY_KEYWORDS).chain(legacy.get(1).copied()),
        &mut used,
    );
    let accent = claim(
        vars_matching(vars, ACCENT_KEYWORDS)
            .chain(vars_matching(vars, ACCENT_FALLBACK_KEYWORDS))
            .chain(legacy.get(2).copied()),
        &mut used,
    );

    let elements = scrape.element_colors.iter().map(|c| c.trim());
    let fill = |slot: Option<String>, used: &mut HashSet<String>| {
        slot.or_else(|| claim(elements.clone(), used))
    };

    let primary = fill(primary, &mut used);
    let secondary = fill(secondary, &mut used);
    let accent = fill(accent, &mut used);

    TopColors {
        primary,
        secondary,
        accent,
    }
}
