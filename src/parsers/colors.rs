use crate::crawlers::session::ComputedStyles;
use crate::parsers::PageDocument;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// Well-known single-color custom properties, in legacy list order
const LEGACY_PROPS: &[&str] = &[
    "--primary",
    "--brand",
    "--accent",
    "--primary-color",
    "--brand-color",
    "--theme-color",
];

const THEME_COLOR_VAR: &str = "--theme-color";

static COLOR_VAR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)color|primary|secondary|accent|brand|neutral|background|surface|border|success|warning|error|info|gradient|hue|foreground",
    )
    .expect("color name pattern is valid")
});

static COLOR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(#[0-9a-f]{3,8}\b|rgba?\s*\(|hsla?\s*\()").expect("color literal pattern is valid")
});

static CSS_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("css comment pattern is valid"));

static CSS_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").expect("css rule pattern is valid"));

static CUSTOM_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(--[A-Za-z0-9_-]+)\s*:\s*([^;]+)").expect("custom property pattern is valid")
});

/// True for hex, `rgb()`/`rgba()` and `hsl()`/`hsla()` values
pub fn is_color_literal(value: &str) -> bool {
    COLOR_LITERAL.is_match(value.trim())
}

/// True for custom property names in the color vocabulary
pub fn is_color_var_name(name: &str) -> bool {
    COLOR_VAR_NAME.is_match(name)
}

/// Custom properties declared in `:root` rules of inline `<style>` blocks
pub fn root_rule_vars(page: &PageDocument) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    for style in page.select("style") {
        let css = style.text().collect::<String>();
        vars.extend(parse_root_vars(&css));
    }
    vars
}

/// Custom property declarations of every `:root` rule in a stylesheet
pub fn parse_root_vars(css: &str) -> Vec<(String, String)> {
    let css = CSS_COMMENT.replace_all(css, "");
    let mut vars = Vec::new();

    for rule in CSS_RULE.captures_iter(&css) {
        let (Some(selectors), Some(body)) = (rule.get(1), rule.get(2)) else {
            continue;
        };
        if !selectors.as_str().contains(":root") {
            continue;
        }
        for decl in CUSTOM_PROPERTY.captures_iter(body.as_str()) {
            let (Some(name), Some(value)) = (decl.get(1), decl.get(2)) else {
                continue;
            };
            let value = value.as_str().trim().trim_end_matches("!important").trim();
            if !value.is_empty() {
                vars.push((name.as_str().to_string(), value.to_string()));
            }
        }
    }

    vars
}

/// All custom properties visible on the page; for a repeated name the first
/// source wins (computed root style, then stylesheets, then inline `<style>`)
pub fn merged_custom_properties(
    page: &PageDocument,
    styles: &ComputedStyles,
) -> IndexMap<String, String> {
    let mut merged = IndexMap::new();
    let inline = root_rule_vars(page);

    for (name, value) in styles
        .root_vars
        .iter()
        .chain(styles.sheet_vars.iter())
        .chain(inline.iter())
    {
        let value = value.trim();
        if name.starts_with("--") && !value.is_empty() && !merged.contains_key(name) {
            merged.insert(name.clone(), value.to_string());
        }
    }

    merged
}

/// Legacy color list: well-known properties, then the theme-color meta
pub fn legacy_colors(vars: &IndexMap<String, String>, theme_color: Option<&str>) -> Vec<String> {
    let mut colors: Vec<String> = LEGACY_PROPS
        .iter()
        .filter_map(|prop| vars.get(*prop))
        .cloned()
        .collect();
    if let Some(theme) = theme_color {
        colors.push(theme.to_string());
    }
    colors
}

/// Color-named custom properties holding color literals; the theme-color
/// meta overrides `--theme-color`
pub fn color_system(
    vars: &IndexMap<String, String>,
    theme_color: Option<&str>,
) -> IndexMap<String, String> {
    let mut system: IndexMap<String, String> = vars
        .iter()
        .filter(|(name, value)| is_color_var_name(name) && is_color_literal(value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    if let Some(theme) = theme_color {
        system.insert(THEME_COLOR_VAR.to_string(), theme.to_string());
    }

    system
}

/// Sampled element colors without transparent values or repeats
pub fn element_colors(styles: &ComputedStyles) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for color in &styles.element_colors {
        let color = color.trim();
        if color.is_empty() || is_transparent(color) {
            continue;
        }
        if !colors.iter().any(|c| c == color) {
            colors.push(color.to_string());
        }
    }
    colors
}

fn is_transparent(color: &str) -> bool {
    let compact: String = color
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact == "transparent" || (compact.starts_with("rgba(") && compact.ends_with(",0)"))
}
