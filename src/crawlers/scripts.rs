//! Scripts evaluated inside the page. Kept small: they only touch the live
//! page (clicks, scrolling, computed styles). All heuristics run in Rust
//! against the captured DOM.

use crate::filter::THIRD_PARTY_CONTAINERS;

/// Masks the usual automation fingerprints
pub const STEALTH_SCRIPT: &str = r#"
try {
  Object.defineProperty(navigator, 'webdriver', { get: () => false });
  Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
  Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
} catch (e) {}
"#;

/// Cookie "accept" buttons clicked before extraction
pub const ACCEPT_SELECTORS: &[&str] = &[
    "button[id*=\"accept\"]",
    "button[class*=\"accept\"]",
    "a[id*=\"accept\"]",
    "a[class*=\"accept\"]",
    "button[id*=\"consent\"]",
    "button[class*=\"consent\"]",
    "button[id*=\"agree\"]",
    "button[class*=\"agree\"]",
    "button[id*=\"allow\"]",
    "button[class*=\"cookie-close\"]",
    "[data-cky-tag=\"accept-button\"]",
    ".cky-btn-accept",
    "#cky-btn-accept",
    ".cc-accept",
    ".cc-allow",
    ".cc-dismiss",
    "#onetrust-accept-btn-handler",
    ".cmpboxbtn.cmpboxbtnyes",
    "[aria-label=\"Accept cookies\"]",
    "[aria-label=\"Accept all cookies\"]",
    "[aria-label=\"Allow all\"]",
    "[aria-label=\"Accept all\"]",
];

/// Overlay containers removed outright, on top of `THIRD_PARTY_CONTAINERS`
pub const REMOVE_SELECTORS: &[&str] = &[
    "#onetrust-banner-sdk",
    "#CybotCookiebotDialog",
    "[id*=\"cookie-banner\"]",
    "[id*=\"cookie-consent\"]",
    "[id*=\"cookie-notice\"]",
    "#gdpr",
    "[class*=\"gdpr\"]",
    "[class*=\"cc-window\"]",
    "[class*=\"cc-banner\"]",
    "#hubspot-messages-iframe-container",
    "#intercom-container",
    "#drift-widget",
    "#fb-root",
    "#fb-customer-chat",
    "#tawk-tooltip",
    "[class*=\"zsiq\"]",
];

/// Build the overlay dismissal script from the selector tables
pub fn dismiss_overlays_script() -> String {
    let accept = serde_json::to_string(ACCEPT_SELECTORS).unwrap_or_else(|_| "[]".to_string());
    let remove: Vec<&str> = THIRD_PARTY_CONTAINERS
        .iter()
        .chain(REMOVE_SELECTORS.iter())
        .copied()
        .collect();
    let remove = serde_json::to_string(&remove).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"
const accept = {accept};
const remove = {remove};
let clicked = 0, removed = 0;
for (const sel of accept) {{
  try {{
    const btn = document.querySelector(sel);
    if (btn && btn instanceof HTMLElement) {{ btn.click(); clicked++; }}
  }} catch (e) {{}}
}}
for (const sel of remove) {{
  try {{ document.querySelectorAll(sel).forEach(el => {{ el.remove(); removed++; }}); }} catch (e) {{}}
}}
return {{ clicked, removed }};
"#
    )
}

/// Async scroll loop; `arguments[0]` is the hard cap in milliseconds
pub const LAZY_LOAD_SCRIPT: &str = r#"
const cap = arguments[0];
const done = arguments[arguments.length - 1];
let total = 0;
const finish = () => { clearInterval(timer); clearTimeout(guard); window.scrollTo(0, 0); done(total); };
const timer = setInterval(() => {
  const height = document.body ? document.body.scrollHeight : 0;
  window.scrollBy(0, 400);
  total += 400;
  if (total >= height) finish();
}, 150);
const guard = setTimeout(finish, cap);
"#;

/// Annotates images and background images on the DOM, then reads custom
/// properties and chrome element colors from the live CSSOM
pub const PROBE_SCRIPT: &str = r#"
const out = { rootVars: [], sheetVars: [], elementColors: [] };
try {
  document.querySelectorAll('img').forEach(img => {
    const w = img.naturalWidth || img.width || 0;
    const h = img.naturalHeight || img.height || 0;
    if (w) img.setAttribute('data-bs-w', String(w));
    if (h) img.setAttribute('data-bs-h', String(h));
    if (img.currentSrc && img.currentSrc !== img.src) img.setAttribute('data-bs-current', img.currentSrc);
  });
} catch (e) {}
try {
  let tagged = 0;
  const els = document.querySelectorAll('div, section, header, footer, article, aside, figure, span, a, li');
  for (let i = 0; i < els.length && i < 3000 && tagged < 250; i++) {
    const bg = getComputedStyle(els[i]).backgroundImage;
    if (bg && bg !== 'none' && bg.indexOf('url(') !== -1) {
      els[i].setAttribute('data-bs-bg', bg);
      tagged++;
    }
  }
} catch (e) {}
try {
  const style = getComputedStyle(document.documentElement);
  for (let i = 0; i < style.length; i++) {
    const prop = style[i];
    if (!prop.startsWith('--')) continue;
    const val = style.getPropertyValue(prop).trim();
    if (val) out.rootVars.push([prop, val]);
  }
} catch (e) {}
try {
  Array.from(document.styleSheets).forEach(sheet => {
    try {
      if (!sheet.cssRules) return;
      for (const rule of sheet.cssRules) {
        if (!rule.selectorText || rule.selectorText.indexOf(':root') === -1 || !rule.style) continue;
        for (let i = 0; i < rule.style.length; i++) {
          const prop = rule.style[i];
          if (!prop.startsWith('--')) continue;
          const val = rule.style.getPropertyValue(prop).trim();
          if (val) out.sheetVars.push([prop, val]);
        }
      }
    } catch (e) {}
  });
} catch (e) {}
try {
  const seen = new Set();
  const els = document.querySelectorAll('header, nav, button, a, [class*="btn"], [class*="button"]');
  for (let i = 0; i < els.length && i < 400 && out.elementColors.length < 40; i++) {
    const cs = getComputedStyle(els[i]);
    for (const c of [cs.backgroundColor, cs.color]) {
      if (!c || c === 'transparent' || c === 'rgba(0, 0, 0, 0)' || seen.has(c)) continue;
      seen.add(c);
      out.elementColors.push(c);
    }
  }
} catch (e) {}
return out;
"#;
