use scraper::{ElementRef, Node};

/// Elements whose start and end break the line
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "header", "hr", "li", "main", "nav", "ol",
    "pre", "section", "table", "tbody", "thead", "tfoot", "tr", "ul",
];

/// Elements rendered as their own paragraph
const PARAGRAPH_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements that never render text
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Configuration options for text rendering
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Keep paragraph structure (exactly one blank line between paragraphs)
    pub preserve_paragraphs: bool,
    /// Keep single line breaks within paragraphs
    pub preserve_line_breaks: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            preserve_paragraphs: true,
            preserve_line_breaks: true,
        }
    }
}

/// Renders the visible text of `root` roughly the way `innerText` does,
/// leaving out any descendant whose tag is listed in `skip`
pub fn inner_text(root: ElementRef<'_>, skip: &[&str], options: &TextOptions) -> String {
    let mut raw = String::new();
    render(root, skip, &mut raw);
    normalize(&raw, options)
}

fn render(element: ElementRef<'_>, skip: &[&str], out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(out, text),
            Node::Element(el) => {
                let name = el.name();
                if INVISIBLE_TAGS.contains(&name) || skip.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                if PARAGRAPH_TAGS.contains(&name) {
                    out.push_str("\n\n");
                    render(child_ref, skip, out);
                    out.push_str("\n\n");
                } else if BLOCK_TAGS.contains(&name) {
                    break_line(out);
                    render(child_ref, skip, out);
                    break_line(out);
                } else {
                    render(child_ref, skip, out);
                }
            }
            _ => {}
        }
    }
}

/// Appends a text node with HTML whitespace collapsing
fn push_text(out: &mut String, text: &str) {
    let at_line_start = out.is_empty() || out.ends_with('\n') || out.ends_with(' ');
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.is_empty() {
        if !text.is_empty() && !at_line_start {
            out.push(' ');
        }
        return;
    }

    if text.starts_with(char::is_whitespace) && !at_line_start {
        out.push(' ');
    }
    out.push_str(&words.join(" "));
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// Adjacent block boundaries share one line break
fn break_line(out: &mut String) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Normalizes rendered text according to options
pub fn normalize(text: &str, options: &TextOptions) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let paragraphs = split_into_paragraphs(text);
    let processed: Vec<String> = paragraphs
        .iter()
        .map(|para| process_paragraph(para, options))
        .collect();
    join_paragraphs(&processed, options)
}

/// Splits text into paragraphs on blank lines; each line is whitespace-collapsed
pub fn split_into_paragraphs(text: &str) -> Vec<Vec<String>> {
    let mut paragraphs: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(collapsed);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

fn process_paragraph(paragraph: &[String], options: &TextOptions) -> String {
    if options.preserve_line_breaks {
        paragraph.join("\n")
    } else {
        paragraph.join(" ")
    }
}

fn join_paragraphs(paragraphs: &[String], options: &TextOptions) -> String {
    if options.preserve_paragraphs {
        paragraphs.join("\n\n")
    } else {
        paragraphs.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn body_text(html: &str, skip: &[&str], options: &TextOptions) -> String {
        let doc = Html::parse_document(html);
        let body = doc.select(&Selector::parse("body").unwrap()).next().unwrap();
        inner_text(body, skip, options)
    }

    #[test]
    fn test_paragraphs_and_blocks() {
        let html = "<body><h1>Welcome</h1><p>We bake   bread.</p><div>Daily<br>fresh</div></body>";
        let text = body_text(html, &[], &TextOptions::default());
        assert_eq!(text, "Welcome\n\nWe bake bread.\n\nDaily\nfresh");
    }

    #[test]
    fn test_skipped_and_invisible_tags() {
        let html = "<body><nav>Menu</nav><script>var x = 1;</script><main>Story</main><footer>Legal</footer></body>";
        let text = body_text(html, &["nav", "footer"], &TextOptions::default());
        assert_eq!(text, "Story");
    }

    #[test]
    fn test_flat_rendering() {
        let options = TextOptions {
            preserve_paragraphs: false,
            preserve_line_breaks: false,
        };
        let html = "<body><p>One</p><p>Two</p><div>Three<br>Four</div></body>";
        assert_eq!(body_text(html, &[], &options), "One Two Three Four");
    }

    #[test]
    fn test_split_into_paragraphs() {
        let result = split_into_paragraphs("Line 1a\n  Line   1b \n\n\n\nLine 2");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], vec!["Line 1a", "Line 1b"]);
        assert_eq!(result[1], vec!["Line 2"]);
        assert!(split_into_paragraphs("   \n\n").is_empty());
    }
}
