use crate::parsers::text::{self, TextOptions};
use scraper::{Html, Selector};

fn render(html: &str, skip: &[&str], options: &TextOptions) -> String {
    let doc = Html::parse_document(html);
    let body = doc
        .select(&Selector::parse("body").unwrap())
        .next()
        .unwrap();
    text::inner_text(body, skip, options)
}

#[cfg(test)]
mod basic_tests {
    use super::*;

    #[test]
    fn test_empty_body() {
        assert_eq!(render("<body></body>", &[], &TextOptions::default()), "");
    }

    #[test]
    fn test_whitespace_only() {
        let html = "<body>   \n   \t   <div>  </div>\r\n   </body>";
        assert_eq!(render(html, &[], &TextOptions::default()), "");
    }

    #[test]
    fn test_inline_elements_keep_flow() {
        let html = "<body><p>Hello, <strong>bold</strong> <em>world</em>!</p></body>";
        assert_eq!(render(html, &[], &TextOptions::default()), "Hello, bold world!");
    }

    #[test]
    fn test_multiple_spaces_between_words() {
        let html = "<body><p>Hello    world!    This    is    a    test.</p></body>";
        assert_eq!(
            render(html, &[], &TextOptions::default()),
            "Hello world! This is a test."
        );
    }

    #[test]
    fn test_unicode_text() {
        let html = "<body><p>Café   crème</p><p>日本語</p></body>";
        assert_eq!(render(html, &[], &TextOptions::default()), "Café crème\n\n日本語");
    }
}

#[cfg(test)]
mod structure_tests {
    use super::*;

    #[test]
    fn test_headings_are_paragraphs() {
        let html = "<body><h1>Title</h1><h2>Subtitle</h2><p>Body</p></body>";
        assert_eq!(
            render(html, &[], &TextOptions::default()),
            "Title\n\nSubtitle\n\nBody"
        );
    }

    #[test]
    fn test_list_items_are_lines() {
        let html = "<body><ul><li>One</li><li>Two</li></ul></body>";
        assert_eq!(render(html, &[], &TextOptions::default()), "One\nTwo");
    }

    #[test]
    fn test_line_breaks_flattened_without_option() {
        let options = TextOptions {
            preserve_line_breaks: false,
            ..TextOptions::default()
        };
        let html = "<body><p>First<br>second</p><p>Third</p></body>";
        assert_eq!(render(html, &[], &options), "First second\n\nThird");
    }

    #[test]
    fn test_nested_skip_tags() {
        let html = "<body><div><header><h1>Logo</h1></header><section><p>Kept</p><aside>Ad</aside></section></div></body>";
        assert_eq!(
            render(html, &["header", "aside"], &TextOptions::default()),
            "Kept"
        );
    }

    #[test]
    fn test_noscript_and_templates_hidden() {
        let html = "<body><noscript>Enable JS</noscript><template><p>Later</p></template><p>Now</p></body>";
        assert_eq!(render(html, &[], &TextOptions::default()), "Now");
    }
}

#[cfg(test)]
mod normalize_tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let input = "Paragraph 1.\n\n\n\nParagraph 2.\n\n\nParagraph 3.";
        assert_eq!(
            text::normalize(input, &TextOptions::default()),
            "Paragraph 1.\n\nParagraph 2.\n\nParagraph 3."
        );
    }

    #[test]
    fn test_normalize_flat() {
        let options = TextOptions {
            preserve_paragraphs: false,
            preserve_line_breaks: false,
        };
        let input = "  Line 1  \n\n  Line 2  \t\r\n  Line 3  ";
        assert_eq!(text::normalize(input, &options), "Line 1 Line 2 Line 3");
    }
}
