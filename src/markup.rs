//! Markdown to plain text.

use pulldown_cmark::{Event, Parser, TagEnd};

/// Strip Markdown formatting from `markdown`, keeping only readable text.
///
/// Each block (paragraph, heading, list item, code block, table row) ends
/// with a line break, and line breaks inside a paragraph are preserved, so
/// segmentation sees the same line structure as in the rendered document.
/// Raw HTML is dropped.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableRow
                | TagEnd::TableHead,
            ) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::markdown_to_text;

    #[test]
    fn strips_inline_formatting() {
        assert_eq!(
            markdown_to_text("これは**重要**な`code`です。[リンク](https://example.com)"),
            "これは重要なcodeです。リンク\n"
        );
    }

    #[test]
    fn blocks_end_with_line_breaks() {
        let md = "# 見出し\n\n本文の一行目\n二行目\n\n- 項目一\n- 項目二\n";
        assert_eq!(
            markdown_to_text(md),
            "見出し\n本文の一行目\n二行目\n項目一\n項目二\n"
        );
    }

    #[test]
    fn drops_html() {
        assert_eq!(markdown_to_text("<div>\n</div>\n\nテキスト"), "テキスト\n");
    }
}
