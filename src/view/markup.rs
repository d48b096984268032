//! Labels that carry emphasis use a tiny tag markup: `<b>`, `<i>` and the
//! five XML entities. Anything user-provided must go through [`escape`]
//! before it is placed inside markup.

use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

const TAGS: [(&str, Tag); 4] = [
    ("<b>", Tag::Open(Modifier::BOLD)),
    ("</b>", Tag::Close(Modifier::BOLD)),
    ("<i>", Tag::Open(Modifier::ITALIC)),
    ("</i>", Tag::Close(Modifier::ITALIC)),
];

const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

#[derive(Clone, Copy)]
enum Tag {
    Open(Modifier),
    Close(Modifier),
}

#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `text`, escaped and wrapped in bold tags
#[must_use]
pub fn bold(text: &str) -> String {
    format!("<b>{}</b>", escape(text))
}

/// Parses markup into styled spans. Unknown tags and stray `&`s are kept as
/// literal text.
#[must_use]
pub fn to_spans(markup: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans = vec![];
    let mut text = String::new();
    let mut modifiers = Modifier::empty();
    let mut rest = markup;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some((tag, tag_len)) = TAGS
                .iter()
                .find(|(literal, _)| rest.starts_with(literal))
                .map(|(literal, tag)| (*tag, literal.len()))
            {
                if !text.is_empty() {
                    spans.push(Span::styled(
                        std::mem::take(&mut text),
                        base.add_modifier(modifiers),
                    ));
                }
                match tag {
                    Tag::Open(modifier) => modifiers.insert(modifier),
                    Tag::Close(modifier) => modifiers.remove(modifier),
                }
                rest = &rest[tag_len..];
                continue;
            }
        }

        if c == '&' {
            if let Some((literal, decoded)) = ENTITIES
                .iter()
                .find(|(literal, _)| rest.starts_with(literal))
            {
                text.push(*decoded);
                rest = &rest[literal.len()..];
                continue;
            }
        }

        text.push(c);
        rest = &rest[c.len_utf8()..];
    }

    if !text.is_empty() {
        spans.push(Span::styled(text, base.add_modifier(modifiers)));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_metacharacters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn bold_markup_renders_bold() {
        let spans = to_spans(&bold("ferris"), Style::default());

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "ferris");
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn escaped_names_cannot_inject_formatting() {
        let spans = to_spans(&bold("</b><i>admin</i>"), Style::default());

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "</b><i>admin</i>");
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn unknown_tags_and_stray_ampersands_are_literal() {
        let spans = to_spans("a <u>b</u> & c", Style::default());
        let text: String = spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "a <u>b</u> & c");
    }

    #[test]
    fn nested_tags_split_spans() {
        let spans = to_spans("<b>bold <i>both</i></b> plain", Style::default());
        let parts: Vec<(&str, Modifier)> = spans
            .iter()
            .map(|span| (span.content.as_ref(), span.style.add_modifier))
            .collect();

        assert_eq!(
            parts,
            vec![
                ("bold ", Modifier::BOLD),
                ("both", Modifier::BOLD | Modifier::ITALIC),
                (" plain", Modifier::empty()),
            ]
        );
    }
}
