//! `{{ name }}` placeholders inside WordprocessingML parts.
//!
//! Word frequently splits the text of one placeholder across several runs,
//! even between its braces, so a placeholder may contain markup anywhere.
//! The markup is kept after the substituted value, which leaves the element
//! structure balanced.

use std::borrow::Cow;

use draft_model::{RenderContext, RenderError, TemplateError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal XML copied through.
    Text(String),
    /// A substitution point and the markup found inside its braces.
    Placeholder { name: String, markup: String },
}

/// Split one XML part into literal text and placeholders.
///
/// Braces are matched on the visible text only, so `{` and `{` in separate
/// runs still open a placeholder. A `}}` outside any placeholder is an error.
pub fn parse_segments(part: &str, xml: &str) -> Result<Vec<Segment>, TemplateError> {
    let malformed = |offset: usize, reason: &str| TemplateError::MalformedPlaceholder {
        part: part.to_string(),
        offset,
        reason: reason.to_string(),
    };

    let visible = visible_chars(xml);
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut idx = 0;
    while idx + 1 < visible.len() {
        let (open, first) = visible[idx];
        match (first, visible[idx + 1].1) {
            ('{', '%') => return Err(malformed(open, "control blocks are not supported")),
            ('}', '}') => return Err(malformed(open, "closing braces without a placeholder")),
            ('{', '{') => {
                let close = find_close(&visible, idx + 2)
                    .map_err(|reason| malformed(open, reason))?;
                // Both braces are ASCII, so the region ends one byte past the last.
                let end = visible[close + 1].0 + 1;
                let (text, markup) = split_markup(&xml[open..end]);
                let name = text[OPEN.len()..text.len() - CLOSE.len()].trim();
                if name.is_empty() {
                    return Err(malformed(open, "empty placeholder"));
                }
                if !is_identifier(name) {
                    return Err(malformed(open, &format!("invalid placeholder name '{name}'")));
                }

                if open > pos {
                    segments.push(Segment::Text(xml[pos..open].to_string()));
                }
                segments.push(Segment::Placeholder {
                    name: name.to_string(),
                    markup,
                });
                pos = end;
                idx = close + 2;
            }
            _ => idx += 1,
        }
    }
    if pos < xml.len() {
        segments.push(Segment::Text(xml[pos..].to_string()));
    }
    Ok(segments)
}

/// Index of the first `}` of the closing pair, scanning from `from`.
fn find_close(visible: &[(usize, char)], from: usize) -> Result<usize, &'static str> {
    let mut idx = from;
    while idx + 1 < visible.len() {
        match (visible[idx].1, visible[idx + 1].1) {
            ('{', '{') => return Err("nested placeholder"),
            ('}', '}') => return Ok(idx),
            _ => idx += 1,
        }
    }
    Err("unclosed placeholder")
}

/// Characters outside `<...>` tags, with their byte offsets.
fn visible_chars(xml: &str) -> Vec<(usize, char)> {
    let mut in_tag = false;
    xml.char_indices()
        .filter(|&(_, ch)| match (in_tag, ch) {
            (false, '<') => {
                in_tag = true;
                false
            }
            (true, '>') => {
                in_tag = false;
                false
            }
            (inside, _) => !inside,
        })
        .collect()
}

/// Substitute context values into parsed segments.
pub fn render_segments(segments: &[Segment], context: &RenderContext) -> Result<String, RenderError> {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder { name, markup } => {
                let value = context
                    .get(name)
                    .ok_or_else(|| RenderError::MissingPlaceholder(name.clone()))?;
                if let Some(bad) = value.chars().find(|c| !is_xml_char(*c)) {
                    return Err(RenderError::InvalidSubstitution {
                        placeholder: name.clone(),
                        reason: format!("value contains control character U+{:04X}", u32::from(bad)),
                    });
                }
                let escaped: Cow<'_, str> = quick_xml::escape::escape(value);
                out.push_str(&escaped);
                out.push_str(markup);
            }
        }
    }
    Ok(out)
}

/// Separate visible text from the `<...>` tags of a placeholder region.
fn split_markup(region: &str) -> (String, String) {
    let mut visible = String::new();
    let mut markup = String::new();
    let mut in_tag = false;
    for ch in region.chars() {
        match (in_tag, ch) {
            (false, '<') => {
                in_tag = true;
                markup.push(ch);
            }
            (true, '>') => {
                in_tag = false;
                markup.push(ch);
            }
            (true, _) => markup.push(ch),
            (false, _) => visible.push(ch),
        }
    }
    (visible, markup)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Characters allowed in XML 1.0 content.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> RenderContext {
        pairs.iter().copied().collect()
    }

    #[test]
    fn parses_simple_placeholders() {
        let segments = parse_segments("doc", "<w:t>Dear {{ party }},</w:t>").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Text("<w:t>Dear ".to_string()),
                Segment::Placeholder {
                    name: "party".to_string(),
                    markup: String::new(),
                },
                Segment::Text(",</w:t>".to_string()),
            ]
        );
    }

    #[test]
    fn keeps_markup_of_split_runs() {
        let xml = "<w:t>{{</w:t></w:r><w:r><w:t>party}}</w:t>";
        let segments = parse_segments("doc", xml).unwrap();
        let rendered = render_segments(&segments, &context(&[("party", "Acme")])).unwrap();
        assert_eq!(rendered, "<w:t>Acme</w:t></w:r><w:r><w:t></w:t>");
    }

    #[test]
    fn joins_opening_braces_split_across_runs() {
        let xml = "<w:t>{</w:t></w:r><w:r><w:t>{party}}</w:t>";
        let segments = parse_segments("doc", xml).unwrap();
        assert_eq!(
            segments[1],
            Segment::Placeholder {
                name: "party".to_string(),
                markup: "</w:t></w:r><w:r><w:t>".to_string(),
            }
        );
        let rendered = render_segments(&segments, &context(&[("party", "Acme")])).unwrap();
        assert_eq!(rendered, "<w:t>Acme</w:t></w:r><w:r><w:t></w:t>");

        let err = render_segments(&segments, &RenderContext::new()).unwrap_err();
        assert_eq!(err, RenderError::MissingPlaceholder("party".to_string()));
    }

    #[test]
    fn joins_closing_braces_split_across_runs() {
        let xml = "<w:t>{{party}</w:t></w:r><w:r><w:t>} signs</w:t>";
        let segments = parse_segments("doc", xml).unwrap();
        let rendered = render_segments(&segments, &context(&[("party", "Acme")])).unwrap();
        assert_eq!(rendered, "<w:t>Acme</w:t></w:r><w:r><w:t> signs</w:t>");
    }

    #[test]
    fn single_braces_are_literal_text() {
        let xml = "<w:t>a { b } c</w:t>";
        assert_eq!(
            parse_segments("doc", xml).unwrap(),
            vec![Segment::Text(xml.to_string())]
        );
    }

    #[test]
    fn braces_inside_tags_are_ignored() {
        let xml = r#"<w:t w:val="{{x}}">{{party}}</w:t>"#;
        let segments = parse_segments("doc", xml).unwrap();
        assert_eq!(segments[0], Segment::Text(r#"<w:t w:val="{{x}}">"#.to_string()));
        assert!(matches!(&segments[1], Segment::Placeholder { name, .. } if name == "party"));
    }

    #[test]
    fn stray_closing_braces_are_rejected() {
        for xml in ["<w:t>party}}</w:t>", "<w:t>}</w:t><w:t>}</w:t>", "{{a}} and b}}"] {
            let err = parse_segments("word/document.xml", xml).unwrap_err();
            match err {
                TemplateError::MalformedPlaceholder { reason, .. } => {
                    assert_eq!(reason, "closing braces without a placeholder", "{xml}");
                }
                other => panic!("unexpected error for {xml}: {other:?}"),
            }
        }
    }

    #[test]
    fn escapes_values() {
        let segments = parse_segments("doc", "<w:t>{{party}}</w:t>").unwrap();
        let rendered = render_segments(&segments, &context(&[("party", "Smith & <Sons>")])).unwrap();
        assert_eq!(rendered, "<w:t>Smith &amp; &lt;Sons&gt;</w:t>");
    }

    #[test]
    fn missing_value_is_an_error() {
        let segments = parse_segments("doc", "{{party}}").unwrap();
        let err = render_segments(&segments, &RenderContext::new()).unwrap_err();
        assert_eq!(err, RenderError::MissingPlaceholder("party".to_string()));
    }

    #[test]
    fn empty_value_renders_blank() {
        let segments = parse_segments("doc", "[{{party}}]").unwrap();
        let rendered = render_segments(&segments, &context(&[("party", "")])).unwrap();
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn control_characters_are_invalid_substitutions() {
        let segments = parse_segments("doc", "{{party}}").unwrap();
        let err = render_segments(&segments, &context(&[("party", "a\u{1}b")])).unwrap_err();
        assert!(matches!(err, RenderError::InvalidSubstitution { .. }));
    }

    #[test]
    fn malformed_templates_are_rejected() {
        for xml in ["{{party", "{{ }}", "{{ a {{ b }}", "{{party|upper}}", "{% if x %}", "{{<w:t}}", "{</w:t><w:t>{ }}"] {
            let result = parse_segments("word/document.xml", xml);
            assert!(
                matches!(result, Err(TemplateError::MalformedPlaceholder { .. })),
                "{xml} should be rejected"
            );
        }
    }
}
