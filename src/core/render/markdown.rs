use regex::Regex;
use std::sync::OnceLock;

// Line-oriented markdown-lite used for the agent's free-text messages.
// Single pass over newline-split input, no nesting, no state carried
// between lines.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdSpan {
    pub text: String,
    pub strong: bool,
}

impl MdSpan {
    fn plain(text: &str) -> Self {
        MdSpan {
            text: text.to_string(),
            strong: false,
        }
    }

    fn strong(text: &str) -> Self {
        MdSpan {
            text: text.to_string(),
            strong: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdBlock {
    Heading { level: u8, text: String },
    Bullet(Vec<MdSpan>),
    Numbered(Vec<MdSpan>),
    Paragraph(Vec<MdSpan>),
    Spacer,
}

fn ordered_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").unwrap())
}

/// Splits a line into spans, promoting `**`-delimited segments to strong
/// emphasis. An odd number of delimiters means the line is unbalanced: no
/// emphasis is applied and the text is preserved verbatim.
pub fn inline_spans(text: &str) -> Vec<MdSpan> {
    let delimiters = text.matches("**").count();
    if delimiters == 0 || delimiters % 2 != 0 {
        return vec![MdSpan::plain(text)];
    }

    let mut spans = Vec::new();
    let mut remaining = text;
    while let Some(start) = remaining.find("**") {
        if start > 0 {
            spans.push(MdSpan::plain(&remaining[..start]));
        }
        let after_open = &remaining[start + 2..];
        match after_open.find("**") {
            Some(end) => {
                spans.push(MdSpan::strong(&after_open[..end]));
                remaining = &after_open[end + 2..];
            }
            None => {
                // Even count makes this unreachable, but degrade to literal
                // rather than dropping text.
                spans.push(MdSpan::plain(&remaining[start..]));
                remaining = "";
            }
        }
    }
    if !remaining.is_empty() {
        spans.push(MdSpan::plain(remaining));
    }
    spans
}

/// Renders a message into display blocks. Per line, in priority order:
/// `### `, `## `, `# `, `- `/`* `, `<digits>. `, blank (kept as a spacer),
/// else paragraph. Headings keep their text raw; all other lines get inline
/// emphasis. Empty input produces nothing.
pub fn parse_blocks(text: &str) -> Vec<MdBlock> {
    if text.is_empty() {
        return Vec::new();
    }

    text.split('\n')
        .map(|line| {
            if let Some(rest) = line.strip_prefix("### ") {
                MdBlock::Heading {
                    level: 3,
                    text: rest.to_string(),
                }
            } else if let Some(rest) = line.strip_prefix("## ") {
                MdBlock::Heading {
                    level: 2,
                    text: rest.to_string(),
                }
            } else if let Some(rest) = line.strip_prefix("# ") {
                MdBlock::Heading {
                    level: 1,
                    text: rest.to_string(),
                }
            } else if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
                MdBlock::Bullet(inline_spans(rest))
            } else if let Some(found) = ordered_marker().find(line) {
                MdBlock::Numbered(inline_spans(&line[found.end()..]))
            } else if line.trim().is_empty() {
                MdBlock::Spacer
            } else {
                MdBlock::Paragraph(inline_spans(line))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_emphasis_produces_one_strong_span() {
        let spans = inline_spans("**bold**");
        assert_eq!(spans, vec![MdSpan::strong("bold")]);
        assert!(spans.iter().all(|s| !s.text.contains("**")));
    }

    #[test]
    fn emphasis_embedded_in_plain_text() {
        let spans = inline_spans("a **b** c");
        assert_eq!(
            spans,
            vec![MdSpan::plain("a "), MdSpan::strong("b"), MdSpan::plain(" c")]
        );
    }

    #[test]
    fn unbalanced_delimiter_preserves_text_verbatim() {
        assert_eq!(inline_spans("**unbalanced"), vec![MdSpan::plain("**unbalanced")]);
    }

    #[test]
    fn odd_delimiter_count_disables_emphasis_for_the_whole_line() {
        assert_eq!(
            inline_spans("**a** b **c"),
            vec![MdSpan::plain("**a** b **c")]
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(inline_spans("no markup"), vec![MdSpan::plain("no markup")]);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(parse_blocks("").is_empty());
    }

    #[test]
    fn heading_levels_match_hash_count() {
        let blocks = parse_blocks("# one\n## two\n### three");
        assert_eq!(
            blocks,
            vec![
                MdBlock::Heading { level: 1, text: "one".into() },
                MdBlock::Heading { level: 2, text: "two".into() },
                MdBlock::Heading { level: 3, text: "three".into() },
            ]
        );
    }

    #[test]
    fn bullets_accept_both_markers() {
        let blocks = parse_blocks("- dash\n* star");
        assert_eq!(blocks[0], MdBlock::Bullet(vec![MdSpan::plain("dash")]));
        assert_eq!(blocks[1], MdBlock::Bullet(vec![MdSpan::plain("star")]));
    }

    #[test]
    fn ordered_items_strip_their_marker() {
        let blocks = parse_blocks("12. twelfth");
        assert_eq!(blocks, vec![MdBlock::Numbered(vec![MdSpan::plain("twelfth")])]);
    }

    #[test]
    fn blank_lines_become_spacers_not_dropped() {
        let blocks = parse_blocks("a\n\nb");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], MdBlock::Spacer);
    }

    #[test]
    fn everything_else_is_a_paragraph_with_emphasis() {
        let blocks = parse_blocks("total: **$24,500.00**");
        assert_eq!(
            blocks,
            vec![MdBlock::Paragraph(vec![
                MdSpan::plain("total: "),
                MdSpan::strong("$24,500.00"),
            ])]
        );
    }
}
