// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Chat-flavored markdown to HTML.
//!
//! Only the delimited subset chat clients use is recognized: code blocks,
//! inline code, bold, underline, italic, strikethrough, spoilers and `> `
//! quotes. Everything else passes through as escaped text, so reference tokens
//! like `<@123>` come out as `&lt;@123&gt;` for later passes to pick up.
//!
//! # Example
//!
//! ```
//! use chatfmt::markdown::to_html;
//!
//! assert_eq!(to_html("**hi** <@1>"), "<strong>hi</strong> &lt;@1&gt;");
//! ```

use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

static CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z0-9_+\-]*\n)?(.+?)```|`([^`]+)`").expect("valid code regex")
});

/// Escaped reference tokens: mentions and custom emoji.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&lt;(?:@!?\d+|@&amp;\d+|#\d+|a?:\w+:\d+)&gt;").expect("valid reference regex")
});

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x{E000}(\d+)\x{E001}").expect("valid placeholder regex")
});

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Inline markup, applied in order. Combined bold italic runs first, then
/// bold before italic so `**` is not read as two empty emphasis spans.
static INLINE: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?s)\*\*\*(.+?)\*\*\*", "<strong><em>$1</em></strong>"),
        (r"(?s)\*\*(.+?)\*\*", "<strong>$1</strong>"),
        (r"(?s)__(.+?)__", "<u>$1</u>"),
        (r"(?s)\*(.+?)\*", "<em>$1</em>"),
        (r"(?s)\b_(.+?)_\b", "<em>$1</em>"),
        (r"(?s)~~(.+?)~~", "<s>$1</s>"),
        (r"(?s)\|\|(.+?)\|\|", r#"<span class="spoiler">$1</span>"#),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid inline markup regex"),
            replacement,
        )
    })
    .collect()
});

/// Converts raw message text to HTML.
///
/// All literal text is escaped. Markup inside code spans and blocks is left
/// alone.
#[must_use]
pub fn to_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    let mut last = 0;

    for caps in CODE.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&format_text(&raw[last..whole.start()]));

        if let Some(block) = caps.get(1) {
            let code = block.as_str();
            let code = code.strip_suffix('\n').unwrap_or(code);
            write!(
                out,
                r#"<div class="pre pre--multiline">{}</div>"#,
                escape_html(code)
            )
            .unwrap();
        } else if let Some(inline) = caps.get(2) {
            write!(
                out,
                r#"<span class="pre pre--inline">{}</span>"#,
                escape_html(inline.as_str())
            )
            .unwrap();
        }
        last = whole.end();
    }

    out.push_str(&format_text(&raw[last..]));
    out
}

/// Escapes the characters HTML treats specially in text and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            PLACEHOLDER_OPEN | PLACEHOLDER_CLOSE => write!(result, "&#{};", u32::from(c)).unwrap(),
            _ => result.push(c),
        }
    }
    result
}

/// A run of lines rendered as one unit.
struct Block<'a> {
    quote: bool,
    lines: Vec<&'a str>,
}

fn format_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let (escaped, tokens) = shield_references(&escape_html(text));

    let mut html = String::with_capacity(escaped.len());
    for block in split_blocks(&escaped) {
        let body = format_inline(&block.lines.join("\n"));
        if block.quote {
            write!(html, r#"<div class="quote">{body}</div>"#).unwrap();
        } else {
            html.push_str(&body);
        }
    }

    restore_references(&html, &tokens)
}

/// Applies inline markup to one block body. Spans never cross blocks.
fn format_inline(body: &str) -> String {
    let mut html = body.to_owned();
    for (re, replacement) in INLINE.iter() {
        html = re.replace_all(&html, *replacement).into_owned();
    }
    html.replace('\n', "<br>")
}

/// Groups consecutive `> ` lines into quote blocks and the rest into plain
/// blocks.
///
/// Runs on escaped text, so the marker is `&gt; `. Quote blocks are block
/// elements and take the place of the surrounding line breaks.
fn split_blocks(escaped: &str) -> Vec<Block<'_>> {
    let mut blocks: Vec<Block<'_>> = Vec::new();

    for line in escaped.split('\n') {
        let (quote, line) = match line.strip_prefix("&gt; ") {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        match blocks.last_mut() {
            Some(block) if block.quote == quote => block.lines.push(line),
            _ => blocks.push(Block {
                quote,
                lines: vec![line],
            }),
        }
    }

    blocks
}

/// Swaps escaped reference tokens for numbered placeholders so inline
/// markup cannot reach into them (emoji names may contain `_`).
///
/// The placeholder delimiters are private-use characters. Any literal
/// occurrence was already turned into a numeric entity by [`escape_html`].
fn shield_references(escaped: &str) -> (String, Vec<String>) {
    let mut tokens = Vec::new();
    let shielded = REFERENCE
        .replace_all(escaped, |caps: &regex::Captures<'_>| {
            tokens.push(caps[0].to_owned());
            format!("{PLACEHOLDER_OPEN}{}{PLACEHOLDER_CLOSE}", tokens.len() - 1)
        })
        .into_owned();
    (shielded, tokens)
}

fn restore_references(html: &str, tokens: &[String]) -> String {
    if tokens.is_empty() {
        return html.to_owned();
    }
    PLACEHOLDER
        .replace_all(html, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| tokens.get(i))
                .map_or_else(|| caps[0].to_owned(), Clone::clone)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_literal_markup() {
        assert_eq!(to_html("<b>&\"</b>"), "&lt;b&gt;&amp;&quot;&lt;/b&gt;");
    }

    #[test]
    fn keeps_reference_tokens_in_escaped_form() {
        assert_eq!(
            to_html("<@123> <@&5> <#6> <:wave:7>"),
            "&lt;@123&gt; &lt;@&amp;5&gt; &lt;#6&gt; &lt;:wave:7&gt;"
        );
    }

    #[test]
    fn formats_emphasis() {
        assert_eq!(to_html("**bold**"), "<strong>bold</strong>");
        assert_eq!(to_html("__under__"), "<u>under</u>");
        assert_eq!(to_html("*it* and _it_"), "<em>it</em> and <em>it</em>");
        assert_eq!(to_html("~~gone~~"), "<s>gone</s>");
        assert_eq!(
            to_html("||secret||"),
            r#"<span class="spoiler">secret</span>"#
        );
    }

    #[test]
    fn nests_bold_inside_spoiler() {
        assert_eq!(
            to_html("||**x**||"),
            r#"<span class="spoiler"><strong>x</strong></span>"#
        );
    }

    #[test]
    fn nests_bold_and_italic() {
        assert_eq!(to_html("***x***"), "<strong><em>x</em></strong>");
    }

    #[test]
    fn spans_do_not_cross_quote_blocks() {
        assert_eq!(
            to_html("*a\n> b*"),
            r#"*a<div class="quote">b*</div>"#
        );
        assert_eq!(
            to_html("> **a**\nb"),
            r#"<div class="quote"><strong>a</strong></div>b"#
        );
    }

    #[test]
    fn leaves_emoji_names_untouched() {
        assert_eq!(to_html("<:_sad_:1>"), "&lt;:_sad_:1&gt;");
        assert_eq!(
            to_html("<:a__b:1> and <:c__d:2>"),
            "&lt;:a__b:1&gt; and &lt;:c__d:2&gt;"
        );
        assert_eq!(
            to_html("_hi_ <:x_y:3> *yo*"),
            "<em>hi</em> &lt;:x_y:3&gt; <em>yo</em>"
        );
    }

    #[test]
    fn escapes_literal_placeholder_characters() {
        assert_eq!(to_html("\u{E000}0\u{E001}"), "&#57344;0&#57345;");
    }

    #[test]
    fn leaves_snake_case_alone() {
        assert_eq!(to_html("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn does_not_format_inside_code() {
        assert_eq!(
            to_html("`**x** <y>`"),
            r#"<span class="pre pre--inline">**x** &lt;y&gt;</span>"#
        );
        assert_eq!(
            to_html("```rust\nlet _a_ = 1;\n```"),
            r#"<div class="pre pre--multiline">let _a_ = 1;</div>"#
        );
    }

    #[test]
    fn converts_line_breaks() {
        assert_eq!(to_html("a\nb"), "a<br>b");
    }

    #[test]
    fn groups_quote_lines() {
        assert_eq!(
            to_html("intro\n> one\n> two\nafter"),
            r#"intro<div class="quote">one<br>two</div>after"#
        );
    }

    #[test]
    fn handles_empty_input() {
        assert_eq!(to_html(""), "");
    }
}
