//! SVG social preview card for a poll.

use std::fmt::Write as _;

const MAX_QUESTION_CHARS: usize = 80;
const LINE_CHARS: usize = 40;
const MAX_LINES: usize = 3;

/// Poll fields shown on the share card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCard {
    pub question: String,
    pub category: Option<String>,
    pub total_votes: i64,
    pub creator_username: Option<String>,
}

/// Render the 1200x630 share card. All user-supplied text is XML-escaped.
#[must_use]
pub fn render_share_card(card: &ShareCard) -> String {
    let question = truncate_question(&card.question);
    let creator = card
        .creator_username
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or("anonymous");

    let mut svg = String::with_capacity(2048);
    svg.push_str(
        r##"<svg width="1200" height="630" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="bg" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:#09090b;stop-opacity:1" />
      <stop offset="100%" style="stop-color:#18181b;stop-opacity:1" />
    </linearGradient>
  </defs>
  <rect width="1200" height="630" fill="url(#bg)"/>
  <rect x="0" y="0" width="1200" height="4" fill="#3b82f6"/>
  <text x="60" y="80" font-family="system-ui, sans-serif" font-size="28" font-weight="bold" fill="#ffffff">Crowdcast</text>
"##,
    );

    if let Some(category) = card.category.as_deref().filter(|c| !c.is_empty()) {
        let badge_width = category.chars().count() * 12 + 24;
        let _ = write!(
            svg,
            r##"  <rect x="60" y="120" width="{badge_width}" height="32" rx="16" fill="#3b82f6" opacity="0.2"/>
  <text x="72" y="142" font-family="system-ui, sans-serif" font-size="14" fill="#3b82f6">{}</text>
"##,
            escape_xml(category)
        );
    }

    svg.push_str(
        r##"  <text x="60" y="260" font-family="system-ui, sans-serif" font-size="48" font-weight="bold" fill="#ffffff">"##,
    );
    for (i, line) in wrap_text(&question, LINE_CHARS).iter().enumerate() {
        let dy = if i == 0 { 0 } else { 58 };
        let _ = write!(svg, r#"<tspan x="60" dy="{dy}">{}</tspan>"#, escape_xml(line));
    }
    svg.push_str("</text>\n");

    let _ = write!(
        svg,
        r##"  <text x="60" y="520" font-family="system-ui, sans-serif" font-size="20" fill="#a1a1aa">{} votes &#183; by @{}</text>
  <rect x="60" y="555" width="200" height="44" rx="22" fill="#3b82f6"/>
  <text x="110" y="583" font-family="system-ui, sans-serif" font-size="16" font-weight="600" fill="#ffffff">Vote Now</text>
</svg>"##,
        card.total_votes,
        escape_xml(creator)
    );

    svg
}

fn truncate_question(question: &str) -> String {
    if question.chars().count() > MAX_QUESTION_CHARS {
        let head: String = question.chars().take(MAX_QUESTION_CHARS - 3).collect();
        format!("{head}...")
    } else {
        question.to_string()
    }
}

/// Escape the characters that are unsafe inside SVG text and attributes.
#[must_use]
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Greedy word wrap to at most three lines of `max_chars`.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if candidate_len > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.truncate(MAX_LINES);
    lines
}
