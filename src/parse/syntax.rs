//! Parser for the pipeline syntax book page: the declarative-pipeline
//! sections (`agent`, `post`, `stages`, …) and directives (`parameters`,
//! `when`, …). Both live on the same page under their own marker heading and
//! share one markup shape, so one parser handles both kinds.

use crate::markdown;
use crate::model::{InstructionKind, Section};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Child-instruction names per section name. Hand-curated, not derived from
/// the page: the documentation nowhere lists them in a machine-readable form.
const SECTION_INNER_INSTRUCTIONS: &[(&str, &[&str])] = &[
    ("agent", &["label", "node", "docker", "dockerfile", "kubernetes"]),
    (
        "post",
        &[
            "always",
            "changed",
            "fixed",
            "regression",
            "aborted",
            "failure",
            "success",
            "unstable",
            "unsuccessful",
            "cleanup",
        ],
    ),
    ("stages", &["stage"]),
    ("steps", &["step"]),
];

/// Child-instruction names per directive name.
const DIRECTIVE_INNER_INSTRUCTIONS: &[(&str, &[&str])] = &[
    ("parameters", &["string", "text", "booleanParam", "choice", "password"]),
    ("triggers", &["cron", "pollSCM", "upstream"]),
    ("tools", &["maven", "jdk", "gradle"]),
    (
        "input",
        &["message", "id", "ok", "submitter", "submitterParameter", "parameters"],
    ),
    (
        "when",
        &[
            "branch",
            "buildingTag",
            "changelog",
            "changeset",
            "changeRequest",
            "environment",
            "equals",
            "expression",
            "tag",
            "not",
            "allOf",
            "anyOf",
            "triggeredBy",
        ],
    ),
];

/// The "Jenkins cron syntax" block is a cross-reference help entry that the
/// page formats like a directive; it is not one.
const CRON_SYNTAX_NAME: &str = "Jenkins cron syntax";

fn sections_marker() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| {
        Selector::parse(r#"[id="declarative-sections"]"#).expect("invalid marker selector")
    })
}

fn directives_marker() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| {
        Selector::parse(r#"[id="declarative-directives"]"#).expect("invalid marker selector")
    })
}

fn sect3_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse(".sect3").expect("invalid sect3 selector"))
}

fn trailing_period_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.\s*$").expect("invalid trailing-period pattern"))
}

/// Parse the declarative-pipeline sections from the syntax page.
pub fn parse_sections(html: &str, page_url: &str) -> Vec<Section> {
    parse_kind(html, page_url, InstructionKind::Section)
}

/// Parse the declarative-pipeline directives from the syntax page.
pub fn parse_directives(html: &str, page_url: &str) -> Vec<Section> {
    parse_kind(html, page_url, InstructionKind::Directive)
}

fn parse_kind(html: &str, page_url: &str, kind: InstructionKind) -> Vec<Section> {
    let document = Html::parse_document(html);
    let marker = match kind {
        InstructionKind::Section => sections_marker(),
        InstructionKind::Directive => directives_marker(),
        _ => return Vec::new(),
    };

    // The marker id sits on the container's heading; the `.sect3` blocks are
    // siblings of that heading inside the container.
    let Some(container) = document
        .select(marker)
        .next()
        .and_then(|heading| heading.parent())
        .and_then(ElementRef::wrap)
    else {
        return Vec::new();
    };

    let mut entries: Vec<Section> = container
        .select(sect3_selector())
        .filter_map(|block| parse_block(block, page_url, kind))
        .filter(|section| section.name != CRON_SYNTAX_NAME)
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

fn parse_block(block: ElementRef<'_>, page_url: &str, kind: InstructionKind) -> Option<Section> {
    let heading = super::first_child_tag(block, "h4")?;
    let name = super::element_text(heading).replace('\n', "");

    let url = super::child_elements(heading)
        .find(|e| e.value().name() == "a" && super::has_class(*e, "anchor"))
        .and_then(|a| a.value().attr("href"))
        .map(|fragment| format!("{page_url}{fragment}"))
        .unwrap_or_else(|| page_url.to_string());

    let description = super::child_elements(block)
        .find(|e| e.value().name() == "div" && super::has_class(*e, "paragraph"))
        .map(|lead| {
            let html = lead.inner_html().replace('\n', " ");
            markdown::to_markdown(Some(&html), Some(page_url))
        })
        .unwrap_or_default();

    let table = super::child_elements(block)
        .find(|e| e.value().name() == "table" && super::has_class(*e, "syntax"));

    let allowed = table
        .and_then(|t| syntax_row(t, "Allowed"))
        .and_then(|row| find_descendant_paragraph(row))
        .map(|paragraph| {
            let html = paragraph.inner_html().replace('\n', "");
            let text = markdown::normalize(Some(&html));
            trailing_period_re().replace(&text, "").into_owned()
        })
        .unwrap_or_default();

    // Anything other than an explicit "Yes" (including a missing row) reads
    // as optional, matching the published corpus.
    let is_optional = table
        .and_then(|t| syntax_row(t, "Required"))
        .and_then(|row| find_descendant_paragraph(row))
        .and_then(|paragraph| super::first_child_tag(paragraph, "p"))
        .map(|p| super::element_text(p))
        .as_deref()
        != Some("Yes");

    Some(Section {
        inner_instructions: inner_instructions(kind, &name),
        name,
        description,
        instruction_type: kind,
        is_optional,
        allowed,
        url,
    })
}

/// Find the `<tr>` whose header cell labels it with `label`.
fn syntax_row<'a>(table: ElementRef<'a>, label: &str) -> Option<ElementRef<'a>> {
    let body = super::first_child_tag(table, "tbody")?;
    super::child_elements(body)
        .filter(|e| e.value().name() == "tr")
        .find(|row| {
            super::first_child_tag(*row, "th")
                .map(|th| super::element_text(th).contains(label))
                .unwrap_or(false)
        })
}

fn find_descendant_paragraph(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    static SEL: OnceLock<Selector> = OnceLock::new();
    let sel = SEL.get_or_init(|| Selector::parse(".paragraph").expect("invalid paragraph selector"));
    row.select(sel).next()
}

fn inner_instructions(kind: InstructionKind, name: &str) -> Vec<String> {
    let table = match kind {
        InstructionKind::Section => SECTION_INNER_INSTRUCTIONS,
        InstructionKind::Directive => DIRECTIVE_INNER_INSTRUCTIONS,
        _ => return Vec::new(),
    };
    table
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, children)| children.iter().map(|c| (*c).to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNTAX_PAGE: &str = include_str!("../../tests/fixtures/syntax_page.html");
    const PAGE_URL: &str = "https://www.jenkins.io/doc/book/pipeline/syntax/";

    #[test]
    fn sections_are_parsed_and_sorted_by_name() {
        let sections = parse_sections(SYNTAX_PAGE, PAGE_URL);
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["agent", "post", "stages"]);
        for section in &sections {
            assert_eq!(section.instruction_type, InstructionKind::Section);
        }
    }

    #[test]
    fn required_yes_means_not_optional() {
        let sections = parse_sections(SYNTAX_PAGE, PAGE_URL);
        let agent = sections.iter().find(|s| s.name == "agent").unwrap();
        assert!(!agent.is_optional);
        let post = sections.iter().find(|s| s.name == "post").unwrap();
        assert!(post.is_optional);
    }

    #[test]
    fn allowed_text_loses_trailing_period() {
        let sections = parse_sections(SYNTAX_PAGE, PAGE_URL);
        let agent = sections.iter().find(|s| s.name == "agent").unwrap();
        assert_eq!(
            agent.allowed,
            "In the top-level `pipeline` block and each `stage` block"
        );
    }

    #[test]
    fn description_links_resolve_against_page_url() {
        let sections = parse_sections(SYNTAX_PAGE, PAGE_URL);
        let agent = sections.iter().find(|s| s.name == "agent").unwrap();
        assert!(agent.description.contains(&format!("({PAGE_URL}#agent-parameters)")));
        assert!(!agent.description.contains("<a"));
    }

    #[test]
    fn heading_anchor_builds_url() {
        let sections = parse_sections(SYNTAX_PAGE, PAGE_URL);
        let post = sections.iter().find(|s| s.name == "post").unwrap();
        assert_eq!(post.url, format!("{PAGE_URL}#post"));
    }

    #[test]
    fn inner_instruction_tables_apply() {
        let sections = parse_sections(SYNTAX_PAGE, PAGE_URL);
        let agent = sections.iter().find(|s| s.name == "agent").unwrap();
        assert_eq!(
            agent.inner_instructions,
            vec!["label", "node", "docker", "dockerfile", "kubernetes"]
        );
        let stages = sections.iter().find(|s| s.name == "stages").unwrap();
        assert_eq!(stages.inner_instructions, vec!["stage"]);
    }

    #[test]
    fn directives_drop_the_cron_syntax_entry() {
        let directives = parse_directives(SYNTAX_PAGE, PAGE_URL);
        let names: Vec<&str> = directives.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["parameters", "tools", "when"]);
        for directive in &directives {
            assert_eq!(directive.instruction_type, InstructionKind::Directive);
        }
    }

    #[test]
    fn missing_table_reads_as_optional_with_empty_allowed() {
        let directives = parse_directives(SYNTAX_PAGE, PAGE_URL);
        let tools = directives.iter().find(|d| d.name == "tools").unwrap();
        assert!(tools.is_optional);
        assert_eq!(tools.allowed, "");
        assert!(tools.description.contains("`PATH`"));
    }

    #[test]
    fn unknown_names_get_no_inner_instructions() {
        let directives = parse_directives(SYNTAX_PAGE, PAGE_URL);
        let params = directives.iter().find(|d| d.name == "parameters").unwrap();
        assert_eq!(
            params.inner_instructions,
            vec!["string", "text", "booleanParam", "choice", "password"]
        );
        // The fixture's `when` table is present; an unrecognized name would be empty
        assert!(inner_instructions(InstructionKind::Directive, "nonsense").is_empty());
    }

    #[test]
    fn inner_instruction_tables_are_per_kind() {
        // A section name looked up as a directive (and vice versa) finds nothing
        assert!(inner_instructions(InstructionKind::Directive, "agent").is_empty());
        assert!(inner_instructions(InstructionKind::Section, "when").is_empty());
        assert_eq!(
            inner_instructions(InstructionKind::Directive, "tools"),
            vec!["maven", "jdk", "gradle"]
        );
    }

    #[test]
    fn missing_marker_yields_empty_list() {
        let sections = parse_sections("<html><body></body></html>", PAGE_URL);
        assert!(sections.is_empty());
    }
}
