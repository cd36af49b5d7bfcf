//! Parser for the pipeline steps reference: the plugin index page and the
//! per-plugin pages listing each step with its parameters.

use crate::markdown;
use crate::model::{InstructionKind, Parameter, Plugin, Step};
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::warn;
use url::Url;

/// Category labels whose parameter carries nested field names in `values`
/// rather than enum values. Kept verbatim as the parameter type.
const NESTED_OBJECT_LABELS: &[&str] = &[
    "Nested object",
    "Nested choice of objects",
    "Array / list of nested object",
    "Array / list of nested choice of objects",
];

fn plugin_link_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("div.container ul li a").expect("invalid link selector"))
}

fn sect2_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse(".sect2").expect("invalid sect2 selector"))
}

fn code_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("code").expect("invalid code selector"))
}

fn bold_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("b, strong").expect("invalid bold selector"))
}

/// Parse the plugin index page into one `Plugin` per listed anchor, hrefs
/// resolved against the site base.
pub fn parse_plugins(index_html: &str, site_base: &str) -> Vec<Plugin> {
    let document = Html::parse_document(index_html);
    let base = Url::parse(site_base).ok();

    document
        .select(plugin_link_selector())
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = match &base {
                Some(base) => base.join(href).map(String::from).unwrap_or_else(|_| href.to_string()),
                None => href.to_string(),
            };
            let name = super::element_text(anchor).trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(Plugin {
                id: plugin_id_from_url(&url),
                name,
                url,
            })
        })
        .collect()
}

/// Derive a plugin id from its documentation URL: the last non-empty path
/// segment, lowercased. `"unknown"` when the URL has no path segments.
pub fn plugin_id_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()?
                .filter(|segment| !segment.is_empty())
                .last()
                .map(|segment| segment.to_lowercase())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Parse one plugin's reference page into its steps.
pub fn parse_steps(page_html: &str, plugin_id: &str) -> Vec<Step> {
    let document = Html::parse_document(page_html);
    document
        .select(sect2_selector())
        .filter_map(|subsection| parse_step(subsection, plugin_id))
        .collect()
}

fn parse_step(subsection: ElementRef<'_>, plugin_id: &str) -> Option<Step> {
    let heading = super::first_child_tag(subsection, "h3")?;
    let command = heading
        .select(code_selector())
        .next()
        .map(|code| super::element_text(code).trim().to_string())
        .unwrap_or_default();
    if command.is_empty() {
        return None;
    }
    let name = super::element_text(heading).trim().to_string();

    // The lead block plus any loose text or inline code dangling directly
    // under the subsection; some pages put description fragments there.
    let mut description_html = super::first_child_tag(subsection, "div")
        .map(|lead| lead.inner_html())
        .unwrap_or_default();
    for node in subsection.children() {
        if let Some(text) = node.value().as_text() {
            description_html.push_str(text);
        } else if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == "code" {
                description_html.push_str(&element.html());
            }
        }
    }
    let description = markdown::normalize(Some(&description_html));

    let mut parameters = Vec::new();
    for list in super::child_elements(subsection).filter(|e| e.value().name() == "ul") {
        for item in super::child_elements(list).filter(|e| e.value().name() == "li") {
            parameters.push(parse_parameter(item, &command));
        }
    }

    Some(Step {
        name,
        description,
        instruction_type: InstructionKind::Step,
        command,
        plugin: plugin_id.to_string(),
        parameters,
    })
}

fn parse_parameter(item: ElementRef<'_>, command: &str) -> Parameter {
    let name = super::first_child_tag(item, "code")
        .map(|code| super::element_text(code).trim().to_string())
        .unwrap_or_default();

    let description = super::first_child_tag(item, "div")
        .map(|block| markdown::normalize(Some(&block.inner_html())))
        .unwrap_or_default();

    // "optional" appears in the item's own loose text, never nested
    let is_optional = super::own_text(item).to_lowercase().contains("optional");

    let mut param_type = String::from("unknown");
    let mut values = Vec::new();
    for list in super::child_elements(item).filter(|e| matches!(e.value().name(), "ul" | "ol")) {
        for category in super::child_elements(list).filter(|e| e.value().name() == "li") {
            apply_category(category, &mut param_type, &mut values, command, &name);
        }
    }

    Parameter {
        name,
        description,
        instruction_type: InstructionKind::Parameter,
        param_type,
        values,
        is_optional,
    }
}

/// Interpret one bold-labelled category inside a parameter's nested list.
fn apply_category(
    category: ElementRef<'_>,
    param_type: &mut String,
    values: &mut Vec<String>,
    command: &str,
    parameter: &str,
) {
    let Some(label_element) = category.select(bold_selector()).next() else {
        return;
    };
    let raw_label = super::element_text(label_element);
    let label = raw_label.trim().trim_end_matches(':').trim();

    if label == "Type" {
        if let Some(first) = code_texts(category).into_iter().next() {
            *param_type = first;
        }
    } else if label == "Values" {
        *param_type = "Enum".to_string();
        *values = code_texts(category);
    } else if let Some(phrase) = NESTED_OBJECT_LABELS
        .iter()
        .find(|phrase| phrase.eq_ignore_ascii_case(label))
    {
        // Overloaded on purpose: for nested objects `values` holds the
        // nested field names, matching the published corpus shape.
        *param_type = (*phrase).to_string();
        *values = code_texts(category);
    } else {
        warn!(command, parameter, label, "unmatched parameter type label");
    }
}

fn code_texts(category: ElementRef<'_>) -> Vec<String> {
    category
        .select(code_selector())
        .map(|code| super::element_text(code).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
