//! HTML parsers for the Jenkins documentation pages.

pub mod steps;
pub mod syntax;

use scraper::ElementRef;

/// Direct element children of a node, in document order.
pub(crate) fn child_elements<'a>(
    element: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// First direct child with the given tag name.
pub(crate) fn first_child_tag<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    child_elements(element).find(|e| e.value().name() == tag)
}

pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Full text content, nested elements included.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Text of the element's own text nodes only, nested elements excluded.
pub(crate) fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect()
}
