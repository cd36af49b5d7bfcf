//! Consumer-side lookup index over a loaded corpus.
//!
//! Built once from the deserialized artifact and passed by reference; it
//! renders the hover Markdown and the completion insert-texts the editor
//! integration shows.

use std::collections::HashMap;

use crate::model::{Corpus, InstructionKind, Parameter, Section, Step, Variable};

/// One entry looked up by key: a step by its `command`, everything else by
/// its `name`.
#[derive(Debug, Clone, Copy)]
pub enum IndexEntry<'a> {
    Step(&'a Step),
    Section(&'a Section),
    Directive(&'a Section),
    Variable(&'a Variable),
}

impl<'a> IndexEntry<'a> {
    pub fn kind(self) -> InstructionKind {
        match self {
            IndexEntry::Step(_) => InstructionKind::Step,
            IndexEntry::Section(_) => InstructionKind::Section,
            IndexEntry::Directive(_) => InstructionKind::Directive,
            IndexEntry::Variable(_) => InstructionKind::Variable,
        }
    }

    pub fn key(self) -> &'a str {
        match self {
            IndexEntry::Step(step) => &step.command,
            IndexEntry::Section(section) | IndexEntry::Directive(section) => &section.name,
            IndexEntry::Variable(variable) => &variable.name,
        }
    }
}

/// Immutable lookup table over one corpus.
pub struct DocIndex<'a> {
    entries: HashMap<&'a str, IndexEntry<'a>>,
}

impl<'a> DocIndex<'a> {
    /// Build the index. Steps are inserted first, so a step command shadows
    /// a same-named section, directive, or variable; within a kind the first
    /// entry wins.
    pub fn build(corpus: &'a Corpus) -> Self {
        let mut entries = HashMap::new();
        for step in &corpus.instructions {
            entries
                .entry(step.command.as_str())
                .or_insert(IndexEntry::Step(step));
        }
        for section in &corpus.sections {
            entries
                .entry(section.name.as_str())
                .or_insert(IndexEntry::Section(section));
        }
        for directive in &corpus.directives {
            entries
                .entry(directive.name.as_str())
                .or_insert(IndexEntry::Directive(directive));
        }
        for variable in &corpus.environment_variables {
            entries
                .entry(variable.name.as_str())
                .or_insert(IndexEntry::Variable(variable));
        }
        DocIndex { entries }
    }

    pub fn get(&self, key: &str) -> Option<IndexEntry<'a>> {
        self.entries.get(key).copied()
    }

    /// All keys of one kind, sorted.
    pub fn keys_of_kind(&self, kind: InstructionKind) -> Vec<&'a str> {
        let mut keys: Vec<&str> = self
            .entries
            .values()
            .filter(|entry| entry.kind() == kind)
            .map(|entry| entry.key())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<&'a str> {
        let mut keys: Vec<&str> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

/// Render the tooltip Markdown for one entry.
pub fn hover_markdown(entry: IndexEntry<'_>) -> String {
    match entry {
        IndexEntry::Step(step) => {
            // Title straight into parameter blocks; the step description
            // stays artifact-only
            let mut parts = vec![format!("### {}", step.name)];
            for parameter in &step.parameters {
                parts.push(parameter_markdown(parameter));
            }
            parts.join("\n\n")
        }
        IndexEntry::Section(section) | IndexEntry::Directive(section) => {
            let mut parts = vec![format!("### {}", section.name)];
            if !section.description.is_empty() {
                parts.push(section.description.clone());
            }
            if !section.allowed.is_empty() {
                parts.push(format!("**Allowed**: {}", section.allowed));
            }
            parts.join("\n\n")
        }
        IndexEntry::Variable(variable) => {
            format!("### {}\n\n{}", variable.name, variable.description)
        }
    }
}

/// One parameter's tooltip block: name, type, optional marker, value list,
/// description.
fn parameter_markdown(parameter: &Parameter) -> String {
    let optional = if parameter.is_optional { " *(Optional)*" } else { "" };
    let mut markdown = format!("`{}`: **{}**{}", parameter.name, parameter.param_type, optional);
    if !parameter.values.is_empty() {
        markdown.push_str("\n\n");
        for value in &parameter.values {
            markdown.push_str(&format!("* {value}\n"));
        }
    }
    if !parameter.description.is_empty() {
        markdown.push_str("\n\n");
        markdown.push_str(&parameter.description);
    }
    markdown
}

/// Snippet text inserted when the entry is picked from the completion list.
/// Placeholders use editor snippet syntax (`$0`, `${1|a,b|}`).
pub fn insert_text(entry: IndexEntry<'_>) -> String {
    match entry {
        IndexEntry::Step(step) => {
            if step.parameters.is_empty() {
                step.command.clone()
            } else {
                format!("{}($0)", step.command)
            }
        }
        IndexEntry::Section(section) | IndexEntry::Directive(section) => {
            if section.inner_instructions.is_empty() {
                format!("{} {{\n\t$0\n}}", section.name)
            } else {
                format!(
                    "{} {{\n\t${{1|{}|}}\n}}",
                    section.name,
                    section.inner_instructions.join(",")
                )
            }
        }
        IndexEntry::Variable(variable) => format!("env.{}", variable.name),
    }
}

/// Snippet text for one step parameter inside a call.
pub fn parameter_insert_text(parameter: &Parameter) -> String {
    match parameter.param_type.as_str() {
        "String" => format!("{}: '$0'", parameter.name),
        "boolean" => format!("{}: ${{1|true,false|}}", parameter.name),
        "Enum" if !parameter.values.is_empty() => {
            format!("{}: '${{1|{}|}}'", parameter.name, parameter.values.join(","))
        }
        _ => format!("{}: ", parameter.name),
    }
}
