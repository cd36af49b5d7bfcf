use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind discriminant shared by every documented pipeline concept.
/// Serialized under the `instructionType` key using these exact strings;
/// the downstream consumer switches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionKind {
    Section,
    Directive,
    Step,
    Parameter,
    Variable,
}

impl InstructionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionKind::Section => "Section",
            InstructionKind::Directive => "Directive",
            InstructionKind::Step => "Step",
            InstructionKind::Parameter => "Parameter",
            InstructionKind::Variable => "Variable",
        }
    }
}

impl std::str::FromStr for InstructionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Section" => Ok(InstructionKind::Section),
            "Directive" => Ok(InstructionKind::Directive),
            "Step" => Ok(InstructionKind::Step),
            "Parameter" => Ok(InstructionKind::Parameter),
            "Variable" => Ok(InstructionKind::Variable),
            _ => Err(()),
        }
    }
}

/// A Jenkins plugin discovered on the pipeline steps index page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    /// Lowercased last path segment of `url`, or `"unknown"`.
    pub id: String,
    pub name: String,
    pub url: String,
}

/// One argument of a pipeline step.
///
/// `param_type` is an open string: the documentation's "Type:" marker carries
/// arbitrary declared types (`String`, `boolean`, `int`, …), `Enum` marks a
/// value list, the four nested-object phrases are kept verbatim, and anything
/// unrecognized becomes `unknown`. For enum parameters `values` holds the
/// permitted values; for nested-object parameters it holds nested field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    #[serde(rename = "instructionType")]
    pub instruction_type: InstructionKind,
    #[serde(rename = "type")]
    pub param_type: String,
    pub values: Vec<String>,
    #[serde(rename = "isOptional")]
    pub is_optional: bool,
}

/// A single invocable pipeline command contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Human-readable heading text of the documentation subsection.
    pub name: String,
    pub description: String,
    #[serde(rename = "instructionType")]
    pub instruction_type: InstructionKind,
    /// Literal token used in pipeline syntax.
    pub command: String,
    /// Id of the contributing plugin; always present in `Corpus::plugins`.
    pub plugin: String,
    pub parameters: Vec<Parameter>,
}

/// A structural block of the declarative pipeline grammar.
///
/// Sections and directives share this shape; only `instruction_type` and the
/// static inner-instruction table differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub description: String,
    #[serde(rename = "instructionType")]
    pub instruction_type: InstructionKind,
    #[serde(rename = "isOptional")]
    pub is_optional: bool,
    /// Free-text Markdown describing permitted placement.
    pub allowed: String,
    pub url: String,
    /// Curated child-instruction names, used to drive snippet insertion.
    #[serde(rename = "innerInstructions")]
    pub inner_instructions: Vec<String>,
}

/// A pipeline environment variable (`env.*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub description: String,
    #[serde(rename = "instructionType")]
    pub instruction_type: InstructionKind,
}

/// The complete aggregated document for one scrape run.
/// Built fully in memory, serialized once; field names are frozen because the
/// consumer indexes by them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    pub date: DateTime<Utc>,
    pub plugins: Vec<Plugin>,
    /// All steps across all plugins, sorted ascending by `command`.
    pub instructions: Vec<Step>,
    pub sections: Vec<Section>,
    pub directives: Vec<Section>,
    #[serde(rename = "environmentVariables")]
    pub environment_variables: Vec<Variable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            InstructionKind::Section,
            InstructionKind::Directive,
            InstructionKind::Step,
            InstructionKind::Parameter,
            InstructionKind::Variable,
        ] {
            assert_eq!(kind.as_str().parse::<InstructionKind>(), Ok(kind));
        }
    }

    #[test]
    fn serde_field_names_are_stable() {
        let param = Parameter {
            name: "script".to_string(),
            description: "".to_string(),
            instruction_type: InstructionKind::Parameter,
            param_type: "String".to_string(),
            values: vec![],
            is_optional: true,
        };
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["instructionType"], "Parameter");
        assert_eq!(json["type"], "String");
        assert_eq!(json["isOptional"], true);

        let section = Section {
            name: "agent".to_string(),
            description: "".to_string(),
            instruction_type: InstructionKind::Section,
            is_optional: false,
            allowed: "".to_string(),
            url: "".to_string(),
            inner_instructions: vec!["label".to_string()],
        };
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["innerInstructions"][0], "label");
    }
}
