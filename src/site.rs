//! Static description of the Jenkins documentation site: the pages the
//! scraper visits and the bundled environment-variable reference.

use crate::model::{InstructionKind, Variable};

pub const DEFAULT_SITE_ROOT: &str = "https://www.jenkins.io";

/// The documentation URLs one scrape run visits. The root can be swapped for
/// a mirror or a fixture server; the paths are fixed.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    /// Base used to resolve relative hrefs from the plugin index.
    pub base: String,
    /// Pipeline syntax book page (sections and directives).
    pub syntax_page: String,
    /// Index of all plugins with pipeline steps.
    pub steps_index: String,
}

impl SiteUrls {
    pub fn from_root(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        SiteUrls {
            base: root.to_string(),
            syntax_page: format!("{root}/doc/book/pipeline/syntax/"),
            steps_index: format!("{root}/doc/pipeline/steps/"),
        }
    }
}

impl Default for SiteUrls {
    fn default() -> Self {
        SiteUrls::from_root(DEFAULT_SITE_ROOT)
    }
}

// Environment variables Jenkins exposes to every Pipeline build, bundled
// verbatim rather than scraped: the env-vars reference page is rendered
// client-side and carries no static markup to parse.
const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    (
        "BUILD_ID",
        "The current build ID, identical to BUILD_NUMBER for builds created in Jenkins versions 1.597+",
    ),
    ("BUILD_NUMBER", "The current build number, such as \"153\""),
    (
        "BUILD_TAG",
        "String of jenkins-${JOB_NAME}-${BUILD_NUMBER}. Convenient to put into a resource file, a jar file, etc for easier identification",
    ),
    (
        "BUILD_URL",
        "The URL where the results of this build can be found (for example http://buildserver/jenkins/job/MyJobName/17/)",
    ),
    (
        "EXECUTOR_NUMBER",
        "The unique number that identifies the current executor (among executors of the same machine) performing this build. This is the number you see in the \"build executor status\", except that the number starts from 0, not 1",
    ),
    (
        "JAVA_HOME",
        "If your job is configured to use a specific JDK, this variable is set to the JAVA_HOME of the specified JDK. When this variable is set, PATH is also updated to include the bin subdirectory of JAVA_HOME",
    ),
    ("JENKINS_URL", "Full URL of Jenkins, such as https://example.com:port/jenkins/ (NOTE: only available if Jenkins URL set in \"System Configuration\")"),
    ("JOB_NAME", "Name of the project of this build, such as \"foo\" or \"foo/bar\""),
    (
        "NODE_NAME",
        "The name of the node the current build is running on. Set to \"master\" for the Jenkins controller",
    ),
    (
        "WORKSPACE",
        "The absolute path of the workspace",
    ),
    (
        "BRANCH_NAME",
        "For a multibranch project, this will be set to the name of the branch being built, for example in case you wish to deploy to production from master but not from feature branches; if corresponding to some kind of change request, the name is generally arbitrary (refer to CHANGE_ID and CHANGE_TARGET)",
    ),
    (
        "CHANGE_ID",
        "For a multibranch project corresponding to some kind of change request, this will be set to the change ID, such as a pull request number, if supported; else unset",
    ),
    (
        "CHANGE_URL",
        "For a multibranch project corresponding to some kind of change request, this will be set to the change URL, if supported; else unset",
    ),
    (
        "CHANGE_TITLE",
        "For a multibranch project corresponding to some kind of change request, this will be set to the title of the change, if supported; else unset",
    ),
    (
        "CHANGE_AUTHOR",
        "For a multibranch project corresponding to some kind of change request, this will be set to the username of the author of the proposed change, if supported; else unset",
    ),
    (
        "CHANGE_AUTHOR_DISPLAY_NAME",
        "For a multibranch project corresponding to some kind of change request, this will be set to the human name of the author, if supported; else unset",
    ),
    (
        "CHANGE_AUTHOR_EMAIL",
        "For a multibranch project corresponding to some kind of change request, this will be set to the email address of the author, if supported; else unset",
    ),
    (
        "CHANGE_TARGET",
        "For a multibranch project corresponding to some kind of change request, this will be set to the target or base branch to which the change could be merged, if supported; else unset",
    ),
    (
        "CHANGE_BRANCH",
        "For a multibranch project corresponding to some kind of change request, this will be set to the name of the actual head on the source control system which may or may not be different from BRANCH_NAME. For example in GitHub or Bitbucket this would have the name of the origin branch whereas BRANCH_NAME would be something like PR-24",
    ),
    (
        "CHANGE_FORK",
        "For a multibranch project corresponding to some kind of change request, this will be set to the fork name, if the change originates from a fork of the target repository and the supported SCM plugin provides it; else unset",
    ),
    (
        "TAG_NAME",
        "For a multibranch project corresponding to some kind of tag, this will be set to the name of the tag being built, if supported; else unset",
    ),
    (
        "TAG_TIMESTAMP",
        "For a multibranch project corresponding to some kind of tag, this will be set to a timestamp of the tag in milliseconds since Unix epoch, if supported; else unset",
    ),
];

/// The bundled environment-variable list as corpus entries.
pub fn environment_variables() -> Vec<Variable> {
    ENVIRONMENT_VARIABLES
        .iter()
        .map(|(name, description)| Variable {
            name: (*name).to_string(),
            description: (*description).to_string(),
            instruction_type: InstructionKind::Variable,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_urls_point_at_jenkins_io() {
        let urls = SiteUrls::default();
        assert_eq!(urls.syntax_page, "https://www.jenkins.io/doc/book/pipeline/syntax/");
        assert_eq!(urls.steps_index, "https://www.jenkins.io/doc/pipeline/steps/");
    }

    #[test]
    fn custom_root_drops_trailing_slash() {
        let urls = SiteUrls::from_root("http://localhost:8080/");
        assert_eq!(urls.base, "http://localhost:8080");
        assert_eq!(urls.syntax_page, "http://localhost:8080/doc/book/pipeline/syntax/");
    }

    #[test]
    fn bundled_variables_are_well_formed() {
        let vars = environment_variables();
        assert!(vars.iter().any(|v| v.name == "BUILD_NUMBER"));
        for var in &vars {
            assert_eq!(var.instruction_type, InstructionKind::Variable);
            assert!(!var.description.is_empty());
        }
    }
}
