//! jenkins-doc-index: scrape the Jenkins pipeline documentation into a JSON
//! corpus and build the lookup index an editor integration consumes.
//!
//! The scrape side fetches the pipeline syntax book page and the per-plugin
//! step reference pages, normalizes their HTML into tooltip Markdown, and
//! writes one versioned JSON artifact. The consumer side loads that artifact
//! back and answers hover and completion queries against it.

pub mod corpus;
pub mod fetch;
pub mod index;
pub mod markdown;
pub mod model;
pub mod parse;
pub mod site;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

/// Run a full scrape against the live site (or whatever root the options
/// name) and write the artifact to `output`. Returns the built corpus.
pub async fn build_corpus(options: &corpus::BuildOptions, output: &Path) -> Result<model::Corpus> {
    let fetcher: Arc<dyn fetch::PageFetcher> = Arc::new(fetch::HttpFetcher::new());
    let corpus = corpus::build(fetcher, options).await;
    corpus::write_corpus(&corpus, output)?;
    Ok(corpus)
}

/// Load a previously written corpus artifact.
pub fn load_corpus(path: &Path) -> Result<model::Corpus> {
    corpus::load_corpus(path)
}
