//! Corpus building: fetch the documentation pages, parse them, aggregate
//! everything into one `Corpus`, and persist it as the JSON artifact the
//! editor integration consumes.
//!
//! Every per-page failure is caught where it occurs and degrades that slice
//! to empty; only the final artifact write is a hard error.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use owo_colors::OwoColorize;
use tokio::sync::{mpsc, Semaphore};
use tracing::warn;

use crate::fetch::PageFetcher;
use crate::model::{Corpus, Plugin, Section, Step};
use crate::parse::{steps, syntax};
use crate::site::{self, SiteUrls};

/// Knobs for one scrape run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub site: SiteUrls,
    /// Fixed delay between successive plugin-page fetch issuances.
    pub delay: Duration,
    /// Maximum overlapping plugin-page fetches.
    pub concurrency: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            site: SiteUrls::default(),
            delay: Duration::ZERO,
            concurrency: 4,
        }
    }
}

/// Run the whole scrape: sections, directives, plugin index, per-plugin
/// fan-out, aggregation. Returns the assembled corpus; the caller decides
/// where it goes.
pub async fn build(fetcher: Arc<dyn PageFetcher>, options: &BuildOptions) -> Corpus {
    // One timestamp per run, taken before any fetch
    let date = Utc::now();
    let urls = &options.site;

    let sections = fetch_syntax_slice(fetcher.as_ref(), urls, "Sections", syntax::parse_sections).await;
    let directives =
        fetch_syntax_slice(fetcher.as_ref(), urls, "Directives", syntax::parse_directives).await;

    let plugins = fetch_plugins(fetcher.as_ref(), urls).await;
    let instructions = fetch_all_steps(&fetcher, &plugins, options).await;

    let environment_variables = site::environment_variables();
    report_count("Environment variables", environment_variables.len());

    Corpus {
        date,
        plugins,
        instructions,
        sections,
        directives,
        environment_variables,
    }
}

/// One pass over the syntax book page. A fetch failure degrades to an empty
/// list; the other slices are unaffected.
async fn fetch_syntax_slice(
    fetcher: &dyn PageFetcher,
    urls: &SiteUrls,
    what: &str,
    parse: fn(&str, &str) -> Vec<Section>,
) -> Vec<Section> {
    println!("Fetching {what} list: {}", urls.syntax_page);
    match fetcher.fetch_html(&urls.syntax_page).await {
        Ok(html) => {
            let entries = parse(&html, &urls.syntax_page);
            report_count(what, entries.len());
            entries
        }
        Err(error) => {
            eprintln!("{}", format!("Error while fetching {what}:\n  {error:#}").red());
            Vec::new()
        }
    }
}

async fn fetch_plugins(fetcher: &dyn PageFetcher, urls: &SiteUrls) -> Vec<Plugin> {
    println!("Fetching plugin index: {}", urls.steps_index);
    match fetcher.fetch_html(&urls.steps_index).await {
        Ok(html) => {
            let plugins = steps::parse_plugins(&html, &urls.base);
            report_count("Plugins", plugins.len());
            plugins
        }
        Err(error) => {
            eprintln!("{}", format!("Error while fetching plugin index:\n  {error:#}").red());
            Vec::new()
        }
    }
}

/// Fan out one fetch per plugin with bounded overlap, then flatten and sort
/// by command. Completion order never affects the result. A failed fetch
/// logs the plugin's display name and contributes zero steps; the plugin
/// itself stays in the corpus.
async fn fetch_all_steps(
    fetcher: &Arc<dyn PageFetcher>,
    plugins: &[Plugin],
    options: &BuildOptions,
) -> Vec<Step> {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let (tx, mut rx) = mpsc::channel::<Vec<Step>>(options.concurrency.max(1) * 2);

    for plugin in plugins {
        let fetcher = Arc::clone(fetcher);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();
        let plugin = plugin.clone();

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            let batch = match fetcher.fetch_html(&plugin.url).await {
                Ok(html) => steps::parse_steps(&html, &plugin.id),
                Err(error) => {
                    warn!(plugin = %plugin.name, "plugin page fetch failed: {error:#}");
                    eprintln!(
                        "{}",
                        format!("Error while fetching steps for {}:\n  {error:#}", plugin.name)
                            .red()
                    );
                    Vec::new()
                }
            };
            let _ = tx.send(batch).await;
        });

        if !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    // Close our sender so rx finishes once every task has reported
    drop(tx);

    let mut instructions = Vec::new();
    while let Some(batch) = rx.recv().await {
        instructions.extend(batch);
    }
    instructions.sort_by(|a, b| a.command.cmp(&b.command));
    report_count("Steps", instructions.len());
    instructions
}

fn report_count(what: &str, count: usize) {
    let line = format!("{count} {what} found");
    if count > 0 {
        println!("  => {}", line.green());
    } else {
        println!("  => {}", line.red());
    }
}

/// Serialize the corpus as pretty JSON and overwrite `path` with it. This is
/// the run's only hard failure point.
pub fn write_corpus(corpus: &Corpus, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(corpus).context("serializing corpus")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Load a previously written corpus artifact.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let corpus = serde_json::from_str(&json).context("parsing corpus JSON")?;
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;

    const SYNTAX_PAGE: &str = include_str!("../tests/fixtures/syntax_page.html");
    const PLUGIN_INDEX: &str = include_str!("../tests/fixtures/plugin_index.html");
    const PLUGIN_PAGE: &str = include_str!("../tests/fixtures/plugin_page.html");
    const BASIC_STEPS_PAGE: &str = r##"
        <div class="sect2">
        <h3 id="echo"><code>echo</code>: Print Message</h3>
        <div class="paragraph"><p>Prints a message to the log.</p></div>
        <ul>
        <li>
        <code>message</code>
        <div><p>The message to print.</p></div>
        <ul><li><b>Type:</b> <code>String</code></li></ul>
        </li>
        </ul>
        </div>
    "##;

    /// Fetcher serving canned pages; unknown URLs fail like a dead server.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
    }

    impl FixtureFetcher {
        fn full_site() -> Self {
            let mut pages = HashMap::new();
            pages.insert(
                "https://www.jenkins.io/doc/book/pipeline/syntax/".to_string(),
                SYNTAX_PAGE.to_string(),
            );
            pages.insert(
                "https://www.jenkins.io/doc/pipeline/steps/".to_string(),
                PLUGIN_INDEX.to_string(),
            );
            pages.insert(
                "https://www.jenkins.io/doc/pipeline/steps/workflow-durable-task-step/".to_string(),
                PLUGIN_PAGE.to_string(),
            );
            pages.insert(
                "https://www.jenkins.io/doc/pipeline/steps/workflow-basic-steps/".to_string(),
                BASIC_STEPS_PAGE.to_string(),
            );
            FixtureFetcher { pages }
        }
    }

    #[async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch_html(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("Failed to fetch {url}: HTTP 404"))
        }
    }

    fn options() -> BuildOptions {
        BuildOptions::default()
    }

    #[tokio::test]
    async fn full_run_aggregates_and_sorts() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(FixtureFetcher::full_site());
        let corpus = build(fetcher, &options()).await;

        let commands: Vec<&str> = corpus.instructions.iter().map(|s| s.command.as_str()).collect();
        assert_eq!(commands, vec!["checkout", "echo", "sh"]);

        // Every step's plugin id is a known plugin
        for step in &corpus.instructions {
            assert!(corpus.plugins.iter().any(|p| p.id == step.plugin));
        }

        assert_eq!(corpus.plugins.len(), 2);
        assert_eq!(corpus.sections.len(), 3);
        assert_eq!(corpus.directives.len(), 3);
        assert!(!corpus.environment_variables.is_empty());
    }

    #[tokio::test]
    async fn failed_plugin_page_keeps_the_plugin_with_zero_steps() {
        let mut fetcher = FixtureFetcher::full_site();
        fetcher
            .pages
            .remove("https://www.jenkins.io/doc/pipeline/steps/workflow-basic-steps/");
        let fetcher: Arc<dyn PageFetcher> = Arc::new(fetcher);
        let corpus = build(fetcher, &options()).await;

        assert!(corpus.plugins.iter().any(|p| p.id == "workflow-basic-steps"));
        assert!(corpus
            .instructions
            .iter()
            .all(|s| s.plugin != "workflow-basic-steps"));
        // The other plugin's steps still arrive
        assert!(corpus.instructions.iter().any(|s| s.command == "sh"));
    }

    #[tokio::test]
    async fn failed_syntax_page_degrades_to_empty_slices() {
        let mut fetcher = FixtureFetcher::full_site();
        fetcher.pages.remove("https://www.jenkins.io/doc/book/pipeline/syntax/");
        let fetcher: Arc<dyn PageFetcher> = Arc::new(fetcher);
        let corpus = build(fetcher, &options()).await;

        assert!(corpus.sections.is_empty());
        assert!(corpus.directives.is_empty());
        // Steps are unaffected
        assert!(!corpus.instructions.is_empty());
    }

    #[tokio::test]
    async fn rebuild_differs_only_in_date() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(FixtureFetcher::full_site());
        let mut first = build(Arc::clone(&fetcher), &options()).await;
        let mut second = build(fetcher, &options()).await;

        first.date = second.date;
        let first_json = serde_json::to_string_pretty(&first).unwrap();
        let second_json = serde_json::to_string_pretty(&second).unwrap();
        assert_eq!(first_json, second_json);

        // Swap back: untouched dates are the only difference
        second.date = Utc::now();
        assert_eq!(first.plugins, second.plugins);
        assert_eq!(first.instructions, second.instructions);
    }

    #[tokio::test]
    async fn corpus_round_trips_through_the_artifact() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(FixtureFetcher::full_site());
        let corpus = build(fetcher, &options()).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jenkins-data.json");
        write_corpus(&corpus, &path).unwrap();

        let loaded = load_corpus(&path).unwrap();
        assert_eq!(loaded.date, corpus.date);
        assert_eq!(loaded.instructions, corpus.instructions);
        assert_eq!(loaded.sections, corpus.sections);

        // Field names in the artifact stay what the consumer expects
        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("environmentVariables").is_some());
        assert!(raw["instructions"][0].get("instructionType").is_some());
    }

    #[tokio::test]
    async fn write_failure_surfaces_as_error() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(FixtureFetcher::full_site());
        let corpus = build(fetcher, &options()).await;
        let result = write_corpus(&corpus, Path::new("/nonexistent-dir/out.json"));
        assert!(result.is_err());
    }
}
