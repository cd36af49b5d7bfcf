use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;

use jenkins_doc_index::corpus::BuildOptions;
use jenkins_doc_index::index::{self, DocIndex};
use jenkins_doc_index::model::InstructionKind;
use jenkins_doc_index::site::SiteUrls;

#[derive(Parser, Debug)]
#[command(
    name = "jenkins-doc-index",
    version,
    about = "Scrape and query the Jenkins pipeline documentation",
    long_about = "Scrapes the Jenkins pipeline documentation into a JSON corpus \
        (steps, parameters, sections, directives, environment variables) and \
        answers hover/completion queries against it.\n\n\
        Examples:\n  \
        jenkins-doc-index build --output jenkins-data.json\n  \
        jenkins-doc-index show sh\n  \
        jenkins-doc-index list --kind directive\n  \
        jenkins-doc-index snippet post"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Step,
    Section,
    Directive,
    Variable,
}

impl From<Kind> for InstructionKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Step => InstructionKind::Step,
            Kind::Section => InstructionKind::Section,
            Kind::Directive => InstructionKind::Directive,
            Kind::Variable => InstructionKind::Variable,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the documentation site and write the corpus artifact
    Build {
        #[arg(long, short, default_value = "jenkins-data.json", help = "Output path")]
        output: PathBuf,

        #[arg(long, default_value = "0", help = "Delay between plugin-page fetches, in ms")]
        delay_ms: u64,

        #[arg(long, default_value = "4", help = "Maximum overlapping plugin-page fetches")]
        concurrency: usize,

        #[arg(long, help = "Alternate site root (mirror or fixture server)")]
        site_root: Option<String>,
    },

    /// Print the hover Markdown for a step command or a section/directive/variable name
    Show {
        /// Step command or section/directive/variable name
        name: String,

        #[arg(long, short, default_value = "jenkins-data.json", help = "Corpus path")]
        input: PathBuf,
    },

    /// List known keys
    List {
        #[arg(long, short, help = "Limit to one instruction kind")]
        kind: Option<Kind>,

        #[arg(long, short, default_value = "jenkins-data.json", help = "Corpus path")]
        input: PathBuf,
    },

    /// Print the completion insert-text for an entry
    Snippet {
        /// Step command or section/directive/variable name
        name: String,

        #[arg(long, short, default_value = "jenkins-data.json", help = "Corpus path")]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format!("Error: {e:#}").red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Build {
            output,
            delay_ms,
            concurrency,
            site_root,
        } => {
            let options = BuildOptions {
                site: site_root
                    .as_deref()
                    .map(SiteUrls::from_root)
                    .unwrap_or_default(),
                delay: Duration::from_millis(delay_ms),
                concurrency,
            };
            jenkins_doc_index::build_corpus(&options, &output).await?;
            println!("Extracted in: {}", output.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::Show { name, input } => {
            let corpus = jenkins_doc_index::load_corpus(&input)?;
            let index = DocIndex::build(&corpus);
            match index.get(&name) {
                Some(entry) => {
                    println!("{}", index::hover_markdown(entry));
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("Unknown instruction: {name}");
                    Ok(ExitCode::from(1))
                }
            }
        }

        Command::List { kind, input } => {
            let corpus = jenkins_doc_index::load_corpus(&input)?;
            let index = DocIndex::build(&corpus);
            let keys = match kind {
                Some(kind) => index.keys_of_kind(kind.into()),
                None => index.keys(),
            };
            for key in keys {
                println!("{key}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Snippet { name, input } => {
            let corpus = jenkins_doc_index::load_corpus(&input)?;
            let index = DocIndex::build(&corpus);
            match index.get(&name) {
                Some(entry) => {
                    println!("{}", index::insert_text(entry));
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("Unknown instruction: {name}");
                    Ok(ExitCode::from(1))
                }
            }
        }
    }
}
