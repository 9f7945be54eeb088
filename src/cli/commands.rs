use super::prompt::Picker;
use crate::config::{GeneratorConfig, StaticHeader};
use crate::context::Context;
use crate::document::{load_document, print_issues, LoadOptions};
use crate::error::{DocumentError, GenError};
use crate::generator::generate;
use crate::graph::{abbreviate_id, Graph, NodeKind};
use crate::selection::{list_paths, Collector};
use anyhow::{bail, Context as _};
use clap::Parser;
use regex::Regex;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Generate a federation connector schema from an OpenAPI 3 document
#[derive(Parser, Debug)]
#[command(name = "connector-gen", version, about, long_about = None)]
pub struct Cli {
    /// Path to the OpenAPI document (YAML or JSON)
    #[arg(env = "CONNECTOR_GEN_SOURCE")]
    pub source: PathBuf,

    /// Skip document validation (oas3 check and `$ref` resolution)
    #[arg(long, env = "CONNECTOR_GEN_SKIP_VALIDATION", default_value_t = false)]
    pub skip_validation: bool,

    /// Select every field of every (filtered) operation without prompting
    #[arg(long, default_value_t = false)]
    pub skip_selection: bool,

    /// Print the operation paths and exit
    #[arg(long, default_value_t = false)]
    pub list_paths: bool,

    /// Only consider operations whose URL path matches this regex
    #[arg(long, env = "CONNECTOR_GEN_FILTER")]
    pub filter: Option<String>,

    /// Operations per page in the interactive picker
    #[arg(long)]
    pub page_size: Option<usize>,

    /// JSON file holding an array of selection paths
    #[arg(long, env = "CONNECTOR_GEN_SELECTIONS")]
    pub selections: Option<PathBuf>,

    /// Print the resolved selection paths as JSON instead of generating
    #[arg(long, default_value_t = false)]
    pub print_selections: bool,

    /// Write the schema to this file instead of stdout
    #[arg(short, long, env = "CONNECTOR_GEN_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Name of the `@source` directive
    #[arg(long)]
    pub source_name: Option<String>,

    /// Base URL for `@source`, overriding the document's first server
    #[arg(long)]
    pub base_url: Option<String>,

    /// Static header sent with every request, as "Name: value" (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<StaticHeader>,

    /// Log at debug level
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_header(raw: &str) -> Result<StaticHeader, String> {
    StaticHeader::parse(raw).ok_or_else(|| format!("expected \"Name: value\", got '{raw}'"))
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn generator_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::from_env();
        if let Some(name) = &self.source_name {
            config.source_name = name.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = Some(url.clone());
        }
        if !self.headers.is_empty() {
            config.headers.extend(self.headers.iter().cloned());
        }
        if let Some(size) = self.page_size.filter(|n| *n > 0) {
            config.page_size = size;
        }
        config
    }
}

/// Process exit code for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(gen) = cause.downcast_ref::<GenError>() {
            return gen.exit_code();
        }
        if let Some(doc) = cause.downcast_ref::<DocumentError>() {
            return match doc {
                DocumentError::Io { .. } => 3,
                _ => 2,
            };
        }
    }
    1
}

fn read_selections(path: &Path) -> Result<Vec<String>, GenError> {
    let text = fs::read_to_string(path).map_err(|e| GenError::Selections {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| GenError::Selections {
        path: path.to_path_buf(),
        message: format!("expected a JSON array of strings: {e}"),
    })
}

/// Abbreviated ids of the operations whose URL path matches `filter`.
fn filtered_operations(graph: &Graph, filter: Option<&Regex>) -> Vec<String> {
    graph
        .roots()
        .iter()
        .filter(|r| match (&graph.node(**r).kind, filter) {
            (NodeKind::Operation { path, .. }, Some(re)) => re.is_match(path),
            _ => true,
        })
        .map(|r| abbreviate_id(&graph.node(*r).id()))
        .collect()
}

/// Run the command line against explicit streams.
///
/// `input` feeds the interactive picker; prompts go to stderr.
pub fn run<R: BufRead, W: Write>(cli: &Cli, input: R, mut out: W) -> anyhow::Result<()> {
    let config = cli.generator_config();
    let options = LoadOptions {
        skip_validation: cli.skip_validation,
    };
    let doc = match load_document(&cli.source, &options) {
        Ok(doc) => doc,
        Err(err) => {
            if let DocumentError::Validation { issues } = &err {
                print_issues(issues);
            }
            return Err(GenError::from(err))
                .with_context(|| format!("failed to load {}", cli.source.display()));
        }
    };

    let filter = cli
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --filter expression")?;

    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);

    if cli.list_paths {
        let all = list_paths(&graph);
        let shown = filtered_operations(&graph, filter.as_ref());
        for path in all.iter().filter(|p| shown.contains(p)) {
            writeln!(out, "{path}")?;
        }
        return Ok(());
    }

    let selections = if let Some(path) = &cli.selections {
        read_selections(path)?
    } else {
        let operations = filtered_operations(&graph, filter.as_ref());
        let chosen: Vec<String> = if cli.skip_selection {
            operations
        } else {
            let indices = Picker::new(&operations, config.page_size)
                .run(input, io::stderr())
                .context("operation picker failed")?;
            indices.into_iter().map(|i| operations[i].clone()).collect()
        };
        chosen.into_iter().map(|op| format!("{op}>**")).collect()
    };
    if selections.is_empty() {
        bail!("no operations selected");
    }

    let collection = Collector::new().collect(&mut graph, &mut ctx, &selections)?;

    if cli.print_selections {
        let paths: Vec<&String> = collection.paths.iter().collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&paths)?)?;
        return Ok(());
    }

    let schema = generate(&mut graph, &mut ctx, &collection, &config)?;
    if !ctx.warnings().is_empty() {
        warn!(count = ctx.warnings().len(), "schema generated with substitutions");
    }

    match &cli.output {
        Some(path) => {
            fs::write(path, &schema)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote schema");
        }
        None => out.write_all(schema.as_bytes())?,
    }
    Ok(())
}

/// Run the parsed command line against stdin and stdout.
///
/// # Errors
///
/// Returns an error if:
/// - The document cannot be read, parsed or validated
/// - A selection path does not resolve
/// - The schema cannot be generated or written
pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(cli, stdin.lock(), stdout.lock())
}
