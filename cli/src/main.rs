//! wordmath CLI
//!
//! Inspect generalized templates and run the derivation beam search on a
//! labeled word-problem dataset.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordmath_core::loader::{load_word_problem, load_word_problems};
use wordmath_core::{
    BeamConfig, BeamSearch, Classifier, DerivationSummary, FeatureExtractor, GoldValidator, Prediction,
    Template, TemplateRecord, TemplateSet, WordProblem,
};

#[derive(Parser)]
#[command(name = "wordmath")]
#[command(about = "Equation templates and derivation search for arithmetic word problems", long_about = None)]
#[command(version)]
struct Cli {
    /// File path of the JSON word problems
    #[arg(short, long, default_value = "data/questions.json")]
    json: PathBuf,

    /// Directory of NLP parses, one question-<index>.json per problem
    #[arg(short, long, default_value = "parses")]
    nlp: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the template extracted from one problem
    Print {
        /// Problem index (`iIndex` in the dataset)
        #[arg(short, long, default_value_t = 2598)]
        index: u32,
    },

    /// Count total and unique templates across the dataset
    Process,

    /// Search one problem against the dataset's unique templates
    Search {
        /// Problem index (`iIndex` in the dataset)
        #[arg(short, long, default_value_t = 2598)]
        index: u32,

        /// Beam configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum derivations kept per round
        #[arg(long)]
        max_total: Option<usize>,

        /// Maximum derivations kept per template per round
        #[arg(long)]
        max_per_template: Option<usize>,
    },
}

#[derive(Serialize)]
struct SearchReport {
    problem: u32,
    question: String,
    gold_template: usize,
    unique_templates: usize,
    rounds: usize,
    derivations: Vec<DerivationSummary>,
    prediction: Option<Prediction>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Print { index } => print_template(&cli.json, &cli.nlp, index),
        Command::Process => process(&cli.json, &cli.nlp),
        Command::Search {
            index,
            config,
            max_total,
            max_per_template,
        } => {
            let mut beam = match config {
                Some(path) => read_config(&path)?,
                None => BeamConfig::default(),
            };
            if let Some(max_total) = max_total {
                beam.max_total = max_total;
            }
            if let Some(max_per_template) = max_per_template {
                beam.max_per_template = max_per_template;
            }
            search(&cli.json, &cli.nlp, index, beam)
        }
    }
}

fn read_config(path: &Path) -> Result<BeamConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
}

fn print_template(json: &Path, nlp: &Path, index: u32) -> Result<()> {
    let problem = load_word_problem(json, nlp, index)
        .with_context(|| format!("loading problem {}", index))?;
    let template = problem
        .extract_template()
        .with_context(|| format!("extracting template of problem {}", index))?;

    let record = TemplateRecord::from(template);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Templates of every problem that generalizes, paired with the problem
fn extract_all(problems: &[WordProblem]) -> Vec<(&WordProblem, Template)> {
    problems
        .iter()
        .filter_map(|problem| match problem.extract_template() {
            Ok(template) => Some((problem, template)),
            Err(e) => {
                warn!(problem = problem.index(), error = %e, "no template");
                None
            }
        })
        .collect()
}

fn process(json: &Path, nlp: &Path) -> Result<()> {
    let problems = load_word_problems(json, nlp).context("loading dataset")?;
    let templates = extract_all(&problems);

    let total = templates.len();
    let unique: TemplateSet = templates.into_iter().map(|(_, template)| template).collect();

    println!("{} total and {} unique templates", total, unique.len());
    Ok(())
}

fn search(json: &Path, nlp: &Path, index: u32, config: BeamConfig) -> Result<()> {
    let problems = load_word_problems(json, nlp).context("loading dataset")?;
    let Some(problem) = problems.iter().find(|p| p.index() == index) else {
        bail!("problem {} is not in the dataset or has no parse", index);
    };

    let mut unique = TemplateSet::new();
    let mut gold_template = None;
    for (source, template) in extract_all(&problems) {
        let position = unique.insert(template);
        if source.index() == index {
            gold_template = Some(position);
        }
    }
    let Some(gold_template) = gold_template else {
        bail!("problem {} has no template", index);
    };

    info!(
        problem = index,
        unique_templates = unique.len(),
        gold_template,
        max_total = config.max_total,
        max_per_template = config.max_per_template,
        "searching"
    );

    let templates = unique.templates();
    let extractor = FeatureExtractor::new(templates, &problems);
    let classifier = Classifier::new(extractor, Default::default());
    let validator = GoldValidator::new(gold_template, problem.gold_solutions());
    let search = BeamSearch::new(config);

    let outcome = search.search_to_completion(
        BeamSearch::initial_beam(problem, templates),
        |d| classifier.score(d),
        |d| validator.is_valid(d),
    );

    let report = SearchReport {
        problem: index,
        question: problem.question().to_string(),
        gold_template,
        unique_templates: unique.len(),
        rounds: outcome.rounds,
        derivations: outcome.derivations.iter().map(|d| d.summary()).collect(),
        prediction: classifier.predict(&search, problem, templates),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
