use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pddlsmith::construction::{ActionConstructor, ConstructionReport, RefinementLoop, RefinementStatus};
use pddlsmith::domain::{DomainDescription, PredicateRegistry, ROOT_TYPE};
use pddlsmith::llm::{AnthropicClient, LlmClient};
use pddlsmith::parser::parse_action;
use pddlsmith::pddl;
use pddlsmith::prompt::{PromptAssembler, PromptLoader};
use pddlsmith::validation::{FeedbackMode, FeedbackSource, HumanFeedback, ModelFeedback, SyntaxValidator, Validator};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pddlsmith")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("pddlsmith.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn prompt_assembler(config: &Config) -> PromptAssembler {
    match &config.prompts.dir {
        Some(dir) => PromptAssembler::new(PromptLoader::new(dir)),
        None => PromptAssembler::default(),
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Build {
            domain,
            output,
            max_iters,
            max_attempts,
            feedback,
            mirror,
        } => {
            let mut config = config.clone();
            if let Some(n) = max_iters {
                config.construction.max_iters = *n;
            }
            if let Some(n) = max_attempts {
                config.construction.max_attempts = *n;
            }
            if let Some(mode) = feedback {
                config.construction.feedback = *mode;
            }
            if *mirror {
                config.construction.mirror_symmetry = true;
            }
            handle_build_command(domain, output.as_deref(), &config).await
        }
        Commands::Parse { file, action } => handle_parse_command(file, action),
        Commands::Validate { file, action, domain } => {
            handle_validate_command(file, action, domain.as_deref(), config)
        }
    }
}

async fn handle_build_command(domain_path: &Path, output: Option<&Path>, config: &Config) -> Result<()> {
    let domain = DomainDescription::from_file(domain_path)
        .context(format!("Failed to load domain from {}", domain_path.display()))?;
    info!(
        "Building '{}': max_iters={}, max_attempts={}, feedback={}",
        domain.name, config.construction.max_iters, config.construction.max_attempts, config.construction.feedback
    );

    let llm: Arc<dyn LlmClient> =
        Arc::new(AnthropicClient::new(config.llm.anthropic()).context("Failed to create LLM client")?);

    let validator = SyntaxValidator::from_domain(&domain)
        .with_unsupported_keywords(config.validation.unsupported_keywords.clone());

    let mut refiner = RefinementLoop::new(llm.clone(), Box::new(validator))
        .with_prompts(prompt_assembler(config))
        .with_config(config.refinement());

    let feedback: Option<Box<dyn FeedbackSource>> = match config.construction.feedback {
        FeedbackMode::None => None,
        FeedbackMode::Model => Some(Box::new(
            ModelFeedback::with_prompts(llm.clone(), prompt_assembler(config)).with_max_tokens(config.llm.max_tokens),
        )),
        FeedbackMode::Human => Some(Box::new(HumanFeedback::stdin())),
    };
    if let Some(source) = feedback {
        refiner = refiner.with_feedback(source);
    }

    println!(
        "{} {} ({} action(s))",
        "Building:".green(),
        domain.name.bold(),
        domain.actions.len()
    );

    let constructor = ActionConstructor::new(refiner, config.construction.max_iters);
    let report = constructor.construct(&domain).await.context("Construction failed")?;

    let text = report.to_pddl(&config.output.requirements);
    match output {
        Some(path) => {
            fs::write(path, &text).context(format!("Failed to write {}", path.display()))?;
            println!("{} {}", "Wrote:".green(), path.display());
        }
        None => println!("{}", text),
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &ConstructionReport) {
    // Summary goes to stderr so stdout stays a clean PDDL file
    for summary in &report.per_action {
        let status = match summary.status {
            RefinementStatus::Validated => "validated".green(),
            RefinementStatus::BestEffort => "best effort".yellow(),
        };
        eprintln!("  {:<24} {} after {} attempt(s)", summary.name, status, summary.attempts);
    }

    let fixpoint = if report.converged {
        "converged".green()
    } else {
        "not converged".yellow()
    };
    eprintln!(
        "{} {} pass(es), {}; {} predicate(s), {} type(s) in {:.1}s",
        "Done:".green(),
        report.iterations,
        fixpoint,
        report.predicates.len(),
        report.types.flatten().len(),
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );
    eprintln!(
        "{} {} input / {} output tokens, ${:.4} ({})",
        "Usage:".cyan(),
        report.usage.input_tokens,
        report.usage.output_tokens,
        report.cost_usd(),
        report.model
    );
}

fn handle_parse_command(file: &Path, action: &str) -> Result<()> {
    let text = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let parsed = parse_action(&text, action).context("Failed to parse model answer")?;

    println!("{}", pddl::render_action(&parsed.action));
    if !parsed.new_predicates.is_empty() {
        println!();
        println!("{}", "New predicates:".cyan());
        for predicate in &parsed.new_predicates {
            println!("  {}", predicate.clean_text);
        }
    }
    Ok(())
}

fn handle_validate_command(file: &Path, action: &str, domain: Option<&Path>, config: &Config) -> Result<()> {
    let text = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;

    let parsed = parse_action(&text, action).ok();

    let validator = match domain {
        Some(path) => {
            let domain = DomainDescription::from_file(path)
                .context(format!("Failed to load domain from {}", path.display()))?;
            SyntaxValidator::from_domain(&domain)
        }
        None => {
            // Without a domain, trust whatever types the answer itself declares
            let mut types = vec![ROOT_TYPE.to_string()];
            if let Some(parsed) = &parsed {
                types.extend(parsed.action.parameters.values().cloned());
                for predicate in &parsed.new_predicates {
                    types.extend(predicate.params.values().cloned());
                }
            }
            SyntaxValidator::new(types, vec![action.to_string()])
        }
    }
    .with_unsupported_keywords(config.validation.unsupported_keywords.clone());

    let new_predicates = parsed.map(|parsed| parsed.new_predicates).unwrap_or_default();
    let verdict = validator.validate(&text, &PredicateRegistry::new(), &new_predicates);

    if verdict.ok {
        println!("{} {}", "Valid:".green(), action);
        return Ok(());
    }

    let kind = verdict.kind.map(|k| k.to_string()).unwrap_or_default();
    println!("{} {} [{}]", "Invalid:".red(), action, kind);
    println!("{}", verdict.message);
    eyre::bail!("validation failed for '{}'", action)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = if cli.is_verbose() {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    setup_logging(level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
