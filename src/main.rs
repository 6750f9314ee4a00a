//! Scout: scripted-exploration test sessions for game levels.
//!
//! Provides subcommands:
//!
//! - `run`       -- Drive the simulated actor through a scenario and write the report
//! - `replay`    -- Feed recorded observations (JSON lines) through the orchestrator
//! - `scenarios` -- List the scenarios available in the scenario directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scout::actor::SimulatedActor;
use scout::config::ScoutConfig;
use scout::policy::{AnyPolicy, LlmPolicy, SweepPolicy};
use scout::report::{LlmNarrator, NarrativeGenerator};
use scout::runner::ProbeRunner;
use scout::scenario::{DirectoryLoader, ScenarioDefinition, ScenarioLoader};
use scout::session::Orchestrator;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Scout: scripted-exploration test sessions for game levels
#[derive(Parser)]
#[command(name = "scout", version, about)]
struct Cli {
    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of scenario definitions (overrides the config file).
    #[arg(long, global = true)]
    scenarios: Option<PathBuf>,

    /// Which decision policy steers the actor.
    #[arg(long, global = true, value_enum, default_value = "sweep")]
    policy: PolicyChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum PolicyChoice {
    Sweep,
    Llm,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the simulated actor through a scenario.
    Run {
        /// Scenario name (uses the built-in default if not provided).
        #[arg(long)]
        test: Option<String>,

        /// Seed for the simulated level layout and sensor jitter.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Side length of the simulated square level.
        #[arg(long, default_value_t = 20.0)]
        level_size: f64,

        /// Number of goal markers in the simulated level.
        #[arg(long, default_value_t = 4)]
        goals: usize,

        /// Path to write the Markdown report.
        #[arg(long, default_value = "reports/report.md")]
        output: PathBuf,

        /// Optional path to also write the report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Feed a JSON-lines file of observation payloads through `step`.
    Replay {
        /// File with one observation payload per line.
        #[arg(long)]
        input: PathBuf,

        /// Scenario name (uses the built-in default if not provided).
        #[arg(long)]
        test: Option<String>,
    },

    /// List available scenarios.
    Scenarios,
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScoutConfig::load_from_file(path)?,
        None => ScoutConfig::default(),
    };
    if let Some(dir) = &cli.scenarios {
        config.scenarios_dir = dir.clone();
    }

    // Fill in the API key from the environment when not set in the config file.
    if config.model.api_key.is_empty() {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.model.api_key = key;
        }
    }

    let loader = DirectoryLoader::new(&config.scenarios_dir);
    if let Commands::Scenarios = cli.command {
        return cmd_scenarios(&loader);
    }

    let policy = create_policy(&cli.policy, &config)?;
    let orchestrator = Orchestrator::new(policy, loader, &config);

    if config.narrative.enabled {
        let narrator = LlmNarrator::new(&config.model)?;
        dispatch(orchestrator.with_narrator(narrator), cli.command).await
    } else {
        dispatch(orchestrator, cli.command).await
    }
}

async fn dispatch<N: NarrativeGenerator>(
    orchestrator: Orchestrator<AnyPolicy, N>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Run {
            test,
            seed,
            level_size,
            goals,
            output,
            json,
        } => {
            let actor = SimulatedActor::new(seed, level_size / 2.0, goals);
            cmd_run(&orchestrator, actor, test.as_deref(), &output, json.as_deref()).await
        }
        Commands::Replay { input, test } => cmd_replay(&orchestrator, &input, test.as_deref()).await,
        Commands::Scenarios => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run<N: NarrativeGenerator>(
    orchestrator: &Orchestrator<AnyPolicy, N>,
    mut actor: SimulatedActor,
    test: Option<&str>,
    output: &Path,
    json: Option<&Path>,
) -> Result<()> {
    let started = orchestrator
        .start_named(test)
        .await
        .context("failed to start scenario")?;
    tracing::info!(scenario = %started.active_test, "Running probe against simulated actor");

    let report = ProbeRunner::default().run(&mut actor, orchestrator).await?;

    write_file(output, &report.to_markdown())?;
    if let Some(path) = json {
        write_file(path, &serde_json::to_string_pretty(&report)?)?;
    }

    println!(
        "{}: {} after {} steps ({})",
        report.scenario_name,
        report.status.as_str(),
        report.steps_taken,
        report.done_reason.map_or("running", |r| r.as_str()),
    );
    println!("Report written to {}", output.display());
    Ok(())
}

async fn cmd_replay<N: NarrativeGenerator>(
    orchestrator: &Orchestrator<AnyPolicy, N>,
    input: &Path,
    test: Option<&str>,
) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    orchestrator
        .start_named(test)
        .await
        .context("failed to start scenario")?;

    let mut fed = 0usize;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let response = orchestrator.step(line).await;
        println!("{}", serde_json::to_string(&response)?);
        fed += 1;
    }
    tracing::info!(observations = fed, "Replay finished");

    println!();
    print!("{}", orchestrator.report().await.to_markdown());
    Ok(())
}

fn cmd_scenarios(loader: &DirectoryLoader) -> Result<()> {
    let names = loader
        .list()
        .with_context(|| format!("Failed to list scenarios in {}", loader.dir().display()))?;

    println!("Scenarios in {}:", loader.dir().display());
    println!("  {} (built-in default)", ScenarioDefinition::DEFAULT_NAME);
    for name in &names {
        match loader.load(name) {
            Ok(scenario) => println!(
                "  {name}: {} objective(s), {} steps -- {}",
                scenario.objectives.len(),
                scenario.max_steps,
                scenario.description
            ),
            Err(e) => println!("  {name}: unreadable ({e})"),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn create_policy(choice: &PolicyChoice, config: &ScoutConfig) -> Result<AnyPolicy> {
    match choice {
        PolicyChoice::Sweep => {
            tracing::info!("Using rule-based sweep policy");
            Ok(AnyPolicy::Sweep(SweepPolicy::default()))
        }
        PolicyChoice::Llm => {
            tracing::info!(model = %config.model.model_id, "Using LLM decision policy");
            Ok(AnyPolicy::Llm(LlmPolicy::new(&config.model, &config.policy)?))
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
