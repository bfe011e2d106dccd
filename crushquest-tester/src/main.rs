mod assets;
mod reports;
mod scenarios;
mod tester;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use assets::TesterAssets;
use crushquest_core::{AnswerMatching, EngineConfig};
use scenarios::{all_scenarios, get_scenario, list_scenarios};
use tester::{LogicTester, ScenarioResult};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "crushquest-tester", version = "0.1.0")]
#[command(about = "Automated scenario runner for the CrushQuest compatibility games, feed and profile logic")]
struct Args {
    /// Scenarios to run (comma-separated, `all` runs the whole catalog)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Number of iterations per scenario
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Simulated fetch latency applied while loading campus data
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Compare choice answers case-insensitively
    #[arg(long)]
    relaxed_matching: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let config = engine_config(&args)?;
    let assets = TesterAssets::load(config).await?;
    if args.verbose {
        println!(
            "📦 Loaded {} games and {} posts (latency {:?}, matching {:?})",
            assets.data().games.len(),
            assets.data().confessions.len(),
            assets.latency(),
            assets.config().answer_matching
        );
    }

    let scenarios = expand_scenarios(&args.scenarios);
    let results = run_scenarios(&args, &scenarios, &assets);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn engine_config(args: &Args) -> Result<EngineConfig> {
    let matching = if args.relaxed_matching {
        AnswerMatching::CaseInsensitive
    } else {
        AnswerMatching::Exact
    };
    let config = EngineConfig::default()
        .with_answer_matching(matching)
        .with_fetch_latency_ms(args.latency_ms);
    config.validate().context("invalid --latency-ms")?;
    Ok(config)
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "💘 CrushQuest Automated Tester".bright_cyan().bold());
    println!("{}", "==============================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios: Vec<String> = Vec::new();
    let mut push = |name: String| {
        if !scenarios.contains(&name) {
            scenarios.push(name);
        }
    };
    let requested = split_csv(scenarios_arg);
    let wants_all = requested.iter().any(|s| s.eq_ignore_ascii_case("all"));
    for name in requested {
        if !name.eq_ignore_ascii_case("all") {
            push(name.to_lowercase());
        }
    }
    if wants_all {
        for scenario in all_scenarios() {
            push(scenario.key.to_string());
        }
    }
    scenarios
}

fn run_scenarios(args: &Args, scenarios: &[String], assets: &TesterAssets) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(assets, args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        let Some(scenario) = get_scenario(scenario_name) else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
            continue;
        };
        results.push(logic_tester.run_scenario(scenario, args.iterations));
    }

    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# CrushQuest Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
