mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use glpx_abi::{Engine, EngineInfo};
use glpx_core::{Model, ModelError, SolutionKind, SolutionView};
use glpx_solver::{MpsFormat, ReturnCode, SolverConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Solve and convert LP/MPS models with GLPK"
)]
struct Cli {
    /// GLPK shared library to load instead of the default search
    #[arg(long, global = true)]
    glpk_lib: Option<PathBuf>,

    /// Log filter (for example debug or glpx_core=trace); overrides GLPX_TRACE
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a model file, solve it and print the solution
    Solve(SolveArgs),
    /// Rewrite a model file in another format
    Convert(ConvertArgs),
    /// Print the loaded engine version
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Model file
    file: PathBuf,

    /// Input format; auto picks from the file extension
    #[arg(long, value_enum, default_value = "auto")]
    format: InputFormat,

    /// Solver to run (defaults to simplex, or the solver named in --config)
    #[arg(long, value_enum)]
    solver: Option<Solver>,

    /// Solver option override, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    settings: Vec<(String, String)>,

    /// JSON options document, e.g. {"solver": "intopt", "mip_gap": 0.01}
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Also print the simplex tableau of the final basis
    #[arg(long)]
    tableau: bool,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Model file
    file: PathBuf,

    /// Input format; auto picks from the file extension
    #[arg(long, value_enum, default_value = "auto")]
    format: InputFormat,

    /// Target format
    #[arg(long, value_enum)]
    to: TargetFormat,

    /// Output file; stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum InputFormat {
    Auto,
    Lp,
    Mps,
    MpsDeck,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum TargetFormat {
    Lp,
    Mps,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Solver {
    Simplex,
    Exact,
    Interior,
    Intopt,
}

impl Solver {
    fn as_str(self) -> &'static str {
        match self {
            Solver::Simplex => "simplex",
            Solver::Exact => "exact",
            Solver::Interior => "interior",
            Solver::Intopt => "intopt",
        }
    }
}

/// Concrete reader for one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Lp,
    Mps(MpsFormat),
}

#[derive(Debug, Serialize)]
struct SolveReport {
    file: String,
    solver: &'static str,
    return_code: ReturnCode,
    elapsed_ms: f64,
    solution: SolutionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    tableau: Option<Vec<String>>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::enable_logging(cli.log_level.clone())?;
    let engine = load_engine(cli.glpk_lib.as_deref())?;
    match cli.command {
        Command::Solve(args) => solve_command(&engine, args),
        Command::Convert(args) => convert_command(&engine, args),
        Command::Info(args) => info_command(&engine, args),
    }
}

fn load_engine(library: Option<&Path>) -> Result<Engine, Box<dyn std::error::Error>> {
    let engine = Engine::new();
    match library {
        Some(path) => engine.init_from(path)?,
        None => engine.init()?,
    }
    Ok(engine)
}

fn solve_command(engine: &Engine, args: SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let document = match &args.config {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };
    let config = build_config(document.as_deref(), args.solver, &args.settings)?;
    let kind = solution_kind(&config);
    if args.tableau && kind != SolutionKind::Basic {
        return Err(boxed_input_error(
            "--tableau needs a simplex or exact solve",
        ));
    }

    let mut model = read_model(engine, &args.file, args.format)?;
    let start = Instant::now();
    let return_code = model.solve(&config)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1_000.0;
    info!(
        component = "cli",
        operation = "solve",
        status = "success",
        solver = config.name(),
        return_code = return_code.as_str(),
        elapsed_ms,
        "Solve finished"
    );

    let tableau = if args.tableau {
        Some(model.tableau()?)
    } else {
        None
    };

    match args.output {
        OutputFormat::Table => {
            print_solve_header(&args.file, config.name(), return_code, &model);
            println!();
            match report(&model, kind) {
                Ok(text) => println!("{text}"),
                Err(ModelError::StatusUnavailable { status, .. }) => {
                    println!("no solution available (status = {})", status.as_str());
                }
                Err(err) => return Err(err.into()),
            }
            if let Some(text) = tableau {
                println!();
                println!("{text}");
            }
        }
        OutputFormat::Json => {
            let summary = SolveReport {
                file: args.file.display().to_string(),
                solver: config.name(),
                return_code,
                elapsed_ms,
                solution: model.solution_view(kind)?,
                tableau: tableau.map(|text| text.lines().map(str::to_string).collect()),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn convert_command(engine: &Engine, args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut model = read_model(engine, &args.file, args.format)?;
    match (args.to, &args.out) {
        (TargetFormat::Lp, Some(path)) => model.write_lp(path)?,
        (TargetFormat::Mps, Some(path)) => model.write_mps(path, MpsFormat::File)?,
        (TargetFormat::Lp, None) => print!("{}", model.to_lp()?),
        (TargetFormat::Mps, None) => print!("{}", model.to_mps()?),
    }
    Ok(())
}

fn info_command(engine: &Engine, args: InfoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let info = engine.info()?;
    match args.output {
        OutputFormat::Table => print_info_table(&info),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
    }
    Ok(())
}

fn read_model(
    engine: &Engine,
    path: &Path,
    format: InputFormat,
) -> Result<Model, Box<dyn std::error::Error>> {
    let model = match resolve_format(path, format)? {
        FileFormat::Lp => Model::read_lp(engine, path)?,
        FileFormat::Mps(flavour) => Model::read_mps(engine, path, flavour)?,
    };
    Ok(model)
}

fn resolve_format(
    path: &Path,
    format: InputFormat,
) -> Result<FileFormat, Box<dyn std::error::Error>> {
    match format {
        InputFormat::Lp => Ok(FileFormat::Lp),
        InputFormat::Mps => Ok(FileFormat::Mps(MpsFormat::File)),
        InputFormat::MpsDeck => Ok(FileFormat::Mps(MpsFormat::Deck)),
        InputFormat::Auto => {
            let extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase);
            match extension.as_deref() {
                Some("lp") => Ok(FileFormat::Lp),
                Some("mps") | Some("freemps") => Ok(FileFormat::Mps(MpsFormat::File)),
                _ => Err(boxed_input_error(&format!(
                    "cannot infer the format of {}; pass --format",
                    path.display()
                ))),
            }
        }
    }
}

/// Options from the document (if any), then the solver flag, then `--set` overrides.
fn build_config(
    document: Option<&str>,
    solver: Option<Solver>,
    settings: &[(String, String)],
) -> Result<SolverConfig, Box<dyn std::error::Error>> {
    let mut config = match (document, solver) {
        (Some(text), solver) => {
            let config = SolverConfig::from_json(text)?;
            if let Some(solver) = solver {
                if solver.as_str() != config.name() {
                    return Err(boxed_input_error(&format!(
                        "--solver {} conflicts with solver '{}' in the options document",
                        solver.as_str(),
                        config.name()
                    )));
                }
            }
            config
        }
        (None, Some(solver)) => SolverConfig::from_name(solver.as_str())?,
        (None, None) => SolverConfig::default(),
    };
    for (key, value) in settings {
        config.set(key, value)?;
    }
    Ok(config)
}

fn solution_kind(config: &SolverConfig) -> SolutionKind {
    match config {
        SolverConfig::Simplex(_) | SolverConfig::Exact(_) => SolutionKind::Basic,
        SolverConfig::Interior(_) => SolutionKind::Interior,
        SolverConfig::Intopt(_) => SolutionKind::Mip,
    }
}

fn report(model: &Model, kind: SolutionKind) -> Result<String, ModelError> {
    match kind {
        SolutionKind::Basic => model.solution_report(),
        SolutionKind::Interior => model.interior_report(),
        SolutionKind::Mip => model.mip_report(),
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn print_solve_header(file: &Path, solver: &str, return_code: ReturnCode, model: &Model) {
    println!("{:<12} {}", "file", file.display());
    println!("{:<12} {}", "solver", solver);
    println!("{:<12} {}", "return", return_code.as_str());
    println!("{:<12} {}", "rows", model.num_constraints());
    println!("{:<12} {}", "columns", model.num_variables());
}

fn print_info_table(info: &EngineInfo) {
    println!("{:<12} {}", "engine", "GLPK");
    println!("{:<12} {}", "version", info.version);
}

fn boxed_input_error(message: &str) -> Box<dyn std::error::Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message.to_string(),
    ))
}
