use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::Value;

use oadoc_core::config::{self, CONFIG_FILE_NAME, OadocConfig, OutputFormat};
use oadoc_core::grammar;
use oadoc_core::parse;

#[derive(Parser)]
#[command(name = "oadoc", about = "OpenAPI 3.x documentation extractor", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the extracted document model of an OpenAPI spec
    Inspect {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long)]
        format: Option<InspectFormat>,
    },

    /// Check an OpenAPI spec against the document grammar
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Initialize a new oadoc configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

impl From<OutputFormat> for InspectFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => InspectFormat::Yaml,
            OutputFormat::Json => InspectFormat::Json,
        }
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oadoc", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load the project config from the current directory, or the defaults.
fn project_config() -> Result<OadocConfig> {
    let config = config::load_config(Path::new(CONFIG_FILE_NAME))?;
    Ok(config.unwrap_or_default())
}

fn read_document(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let data = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(data)
}

fn cmd_inspect(input: Option<PathBuf>, format: Option<InspectFormat>) -> Result<ExitCode> {
    let cfg = project_config()?;
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let data = read_document(&input)?;

    if cfg.strict {
        let report = grammar::validate(&data);
        if !report.is_valid() {
            eprint!("{report}");
            eprintln!(
                "{} has {} violation(s); refusing to extract in strict mode.",
                input.display(),
                report.len()
            );
            return Ok(ExitCode::FAILURE);
        }
    }

    let document = oadoc_core::load_with_options(&data, &cfg.load_options());
    log::debug!(
        "extracted {} link(s) from {}",
        document.links().count(),
        input.display()
    );

    match format.unwrap_or_else(|| cfg.format.into()) {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&document)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&document)?;
            println!("{}", json);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(input: Option<PathBuf>) -> Result<ExitCode> {
    let input = match input {
        Some(input) => input,
        None => PathBuf::from(project_config()?.input),
    };
    let data = read_document(&input)?;
    let report = grammar::validate(&data);

    if !report.is_valid() {
        eprint!("{report}");
        eprintln!("{}: {} violation(s).", input.display(), report.len());
        return Ok(ExitCode::FAILURE);
    }

    let document = oadoc_core::load(&data);
    eprintln!(
        "Valid OpenAPI document: {}",
        document.title.as_deref().unwrap_or("(untitled)")
    );
    if let Some(version) = &document.version {
        eprintln!("  Version: {}", version);
    }
    eprintln!("  Links: {}", document.links().count());
    eprintln!("  Sections: {}", document.sections().count());
    eprintln!("  Schemas: {}", document.definitions.len());
    Ok(ExitCode::SUCCESS)
}

fn cmd_init(force: bool) -> Result<ExitCode> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(ExitCode::SUCCESS)
}
