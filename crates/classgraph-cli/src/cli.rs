//! Command-line interface for the classgraph utility
//!
//! Provides a CLI to turn JSON declaration trees into PlantUML class diagrams.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

use classgraph::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use classgraph::{DeclarationTree, DiagramConfig, Generator};

/// Classgraph - Generate PlantUML class diagrams from declaration trees
#[derive(Parser)]
#[command(name = "classgraph")]
#[command(about = "A Rust utility to generate PlantUML class diagrams from declaration trees")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error|off)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a PlantUML class diagram
    Generate {
        /// JSON declaration tree (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON diagram configuration; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for the diagram (use - for stdout)
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Directory receiving the configured output file name
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Check declarations for structural problems
    Validate {
        /// JSON declaration tree (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Report in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as JSON
    Config,
}

/// Main CLI application
#[derive(Default)]
pub struct ClassgraphApp;

impl ClassgraphApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));
        let log_format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level.as_deref(), log_format.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Classgraph v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Generate {
                input,
                config,
                output,
                output_dir,
            } => self.generate_command(input, config, output, output_dir, cli.verbose),
            Commands::Validate { input, json } => self.validate_command(input, json, cli.verbose),
            Commands::Config => self.config_command(),
        }
    }

    /// Handle the generate command
    fn generate_command(
        &self,
        input: Option<PathBuf>,
        config: Option<PathBuf>,
        output: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let config = match config {
            Some(path) => DiagramConfig::from_path(&path)
                .map_err(|e| e.context(format!("Failed to load config '{}'", path.display())))?,
            None => DiagramConfig::default(),
        };
        let tree = DeclarationTree::from_json_str(&content)?;
        let generator = Generator::new(config);

        if let Some(dir) = output_dir {
            let path = generator.generate_to_dir(&tree, &dir)?;
            if verbose {
                eprintln!("Wrote {}", path.display());
            }
            return Ok(());
        }

        let diagram = generator.generate(&tree)?;
        if verbose {
            eprintln!("Generated {} bytes of PlantUML", diagram.len());
        }
        self.write_output(output, &diagram)
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let tree = DeclarationTree::from_json_str(&content)?;
        let problems: Vec<String> = tree
            .invalid_declarations()
            .iter()
            .map(ToString::to_string)
            .collect();
        debug!(invalid = problems.len(), "Validation finished");

        if json {
            let report = serde_json::json!({
                "valid": problems.is_empty(),
                "problems": problems,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if problems.is_empty() {
            println!("✓ All declarations are valid");
        } else {
            for problem in &problems {
                println!("✗ {}", problem);
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("{} invalid declaration(s)", problems.len()))
        }
    }

    /// Handle the config command
    fn config_command(&self) -> Result<()> {
        println!("{}", DiagramConfig::default().to_json_pretty()?);
        Ok(())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                classgraph::write_output(&path, content).map_err(|e| {
                    e.context(format!("Failed to write output file '{}'", path.display()))
                })
            }
            _ => {
                print!("{}", content);
                io::stdout().flush()?;
                Ok(())
            }
        }
    }
}
