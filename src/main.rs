use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, ValueEnum};
use log::info;

use midiscript::{parse_with_config, ParsedModel, ParserConfig, ScriptError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Yaml,
    Json,
    Summary,
}

/// Parse a MidiScript file into timed tracks of notes and events
#[derive(Debug, ClapParser)]
#[command(name = "midiscript", version, about)]
struct Cli {
    /// MidiScript source file
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
    format: Format,

    /// YAML parser configuration (tempo, time-signature, default-velocity, ...)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on the first token that cannot be parsed
    #[arg(long)]
    strict: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn render(model: &ParsedModel, format: Format) -> Result<String, ScriptError> {
    match format {
        Format::Yaml => model.to_yaml(),
        Format::Json => model.to_json(),
        Format::Summary => Ok(model.summary()),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading config '{}': {}", path.display(), e);
                    process::exit(1);
                }
            };
            match ParserConfig::from_yaml(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            }
        }
        None => ParserConfig::default(),
    };
    if cli.strict {
        config.strict = true;
    }

    let source = match fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    info!("parsing {}", cli.input.display());
    let model = match parse_with_config(&source, &config) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let rendered = match render(&model, cli.format) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &rendered) {
                eprintln!("Error writing to '{}': {}", path.display(), e);
                process::exit(1);
            }
            eprintln!("Wrote {} track(s) to {}", model.tracks.len(), path.display());
        }
        None if rendered.ends_with('\n') => print!("{}", rendered),
        None => println!("{}", rendered),
    }
}
