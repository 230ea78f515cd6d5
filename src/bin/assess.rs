//! Assess CLI - command-line interface for the assessment engine
//!
//! Commands:
//! - voice: score one captured audio callback (window + spectrum)
//! - attention: score one completed tracking run
//! - score: score externally inferred metrics under a modality profile
//! - doctor: print engine configuration and environment checks

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use assess_signals::pipeline::{analyze_attention_json, analyze_voice_json, score_metrics_json};
use assess_signals::{AudioConfig, TrackingConfig, ENGINE_VERSION, PRODUCER_NAME};

/// Assess - signal feature extraction and weighted scoring engine
#[derive(Parser)]
#[command(name = "assess")]
#[command(author = "Brightpath Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score captured assessment signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one captured audio callback (VoiceFrameRequest JSON)
    Voice {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Score one completed tracking run (TrackingRunRequest JSON)
    Attention {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Score externally inferred metrics (ExternalMetricsRequest JSON)
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Print engine configuration and environment checks
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AssessCliError> {
    match cli.command {
        Commands::Voice { input, output } => cmd_json_op(&input, &output, analyze_voice_json),
        Commands::Attention { input, output } => {
            cmd_json_op(&input, &output, analyze_attention_json)
        }
        Commands::Score { input, output } => cmd_json_op(&input, &output, score_metrics_json),
        Commands::Doctor { json } => cmd_doctor(json),
    }
}

fn cmd_json_op(
    input: &Path,
    output: &Path,
    op: fn(&str) -> Result<String, assess_signals::EngineError>,
) -> Result<(), AssessCliError> {
    let request = read_input(input)?;
    let result = op(&request)?;
    write_output(output, &result)
}

fn read_input(input: &Path) -> Result<String, AssessCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading request JSON from stdin (pipe a file or pass --input)...");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), AssessCliError> {
    if output.to_string_lossy() == "-" {
        println!("{data}");
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), AssessCliError> {
    let audio = AudioConfig::default();
    let tracking = TrackingConfig::default();

    if json {
        let report = serde_json::json!({
            "producer": PRODUCER_NAME,
            "version": ENGINE_VERSION,
            "audio_config": audio,
            "tracking_config": tracking,
            "stdin_is_tty": atty::is(atty::Stream::Stdin),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Assess Doctor Report");
        println!("====================");
        println!("Producer: {PRODUCER_NAME}");
        println!("Version:  {ENGINE_VERSION}");
        println!();
        println!("Audio defaults:");
        println!("  sample_rate: {} Hz", audio.sample_rate);
        println!("  fft_size:    {}", audio.fft_size);
        println!("  window_len:  {}", audio.window_len);
        println!();
        println!("Tracking defaults:");
        println!("  normalization_radius:   {}", tracking.normalization_radius);
        println!("  engaged_radius:         {}", tracking.engaged_radius);
        println!("  accuracy_dip_threshold: {}", tracking.accuracy_dip_threshold);
        println!("  response_window_ms:     {}", tracking.response_window_ms);
        println!();
        if atty::is(atty::Stream::Stdin) {
            println!("stdin: TTY (interactive)");
        } else {
            println!("stdin: pipe (streaming ready)");
        }
    }

    Ok(())
}

// Error types

#[derive(Debug)]
enum AssessCliError {
    Io(io::Error),
    Engine(assess_signals::EngineError),
    Json(serde_json::Error),
}

impl From<io::Error> for AssessCliError {
    fn from(e: io::Error) -> Self {
        AssessCliError::Io(e)
    }
}

impl From<assess_signals::EngineError> for AssessCliError {
    fn from(e: assess_signals::EngineError) -> Self {
        AssessCliError::Engine(e)
    }
}

impl From<serde_json::Error> for AssessCliError {
    fn from(e: serde_json::Error) -> Self {
        AssessCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<AssessCliError> for CliError {
    fn from(e: AssessCliError) -> Self {
        match e {
            AssessCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            AssessCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the request shape against the pipeline module docs".to_string()),
            },
            AssessCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
        }
    }
}
