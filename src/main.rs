use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use transview::app::controller::RenderedView;
use transview::app::state::ModeEvent;
use transview::config::{ConfigError, ExportConfig};
use transview::domain::transition::batch_from_json;
use transview::export::{DirectorySink, ExportError};
use transview::{NoticeLevel, Occupation, ResultsController, ResultsProps, State};

#[derive(Parser, Debug)]
#[command(name = "transview", version, about = "Show occupational transitions as a matrix or a treemap")]
struct Cli {
    #[arg(long, help = "JSON array of transition records")]
    transitions: PathBuf,
    #[arg(long, help = "Occupation code the transitions start from")]
    occupation: Option<String>,
    #[arg(long, help = "Occupation title shown in the matrix header")]
    occupation_title: Option<String>,
    #[arg(long, help = "State abbreviation the transitions were computed for")]
    state: Option<String>,
    #[arg(long, value_enum, default_value_t = Mode::Matrix)]
    mode: Mode,
    #[arg(long, help = "Export the treemap as a PDF after rendering")]
    export: bool,
    #[arg(long, help = "Directory the PDF is written to")]
    out_dir: Option<PathBuf>,
    #[arg(long, help = "JSON export config")]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Matrix,
    Treemap,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read transitions {path}: {source}")]
    ReadTransitions { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse transitions {path}: {source}")]
    ParseTransitions { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("transview=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "transview failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };
    if let Some(dir) = cli.out_dir {
        config.output_dir = Some(dir);
    }
    // System fonts are needed only to rasterize text during export
    config.load_system_fonts &= cli.export;

    let text = fs::read_to_string(&cli.transitions).map_err(|source| CliError::ReadTransitions {
        path: cli.transitions.clone(),
        source,
    })?;
    let transitions = batch_from_json(&text).map_err(|source| CliError::ParseTransitions {
        path: cli.transitions.clone(),
        source,
    })?;
    tracing::info!(records = transitions.len(), "loaded transitions");

    let sink = match &config.output_dir {
        Some(dir) => DirectorySink::new(dir),
        None => DirectorySink::user_default(),
    };

    let mut controller = ResultsController::with_defaults(config)?;
    controller.set_props(ResultsProps {
        selected_occupation: cli.occupation.map(|code| {
            let title = cli.occupation_title.unwrap_or_else(|| code.clone());
            Occupation::new(code, title)
        }),
        selected_state: cli.state.map(|abbr| State::new(abbr.clone(), abbr)),
        loading: false,
        transitions,
        error: None,
    });

    if cli.mode == Mode::Treemap {
        controller.handle_event(ModeEvent::TreemapRequested);
    }

    match controller.render() {
        RenderedView::Matrix(table) => print!("{table}"),
        RenderedView::Treemap { graphic_id } => println!("treemap rendered as #{graphic_id}"),
        RenderedView::Error(message) => println!("error: {message}"),
        RenderedView::Spinner => println!("loading..."),
        RenderedView::Nothing => println!("nothing to show"),
    }

    let exported = if cli.export {
        controller.export(&sink).map(|_| ())
    } else {
        Ok(())
    };

    for notice in controller.take_notices() {
        match notice.level {
            NoticeLevel::Info => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}", notice.message),
        }
    }

    exported.map_err(CliError::from)
}
