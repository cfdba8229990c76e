// stepviz: step-by-step trace viewer for teaching snippets

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use stepviz::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS};
use stepviz::ui::App;
use stepviz::{collect_input_lines, Language, TraceConfig, Tracer};

/// Trace a Python, Java or C++ teaching snippet step by step
#[derive(Debug, Parser)]
#[command(name = "stepviz", version, about)]
struct Cli {
    /// Source file to trace
    file: PathBuf,

    /// Language of the snippet (python, java, cpp); defaults from the extension
    #[arg(short, long)]
    lang: Option<Language>,

    /// File whose lines are the program's input
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// One program input line; may be repeated, read after --input
    #[arg(long = "stdin-line", value_name = "TEXT")]
    stdin_lines: Vec<String>,

    /// Print the trace as JSON instead of opening the viewer
    #[arg(long)]
    json: bool,

    /// Abort the trace after this many steps
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Maximum nesting of simulated calls
    #[arg(long = "max-depth", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("cannot read {}", cli.file.display()))?;
    let language = resolve_language(&cli.file, cli.lang)?;

    let input_text = match &cli.input {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("cannot read input file {}", path.display()))?,
        ),
        None => None,
    };
    let input = collect_input_lines(input_text.as_deref(), &cli.stdin_lines);

    let tracer = Tracer::new(TraceConfig {
        max_steps: cli.max_steps,
        max_call_depth: cli.max_depth,
    });
    let steps = tracer.trace(&source, language, &input);

    if cli.json {
        let json = serde_json::to_string_pretty(&steps).context("cannot serialize trace")?;
        println!("{json}");
        return Ok(());
    }

    run_viewer(App::new(steps, source, language))
}

fn resolve_language(file: &Path, explicit: Option<Language>) -> Result<Language> {
    if let Some(language) = explicit {
        return Ok(language);
    }
    let extension = file.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match Language::from_extension(extension) {
        Some(language) => Ok(language),
        None => bail!(
            "cannot tell the language of {} (use --lang python|java|cpp)",
            file.display()
        ),
    }
}

fn run_viewer(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("viewer failed")
}
