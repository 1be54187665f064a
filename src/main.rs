//! linetint - print files with rule-driven decorations
//!
//! Loads the decoration configuration, shows every file given on the command
//! line to the decoration engine, and prints the result with ANSI styling.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::AtomicBool;

use tracing_subscriber::EnvFilter;

use linetint::config::Settings;
use linetint::decor::{Controller, DocumentId, Position, TextDocument};
use linetint::document::MemoryDocument;
use linetint::error::{Result, TintError};
use linetint::render::{caret_line, TerminalView};

/// Command line options
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    root: Option<PathBuf>,
    hover: Option<Position>,
    files: Vec<PathBuf>,
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args)? {
        Some(options) => options,
        None => return Ok(()),
    };

    let settings = Settings::load(options.config.as_deref())?;

    let mut documents = Vec::new();
    for (idx, path) in options.files.iter().enumerate() {
        documents.push(open_document(DocumentId(idx as u64), path)?);
    }

    let root = options.root.or_else(|| env::current_dir().ok());
    let mut controller = Controller::new(TerminalView::new(), Settings::default());
    if let Some(root) = root {
        controller = controller.with_workspace_root(root);
    }

    let visible: Vec<&MemoryDocument> = documents.iter().collect();
    controller.on_configuration_changed(settings, &visible);

    let mut stdout = io::stdout().lock();
    let show_headers = documents.len() > 1;
    for document in &documents {
        if show_headers {
            println!("==> {} <==", document.path().display());
        }

        match options.hover {
            Some(position) => print_hover(&controller, document, position),
            None => controller.host().render_document(document, &mut stdout)?,
        }
    }

    controller.shutdown();
    Ok(())
}

fn open_document(id: DocumentId, path: &Path) -> Result<MemoryDocument> {
    MemoryDocument::from_file(id, path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => TintError::FileNotFound(path.display().to_string()),
        _ => TintError::Io(err),
    })
}

/// Byte offset of a character column, clamped to the end of the line
fn byte_column(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(offset, _)| offset)
}

/// `position` counts characters; decorations are looked up by byte column
fn print_hover(controller: &Controller<TerminalView>, document: &MemoryDocument, position: Position) {
    let column = document
        .line(position.line)
        .map_or(position.column, |text| byte_column(text, position.column));
    let cancel = AtomicBool::new(false);
    let Some(hover) = controller.hover(document.id(), Position::new(position.line, column), &cancel) else {
        println!("{}:{}: no decoration", document.path().display(), position);
        return;
    };

    println!(
        "{}:{}: group {}: {}",
        document.path().display(),
        position,
        hover.group,
        hover.description.as_deref().unwrap_or("(no description)")
    );
    if let Some(text) = document.line(position.line) {
        println!("{}", text);
        if let Some(caret) = caret_line(text, &hover.span, position.line) {
            println!("{}", caret);
        }
    }
}

/// Parse command line arguments; `None` means nothing left to do
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                print_version();
                return Ok(None);
            }
            "--config" | "-c" => options.config = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--root" | "-r" => options.root = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--hover" => options.hover = Some(parse_position(value(&mut iter, arg)?)?),
            other if other.starts_with('-') => {
                return Err(TintError::Message(format!("Unknown option: {}", other)));
            }
            file => options.files.push(PathBuf::from(file)),
        }
    }

    if options.files.is_empty() {
        print_usage();
        return Ok(None);
    }
    Ok(Some(options))
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, option: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| TintError::Message(format!("{} needs a value", option)))
}

/// Parse a 1-based `LINE:COL`, where `COL` counts characters
fn parse_position(text: &str) -> Result<Position> {
    let invalid = || TintError::Message(format!("Invalid position {:?}, expected LINE:COL", text));
    let (line, column) = text.split_once(':').ok_or_else(invalid)?;
    let line: usize = line.trim().parse().map_err(|_| invalid())?;
    let column: usize = column.trim().parse().map_err(|_| invalid())?;
    if line == 0 || column == 0 {
        return Err(invalid());
    }
    Ok(Position::new(line - 1, column - 1))
}

fn print_usage() {
    println!("linetint {} - rule-driven text decoration", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: linetint [OPTIONS] FILE...");
    println!();
    println!("Options:");
    println!("  -c, --config FILE   Configuration file (default ~/.linetint.toml)");
    println!("  -r, --root DIR      Workspace root for relative path rules (default: cwd)");
    println!("      --hover L:C     Describe the decoration at line L, character C (1-based)");
    println!("  -h, --help          Show this help message");
    println!("  -V, --version       Show version information");
    println!();
    println!("Set RUST_LOG=debug to see why rules do or do not apply.");
}

fn print_version() {
    println!("linetint {}", env!("CARGO_PKG_VERSION"));
}
