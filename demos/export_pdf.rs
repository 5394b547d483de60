//! Export a running page to PDF.
//!
//! Demonstrates:
//! - Building an Exporter (explicit or auto-detected renderer)
//! - Configuring a CaptureJob with margins and paper size
//! - Reading the CaptureReport
//!
//! Usage:
//!   cargo run --example export_pdf -- http://127.0.0.1:3031/?export=1 out.pdf
//!   cargo run --example export_pdf -- http://127.0.0.1:3031/ out.pdf --a4 --debug
//!   cargo run --example export_pdf -- http://127.0.0.1:3031/ out.pdf --binary /usr/bin/chromium

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use headless_pdf::{CaptureJob, Exporter, Margins, PaperSize, Result};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    page_url: String,
    output: String,
    binary: Option<String>,
    a4: bool,
    debug: bool,
}

impl Args {
    /// Parse command-line arguments.
    fn parse() -> Option<Self> {
        let mut positional = Vec::new();
        let mut binary = None;
        let mut a4 = false;
        let mut debug = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--binary" => binary = Some(args.next()?),
                "--a4" => a4 = true,
                "--debug" => debug = true,
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        Some(Self {
            page_url: positional.next()?,
            output: positional.next()?,
            binary,
            a4,
            debug,
        })
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let Some(args) = Args::parse() else {
        eprintln!("usage: export_pdf <page-url> <output.pdf> [--binary PATH] [--a4] [--debug]");
        std::process::exit(2);
    };
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Export PDF ===\n");

    // ========================================================================
    // Create Exporter
    // ========================================================================

    let mut builder = Exporter::builder().settle_delay(Duration::from_secs(1));
    if let Some(binary) = &args.binary {
        builder = builder.binary(binary);
    }
    let exporter = builder.build()?;
    println!("[Setup] Renderer: {}", exporter.settings().binary.display());

    // ========================================================================
    // Export
    // ========================================================================

    let paper = if args.a4 {
        PaperSize::A4
    } else {
        PaperSize::LETTER
    };
    let job = CaptureJob::new(&args.page_url, &args.output)
        .with_margins(Margins::uniform(0.5))
        .with_paper(paper);

    println!("[Export] {} -> {}", args.page_url, args.output);
    let report = exporter.export(job).await?;

    println!(
        "         ✓ {} bytes in {:.1}s",
        report.bytes,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "headless_pdf=debug"
    } else {
        "headless_pdf=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
