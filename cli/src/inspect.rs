//! pdfprobe-inspect - print document info and first-page details

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

#[derive(Parser)]
#[command(name = "pdfprobe-inspect")]
#[command(version)]
#[command(about = "Show metadata, characters, text variants and words of a PDF's first page", long_about = None)]
struct Cli {
    /// PDF file to inspect
    #[arg(value_name = "PDF_FILE")]
    input: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let Some(input) = cli.input else {
        println!("{}", "Usage: pdfprobe-inspect <pdf-file>".yellow());
        process::exit(1);
    };

    let mut out = io::stdout().lock();
    if let Err(e) = pdfprobe::inspect(&input, &mut out) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}
