//! pdfprobe-bench - time opening and extracting a PDF

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

#[derive(Parser)]
#[command(name = "pdfprobe-bench")]
#[command(version)]
#[command(about = "Time PDF opening, text, table and object extraction", long_about = None)]
struct Cli {
    /// PDF file to benchmark
    #[arg(value_name = "PDF_FILE")]
    input: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let Some(input) = cli.input else {
        println!("{}", "Usage: pdfprobe-bench <pdf-file>".yellow());
        process::exit(1);
    };

    let mut out = io::stdout().lock();
    match pdfprobe::run_benchmark(&input, &mut out) {
        Ok(report) => log::info!(
            "benchmarked {} pages in {:.3}s",
            report.pages,
            report.total_time().as_secs_f64()
        ),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            process::exit(1);
        }
    }
}
