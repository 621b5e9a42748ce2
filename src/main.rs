/*!
 * Command-line interface for dir-to-md
 */

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, LevelFilter};
use rayon::ThreadPoolBuilder;

use dir_to_md::config::{Args, Config};
use dir_to_md::converter::{Converter, MarkItDown};
use dir_to_md::report::{ReportFormat, Reporter, ScanReport};
use dir_to_md::serializer::ContentSerializer;
use dir_to_md::writer::generate;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "dir-to-md", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    // Create configuration
    let config = Config::from_args(args);

    // Configure thread pool
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        eprintln!("Warning: Failed to set thread pool size: {}", e);
    }

    let converter: Option<Arc<dyn Converter>> = if config.use_converter {
        MarkItDown::detect(&config.converter_command).map(|c| Arc::new(c) as Arc<dyn Converter>)
    } else {
        debug!("Document conversion disabled");
        None
    };
    if config.use_converter && converter.is_none() && config.verbose {
        eprintln!(
            "⚠ {} not found; PDFs, office documents and images will not be converted",
            config.converter_command
        );
    }

    println!("📁 Processing directory: {}", config.target_dir.display());
    println!("📄 Output file: {}", config.output_file.display());

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("📊 Processing");

    let result = generate(&config, ContentSerializer::new(converter), Arc::new(progress.clone()));
    progress.finish_and_clear();

    match result {
        Ok(stats) => {
            let report = ScanReport::new(config.output_file.display().to_string(), stats);
            Reporter::new(ReportFormat::ConsoleTable).print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}
