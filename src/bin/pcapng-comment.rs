//! pcapng-comment: add and read packet comments in PCAPNG files.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use pcapng_annotate::{
    AddCommentRequest, Annotator, AnnotatorConfig, CommentReport, ReadCommentRequest,
    DEFAULT_BUFFER_CAPACITY,
};

/// Output format of the read command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Plain text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Add and read packet comments in PCAPNG files.
#[derive(Parser, Debug)]
#[command(name = "pcapng-comment")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Initial size of the read buffer, in bytes
    #[arg(long = "buffer-size", default_value_t = DEFAULT_BUFFER_CAPACITY, global = true)]
    buffer_size: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set the comment of a packet, writing the result to a new file
    Add {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Packet number, starting at 1
        #[arg(value_name = "PACKET")]
        packet: usize,
        #[arg(value_name = "COMMENT")]
        comment: String,
    },
    /// Read the comment of a packet
    Read {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Packet number, starting at 1
        #[arg(value_name = "PACKET")]
        packet: usize,
        /// Output format
        #[arg(long = "format", value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Interactive menu, using `;`-separated input
    Menu,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let annotator = Annotator::new(AnnotatorConfig {
        buffer_capacity: args.buffer_size,
        ..AnnotatorConfig::default()
    });
    debug!(config = ?annotator.config(), "annotator ready");

    match args.command {
        Command::Add {
            file,
            packet,
            comment,
        } => {
            let request = AddCommentRequest::new(file, packet, comment)?;
            let output = add(&annotator, &request)?;
            println!("{}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Read {
            file,
            packet,
            format,
        } => {
            let request = ReadCommentRequest::new(file, packet)?;
            let report = read(&annotator, &request);
            print_report(&report, format)?;
            match report {
                CommentReport::Comment(_) => Ok(ExitCode::SUCCESS),
                CommentReport::Error { .. } => Ok(ExitCode::FAILURE),
            }
        }
        Command::Menu => {
            run_menu(&annotator)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn add(annotator: &Annotator, request: &AddCommentRequest) -> Result<PathBuf> {
    info!(
        file = %request.path.display(),
        packet = request.packet_number,
        "adding comment"
    );
    let output = annotator
        .add_comment(&request.path, request.packet_number, &request.comment)
        .with_context(|| format!("Failed to add comment to {}", request.path.display()))?;
    info!(output = %output.display(), "capture saved");
    Ok(output)
}

fn read(annotator: &Annotator, request: &ReadCommentRequest) -> CommentReport {
    info!(
        file = %request.path.display(),
        packet = request.packet_number,
        "reading comment"
    );
    let res = annotator.read_comment(&request.path, request.packet_number);
    if let Err(ref e) = res {
        warn!(category = ?e.category(), "read failed: {}", e);
    }
    CommentReport::from(res)
}

fn print_report(report: &CommentReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Failed to format report")?;
            println!("\n{}\n", json);
        }
        OutputFormat::Text => match report {
            CommentReport::Comment(c) => println!("packet {}: {}", c.packet_number, c.comment),
            CommentReport::Error { error } => println!("error: {}", error),
        },
    }
    Ok(())
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line.context("Failed to read input")?)),
        None => Ok(None),
    }
}

fn run_menu(annotator: &Annotator) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("Choose an option:");
        println!("1 -> Add a comment to a PCAPNG file.");
        println!("2 -> Read a comment from a PCAPNG file.");
        println!("q -> Close program.");
        let choice = match prompt(&mut lines, "Enter your choice (1 or 2 or q): ")? {
            Some(choice) => choice,
            None => return Ok(()),
        };
        match choice.trim() {
            "1" => {
                println!("Enter the details in this format (semicolon-separated):");
                println!("input_file;comment;packet_number");
                let Some(line) = prompt(&mut lines, "Enter details: ")? else {
                    return Ok(());
                };
                match line.parse::<AddCommentRequest>() {
                    Ok(request) => match add(annotator, &request) {
                        Ok(output) => println!(
                            "Comment added to packet {} and saved to {}.",
                            request.packet_number,
                            output.display()
                        ),
                        Err(e) => println!("Error adding comment: {:#}", e),
                    },
                    Err(e) => eprintln!("Invalid input: {}", e),
                }
            }
            "2" => {
                println!("Enter the details in this format (semicolon-separated):");
                println!("input_file;packet_number");
                let Some(line) = prompt(&mut lines, "Enter details: ")? else {
                    return Ok(());
                };
                match line.parse::<ReadCommentRequest>() {
                    Ok(request) => {
                        let report = read(annotator, &request);
                        println!("Packet Information:");
                        print_report(&report, OutputFormat::Json)?;
                    }
                    Err(e) => eprintln!("Invalid input: {}", e),
                }
            }
            "q" => return Ok(()),
            _ => eprintln!("Invalid choice. Please enter 1 or 2 or q."),
        }
    }
}
