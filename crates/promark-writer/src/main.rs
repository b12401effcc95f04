/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

use clap::Parser;
use promark_ir::Node;
use promark_writer::{RichContent, Writer, WriterOptions};
use std::io::{self, Read, Write};

#[derive(Parser, Debug)]
#[command(name = "promark-render")]
#[command(about = "Render a promark IR document to prompt output")]
struct Args {
    /// Input file containing the IR as JSON, or "-" for stdin.
    #[arg(short = 'i', long = "input", default_value = "-")]
    input: String,

    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Emit speaker-attributed chat messages instead of a single document.
    #[arg(long = "messages")]
    messages: bool,

    /// Emit source-mapped segments alongside the rendered output.
    #[arg(long = "source-map")]
    source_map: bool,

    /// Writer options as a JSON object, e.g. '{"truncate-direction": "middle"}'.
    #[arg(long = "options")]
    options: Option<String>,
}

fn run(args: &Args) -> Result<String, String> {
    let mut input = String::new();
    if args.input == "-" {
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("Failed to read from stdin: {e}"))?;
    } else {
        input = std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read {}: {e}", args.input))?;
    }

    let node: Node =
        serde_json::from_str(&input).map_err(|e| format!("Invalid IR document: {e}"))?;

    let options = match &args.options {
        Some(raw) => {
            let patch: serde_json::Value =
                serde_json::from_str(raw).map_err(|e| format!("Invalid options: {e}"))?;
            WriterOptions::default()
                .merged_with(&patch)
                .map_err(|e| e.to_string())?
        }
        None => WriterOptions::default(),
    };
    let writer = Writer::with_options(options);

    let rendered = match (args.messages, args.source_map) {
        (true, true) => {
            let messages = writer
                .write_messages_with_source_map(&node)
                .map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&messages)
        }
        (true, false) => {
            let messages = writer.write_messages(&node).map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&messages)
        }
        (false, true) => {
            let segments = writer
                .write_with_source_map(&node)
                .map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&segments)
        }
        (false, false) => {
            // Plain text prints raw; mixed content prints as JSON.
            match writer.write(&node).map_err(|e| e.to_string())? {
                RichContent::Text(text) => return Ok(text),
                parts => serde_json::to_string_pretty(&parts),
            }
        }
    };
    rendered.map_err(|e| format!("Failed to serialize output: {e}"))
}

fn main() {
    let args = Args::parse();
    match run(&args) {
        Ok(rendered) => match &args.output {
            Some(path) => {
                if let Err(e) = std::fs::write(path, rendered + "\n") {
                    eprintln!("Failed to write {path}: {e}");
                    std::process::exit(1);
                }
            }
            None => {
                let mut stdout = io::stdout();
                let _ = writeln!(stdout, "{rendered}");
            }
        },
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}
