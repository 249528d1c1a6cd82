//! mindconv - Mind map converter

use std::process::ExitCode;

use clap::Parser;

use mindconv::{read_mindmap, write_mindmap};

#[derive(Parser)]
#[command(name = "mindconv")]
#[command(version, about = "Mind map converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    mindconv map.xmind map.md      Convert XMind to Markdown
    mindconv notes.csv map.xmind   Convert CSV triples to XMind
    mindconv -i map.xmind          Show mind map structure")]
struct Cli {
    /// Input file (xmind, csv, md, html, json)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (xmind, csv, md, html, json)
    #[arg(value_name = "OUTPUT", required_unless_present = "info")]
    output: Option<String>,

    /// Show mind map structure without converting
    #[arg(short, long)]
    info: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = if cli.info {
        show_info(&cli.input)
    } else {
        let output = cli.output.expect("output required");
        convert(&cli.input, &output, cli.quiet)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_info(path: &str) -> Result<(), String> {
    let map = read_mindmap(path).map_err(|e| e.to_string())?;

    println!("File: {path}");
    println!("Title: {}", map.title);
    println!("Depth: {}", map.depth());
    println!("Nodes: {}", map.node_count());
    if !map.detached.is_empty() {
        println!("Detached topics: {}", map.detached.len());
    }
    if !map.relations.is_empty() {
        println!("Relations: {}", map.relations.len());
    }

    let outline = map.outline();
    if !outline.is_empty() {
        println!("{}", "-".repeat(50));
        print!("{outline}");
    }

    Ok(())
}

fn convert(input: &str, output: &str, quiet: bool) -> Result<(), String> {
    let map = read_mindmap(input).map_err(|e| e.to_string())?;
    write_mindmap(&map, output).map_err(|e| e.to_string())?;

    if !quiet {
        println!("Converted {input} -> {output}");
    }
    Ok(())
}
