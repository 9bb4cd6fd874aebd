use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Parser;
use erdot::{CompileOptions, Direction, EdgeGrammar, Error};
use tracing::Level;

#[derive(Parser)]
#[command(name = "erdot", about = "Compile Chen ER diagram notation into Graphviz DOT")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Relationship edge syntax: `full` or `simplified`
    #[arg(long, env = "ERDOT_EDGE_GRAMMAR", default_value = "full")]
    edge_grammar: EdgeGrammar,

    /// Layout direction hint: `LR` or `TB`
    #[arg(long, short = 'd', env = "ERDOT_DIRECTION", default_value = "LR")]
    direction: Direction,

    /// Fail on lines that match no statement
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let input = read_input(cli.file.as_ref())?;
    let options = CompileOptions {
        edge_grammar: cli.edge_grammar,
        direction: cli.direction,
        strict: cli.strict,
    };

    let compiled = erdot::compile_with_options(&input, &options)?;
    for line in &compiled.ignored {
        tracing::warn!(line = line.line_number, text = %line.text, "ignored unrecognized line");
    }
    tracing::info!(bytes = compiled.dot.len(), "compiled diagram");

    write_output(cli.output.as_ref(), &compiled.dot)
}

fn read_input(file: Option<&PathBuf>) -> Result<String, Error> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|source| Error::ReadInput {
            path: path.clone(),
            source,
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(Error::ReadStdin)?;
            Ok(buf)
        }
    }
}

fn write_output(file: Option<&PathBuf>, dot: &str) -> Result<(), Error> {
    match file {
        Some(path) => std::fs::write(path, dot).map_err(|source| Error::WriteOutput {
            path: path.clone(),
            source,
        }),
        None => std::io::stdout()
            .write_all(dot.as_bytes())
            .map_err(Error::WriteStdout),
    }
}
