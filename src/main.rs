use std::{path::PathBuf, process};

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use vmil_translator::{
    io::{discover, DirectorySource, FileSink, OutputMode},
    LabelScope, LinkOptions, Linker, TranslateResult,
};

/// Translate Hack VM code into Hack assembly
#[derive(Parser, Debug)]
#[command(name = "vmil")]
#[command(about = "Translate Hack VM code into Hack assembly", long_about = None)]
struct Args {
    /// A .vm file, or a directory whose .vm files form one program
    input: PathBuf,

    /// Output file (default: <file>.asm, or <dir>/<dir>.asm for a directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prepend the bootstrap code (default for directories)
    #[arg(long, conflicts_with = "no_bootstrap")]
    bootstrap: bool,

    /// Never prepend the bootstrap code
    #[arg(long)]
    no_bootstrap: bool,

    /// Append to the output file instead of replacing it
    #[arg(long)]
    append: bool,

    /// Qualify label names with their enclosing function
    #[arg(long)]
    scope_labels: bool,

    /// Log progress (VMIL_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("VMIL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> TranslateResult<usize> {
    let discovered = discover(&args.input)?;

    let bootstrap = if args.bootstrap {
        true
    } else if args.no_bootstrap {
        false
    } else {
        discovered.is_directory
    };
    let label_scope = if args.scope_labels {
        LabelScope::Function
    } else {
        LabelScope::Bare
    };
    let mode = if args.append {
        warn!("appending to existing output; repeated runs duplicate code");
        OutputMode::Append
    } else {
        OutputMode::Truncate
    };

    let options = LinkOptions::default()
        .with_bootstrap(bootstrap)
        .with_label_scope(label_scope);
    let source = DirectorySource::new(&discovered.root);
    let mut sink = FileSink::new(
        args.output.unwrap_or(discovered.default_output),
        mode,
    );

    Linker::new(options).run(&source, &discovered.modules, &mut sink)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
