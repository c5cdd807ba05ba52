//! `jl` — run a JL source file, or drop into an interactive REPL.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use structopt::StructOpt;

use jl::context::Context;
use jl::parser::Parser;

#[derive(Debug, StructOpt)]
#[structopt(name = "jl", about = "A small embeddable Lisp-family interpreter")]
struct Opt {
    /// Increase logging verbosity; repeat for more (-v, -vv, -vvv).
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Source file to run. Without this, starts an interactive REPL.
    #[structopt(parse(from_os_str))]
    source: Option<PathBuf>,
}

fn main() -> ExitCode {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).expect("logger already initialized");

    match opt.source {
        Some(path) => run_file(&path),
        None => {
            run_repl();
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &std::path::Path) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("jl: could not read '{}': {}", path.display(), e);
            // Matches the original CLI's exit(-1) for missing-file/usage errors.
            std::process::exit(-1);
        }
    };

    let ctx = Context::new();
    let mut parser = Parser::new(&source);
    while let Some(expr) = ctx.parse_one(&mut parser) {
        ctx.evaluate(&expr);
    }
    ExitCode::SUCCESS
}

/// Interactive mode: one line of input is treated as a self-contained
/// chunk that may hold zero or more top-level expressions, each evaluated
/// and printed with a `> `/`=> ` prompt pair. A JL expression that spans
/// multiple lines is not supported by this simple line-buffered REPL (enter
/// it via file mode instead); that keeps "unterminated input" and "genuine
/// parse error" from being ambiguous within a single read.
fn run_repl() {
    let ctx = Context::new();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                log::error!("failed to read stdin: {}", e);
                break;
            }
        }

        let mut parser = Parser::new(&line);
        while let Some(expr) = ctx.parse_one(&mut parser) {
            let result = ctx.evaluate(&expr);
            println!("=> {}", ctx.print(&result));
        }
    }
}
