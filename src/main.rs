//! Entry point ("driver").
//!
//! Orchestrates the lexer, parser, and generator, then either prints the
//! generated C++ or hands it to a host compiler to produce a native
//! executable.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gerlangc::driver::{self, CompileOptions, HostCompiler};

/// Compile a GerLang (`.gl`) source file to C++17, and optionally link a
/// native executable.
#[derive(Parser, Debug)]
#[command(name = "gerlangc", version, about)]
struct Cli {
    /// GerLang source file to compile.
    input: PathBuf,

    /// Output path. For a linked executable this is the binary name
    /// (defaults to the input file's stem); with `-S`, the generated
    /// C++ is written here instead, or to stdout when this is `-`.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Emit the generated C++ next to the input file (or to stdout with
    /// `-o -`) instead of invoking a host compiler.
    #[arg(short = 'S', long = "emit-cpp")]
    emit_cpp: bool,

    /// C++ standard to request from the host compiler.
    #[arg(long = "cpp-std", default_value = "c++17")]
    cpp_std: String,

    /// Host C++ compiler to invoke.
    #[arg(long, default_value = "c++")]
    cxx: String,

    /// Keep the generated `.cpp` file instead of deleting it after
    /// linking.
    #[arg(long = "keep-temp")]
    keep_temp: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("RUST_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut options = CompileOptions::empty();
    if cli.emit_cpp {
        options |= CompileOptions::EMIT_CPP;
    }
    if cli.keep_temp {
        options |= CompileOptions::KEEP_TEMP;
    }

    let host = HostCompiler {
        command: cli.cxx,
        cpp_std: cli.cpp_std,
    };

    let output = cli.output.or_else(|| {
        if cli.emit_cpp {
            None
        } else {
            cli.input.file_stem().map(PathBuf::from)
        }
    });

    match driver::run(&cli.input, output.as_deref(), &host, options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("gerlangc: {error:#}");
            ExitCode::FAILURE
        }
    }
}
