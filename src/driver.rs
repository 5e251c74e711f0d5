//! The compilation driver: ties the lexer, parser, and generator
//! together and, unless asked to stop at C++ text, hands the result to
//! a host C++ compiler.
//!
//! This module is the external collaborator spec.md calls out as
//! out-of-core-scope glue — reading the file, writing a temporary file,
//! spawning the host compiler, and mapping its exit status — modeled on
//! the way the teacher crate's linker spawns and waits on `gcc`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{bail, Context, Result};
use bitflags::bitflags;
use tracing::{debug, info};

use crate::error::Diagnostics;
use crate::{generator, lexer, parser};

bitflags! {
    /// Boolean knobs for a single compilation run.
    pub struct CompileOptions: u32 {
        /// Stop after emitting C++ text; don't invoke a host compiler.
        const EMIT_CPP = 0x01;
        /// Don't delete the generated `.cpp` file after compiling.
        const KEEP_TEMP = 0x02;
    }
}

/// Host C++ compiler settings, independent of any one compilation.
pub struct HostCompiler {
    pub command: String,
    pub cpp_std: String,
}

impl Default for HostCompiler {
    fn default() -> Self {
        HostCompiler {
            command: "c++".to_string(),
            cpp_std: "c++17".to_string(),
        }
    }
}

/// Lexes, parses, and generates C++ for `source`, returning the
/// rendered C++ text or the parser's diagnostics.
///
/// This is the pure core of the pipeline; it never touches the
/// filesystem or spawns a process.
pub fn compile_to_cpp(source: &str, file_name: &str) -> Result<String, Diagnostics> {
    let tokens = lexer::tokenize(source);
    debug!(token_count = tokens.len(), "lexed source");

    let outcome = parser::parse(tokens, file_name, source)?;
    debug!(
        declaration_count = outcome.program.declarations().count(),
        recovered_errors = outcome.diagnostics.len(),
        "parsed token stream"
    );

    if !outcome.diagnostics.is_empty() {
        return Err(outcome.diagnostics);
    }

    let cpp = generator::generate(&outcome.program);
    debug!(byte_count = cpp.len(), "generated C++ source");
    Ok(cpp)
}

/// Runs the full driver: read `input`, compile it, and either write the
/// C++ text out directly (`options` contains `EMIT_CPP`) or hand it to
/// the host compiler to produce `output`.
pub fn run(
    input: &Path,
    output: Option<&Path>,
    host: &HostCompiler,
    options: CompileOptions,
) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let file_name = input.display().to_string();

    let cpp = compile_to_cpp(&source, &file_name).map_err(|diagnostics| {
        anyhow::anyhow!("{}", diagnostics)
    })?;

    if options.contains(CompileOptions::EMIT_CPP) {
        return emit_cpp_text(&cpp, output);
    }

    let output = output.ok_or_else(|| anyhow::anyhow!("an output path is required to link an executable"))?;
    compile_with_host(&cpp, input, output, host, options)
}

fn emit_cpp_text(cpp: &str, output: Option<&Path>) -> Result<()> {
    match output {
        None => {
            print!("{}", cpp);
            Ok(())
        }
        Some(path) if path == Path::new("-") => {
            print!("{}", cpp);
            Ok(())
        }
        Some(path) => {
            fs::write(path, cpp).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote generated C++");
            Ok(())
        }
    }
}

fn compile_with_host(
    cpp: &str,
    input: &Path,
    output: &Path,
    host: &HostCompiler,
    options: CompileOptions,
) -> Result<()> {
    let temp_path = temp_cpp_path(input);
    fs::write(&temp_path, cpp)
        .with_context(|| format!("failed to write temporary file {}", temp_path.display()))?;

    let result = spawn_host_compiler(&temp_path, output, host);

    if !options.contains(CompileOptions::KEEP_TEMP) {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn temp_cpp_path(input: &Path) -> PathBuf {
    let mut path = input.to_path_buf();
    path.set_extension("gerlangc.cpp");
    path
}

fn spawn_host_compiler(cpp_path: &Path, output: &Path, host: &HostCompiler) -> Result<()> {
    info!(compiler = %host.command, std = %host.cpp_std, "invoking host compiler");

    let status = Command::new(&host.command)
        .arg(format!("-std={}", host.cpp_std))
        .arg(cpp_path)
        .arg("-o")
        .arg(output)
        .stdin(Stdio::null())
        .status()
        .with_context(|| format!("failed to spawn host compiler {}", host.command))?;

    map_exit_status(status)
}

fn map_exit_status(status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        bail!("host compiler exited with status {}", status)
    }
}
