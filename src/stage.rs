//! External tool invocation for the training pipeline.
//!
//! Every stage runs one OpenGrm executable and is judged by its error stream:
//! any diagnostic output at all means failure, whatever the exit code. A
//! stage must also finish on its own and leave every output it declares.
//!
//! The `CommandExecutor` trait keeps the runner testable without the toolchain.

use crate::defaults;
use crate::error::{LmError, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of one finished process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` to completion and capture its output.
    ///
    /// Returns an error only if the process could not be started.
    fn execute(&self, program: &Path, args: &[String]) -> Result<CommandOutput>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, program: &Path, args: &[String]) -> Result<CommandOutput> {
        let tool = program.display().to_string();
        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LmError::ToolNotFound { tool: tool.clone() }
            } else {
                LmError::ToolLaunch {
                    tool: tool.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Locates the external executables.
///
/// A configured `bin_dir` wins when it contains the tool; otherwise the bare
/// name is handed to the OS for a `PATH` lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Toolchain {
    bin_dir: Option<PathBuf>,
}

impl Toolchain {
    pub fn new(bin_dir: Option<PathBuf>) -> Self {
        Self { bin_dir }
    }

    pub fn resolve(&self, tool: &str) -> PathBuf {
        if let Some(dir) = &self.bin_dir {
            let candidate = dir.join(tool);
            if candidate.is_file() {
                return candidate;
            }
        }
        PathBuf::from(tool)
    }

    /// Whether `tool` can be found in `bin_dir` or on `PATH`.
    pub fn is_available(&self, tool: &str) -> bool {
        if let Some(dir) = &self.bin_dir
            && dir.join(tool).is_file()
        {
            return true;
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(tool).is_file()))
            .unwrap_or(false)
    }
}

/// The stages of the training pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Symbols,
    Compile,
    Count,
    Estimate,
    Export,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::Symbols,
        StageKind::Compile,
        StageKind::Count,
        StageKind::Estimate,
        StageKind::Export,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Symbols => "symbols",
            StageKind::Compile => "compile",
            StageKind::Count => "count",
            StageKind::Estimate => "estimate",
            StageKind::Export => "export",
        }
    }

    pub fn tool(&self) -> &'static str {
        match self {
            StageKind::Symbols => defaults::TOOL_SYMBOLS,
            StageKind::Compile => defaults::TOOL_COMPILE,
            StageKind::Count => defaults::TOOL_COUNT,
            StageKind::Estimate => defaults::TOOL_ESTIMATE,
            StageKind::Export => defaults::TOOL_EXPORT,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One external-tool invocation with its declared artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStage {
    pub kind: StageKind,
    pub args: Vec<String>,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

impl PipelineStage {
    pub fn tool(&self) -> &'static str {
        self.kind.tool()
    }
}

/// Runs pipeline stages through a [`CommandExecutor`].
pub struct StageRunner<E: CommandExecutor> {
    executor: E,
    toolchain: Toolchain,
}

impl<E: CommandExecutor> StageRunner<E> {
    pub fn new(executor: E, toolchain: Toolchain) -> Self {
        Self {
            executor,
            toolchain,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run `stage` once; there are no retries.
    ///
    /// Declared outputs are removed first so nothing left by an earlier run
    /// can pass for this run's result. Any stderr output is a [`LmError::Stage`],
    /// and so is a signal kill or a declared output missing afterwards.
    pub fn run(&self, stage: &PipelineStage) -> Result<()> {
        let tool = stage.tool();
        let program = self.toolchain.resolve(tool);
        log::debug!("[{}] {} {}", stage.kind, program.display(), stage.args.join(" "));

        for path in &stage.outputs {
            remove_stale(path)?;
        }

        let output = self
            .executor
            .execute(&program, &stage.args)
            .map_err(|e| match e {
                LmError::ToolNotFound { .. } => stage_error(
                    stage,
                    format!(
                        "{} not found. Install OpenGrm NGram and OpenFst, \
                         or point toolchain.bin_dir at their binaries.",
                        tool
                    ),
                ),
                LmError::ToolLaunch { message, .. } => stage_error(stage, message),
                other => other,
            })?;

        if !output.stderr.is_empty() {
            return Err(stage_error(stage, output.stderr));
        }
        match output.status {
            Some(0) => {}
            Some(code) => log::warn!(
                "[{}] {} exited with {} but wrote no diagnostics",
                stage.kind,
                tool,
                code
            ),
            None => {
                return Err(stage_error(
                    stage,
                    format!("{} was terminated by a signal", tool),
                ));
            }
        }
        if let Some(missing) = stage.outputs.iter().find(|path| !path.is_file()) {
            return Err(stage_error(
                stage,
                format!("{} did not write {}", tool, missing.display()),
            ));
        }
        Ok(())
    }
}

fn stage_error(stage: &PipelineStage, diagnostic: String) -> LmError {
    LmError::Stage {
        stage: stage.kind.name().to_string(),
        tool: stage.tool().to_string(),
        diagnostic,
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

impl StageRunner<SystemCommandExecutor> {
    /// Create a runner with the system command executor.
    pub fn system(toolchain: Toolchain) -> Self {
        Self::new(SystemCommandExecutor::new(), toolchain)
    }
}
