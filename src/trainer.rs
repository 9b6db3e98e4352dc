//! N-gram language model training.
//!
//! A [`TrainingRun`] owns one working directory under the temp root and drives
//! the OpenGrm tools over it in a fixed order:
//!
//! ```text
//! Init → WriteInput → Symbols → Compile → Count → Estimate → Export → Done
//! ```
//!
//! Any stage failure moves the run to `Failed` and nothing after it runs. The
//! model is copied to the caller's path only once every stage has succeeded.
//! The working directory is never removed, so a failed run can be inspected.

use crate::defaults;
use crate::error::{LmError, Result};
use crate::stage::{CommandExecutor, PipelineStage, StageKind, StageRunner};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Init,
    WriteInput,
    Symbols,
    Compile,
    Count,
    Estimate,
    Export,
    Done,
    Failed,
}

impl From<StageKind> for TrainingState {
    fn from(kind: StageKind) -> Self {
        match kind {
            StageKind::Symbols => TrainingState::Symbols,
            StageKind::Compile => TrainingState::Compile,
            StageKind::Count => TrainingState::Count,
            StageKind::Estimate => TrainingState::Estimate,
            StageKind::Export => TrainingState::Export,
        }
    }
}

/// Fixed artifact locations inside a working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub input: PathBuf,
    pub symbols: PathBuf,
    pub archive: PathBuf,
    pub counts: PathBuf,
    pub estimated_model: PathBuf,
    pub arpa: PathBuf,
    pub final_model: PathBuf,
}

impl ArtifactPaths {
    pub fn new(working_dir: &Path) -> Self {
        Self {
            input: working_dir.join(defaults::INPUT_FILE),
            symbols: working_dir.join(defaults::SYMBOLS_FILE),
            archive: working_dir.join(defaults::ARCHIVE_FILE),
            counts: working_dir.join(defaults::COUNTS_FILE),
            estimated_model: working_dir.join(defaults::ESTIMATED_MODEL_FILE),
            arpa: working_dir.join(defaults::ARPA_FILE),
            final_model: working_dir.join(defaults::FINAL_MODEL_FILE),
        }
    }

    /// Artifacts produced by the stages (everything but the input text).
    pub fn intermediates(&self) -> [&Path; 6] {
        [
            &self.symbols,
            &self.archive,
            &self.counts,
            &self.estimated_model,
            &self.arpa,
            &self.final_model,
        ]
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub model_path: PathBuf,
    pub artifacts: ArtifactPaths,
    pub sentences: usize,
}

/// One invocation of the training pipeline.
#[derive(Debug)]
pub struct TrainingRun {
    name: String,
    working_dir: PathBuf,
    model_path: PathBuf,
    ngram_order: u8,
    text: Vec<String>,
    state: TrainingState,
}

impl TrainingRun {
    /// Prepare a run writing `<temp_root>/<model name>/`.
    ///
    /// The model name is the base name of `model_path` without extension. An
    /// existing working directory is reused and its artifacts overwritten.
    pub fn new(
        text: Vec<String>,
        model_path: &Path,
        ngram_order: u8,
        temp_root: &Path,
    ) -> Result<Self> {
        if ngram_order == 0 {
            return Err(LmError::ConfigInvalidValue {
                key: "ngram_order".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let name = model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                LmError::Other(format!(
                    "Cannot derive a model name from {}",
                    model_path.display()
                ))
            })?;

        let working_dir = temp_root.join(&name);
        fs::create_dir_all(&working_dir)?;
        log::debug!("Working directory for {}: {}", name, working_dir.display());

        Ok(Self {
            name,
            working_dir,
            model_path: model_path.to_path_buf(),
            ngram_order,
            text,
            state: TrainingState::Init,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn artifacts(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.working_dir)
    }

    /// The external-tool stages of this run, in execution order.
    pub fn stages(&self) -> Vec<PipelineStage> {
        let a = self.artifacts();
        let arg = |p: &Path| p.display().to_string();
        vec![
            PipelineStage {
                kind: StageKind::Symbols,
                args: vec![arg(&a.input), arg(&a.symbols)],
                inputs: vec![a.input.clone()],
                outputs: vec![a.symbols.clone()],
            },
            PipelineStage {
                kind: StageKind::Compile,
                args: vec![
                    format!("--symbols={}", arg(&a.symbols)),
                    "--keep_symbols=1".to_string(),
                    arg(&a.input),
                    arg(&a.archive),
                ],
                inputs: vec![a.symbols.clone(), a.input.clone()],
                outputs: vec![a.archive.clone()],
            },
            PipelineStage {
                kind: StageKind::Count,
                args: vec![
                    format!("--order={}", self.ngram_order),
                    arg(&a.archive),
                    arg(&a.counts),
                ],
                inputs: vec![a.archive.clone()],
                outputs: vec![a.counts.clone()],
            },
            PipelineStage {
                kind: StageKind::Estimate,
                args: vec![arg(&a.counts), arg(&a.estimated_model)],
                inputs: vec![a.counts.clone()],
                outputs: vec![a.estimated_model.clone()],
            },
            PipelineStage {
                kind: StageKind::Export,
                args: vec![
                    "--ARPA".to_string(),
                    arg(&a.estimated_model),
                    arg(&a.arpa),
                ],
                inputs: vec![a.estimated_model.clone()],
                outputs: vec![a.arpa.clone()],
            },
        ]
    }

    /// Run every stage, then promote the model to the requested path.
    pub fn train<E: CommandExecutor>(&mut self, runner: &StageRunner<E>) -> Result<TrainingReport> {
        match self.drive(runner) {
            Ok(report) => {
                self.state = TrainingState::Done;
                log::info!("Language model written to {}", report.model_path.display());
                Ok(report)
            }
            Err(e) => {
                log::error!("Training {} failed during {:?}: {}", self.name, self.state, e);
                self.state = TrainingState::Failed;
                Err(e)
            }
        }
    }

    fn drive<E: CommandExecutor>(&mut self, runner: &StageRunner<E>) -> Result<TrainingReport> {
        let artifacts = self.artifacts();

        self.state = TrainingState::WriteInput;
        self.write_input(&artifacts.input)?;

        for stage in self.stages() {
            self.state = stage.kind.into();
            log::info!("Running {} ({})", stage.kind, stage.tool());
            runner.run(&stage)?;
        }
        fs::copy(&artifacts.estimated_model, &artifacts.final_model)?;

        self.promote(&artifacts)?;
        Ok(TrainingReport {
            model_path: self.model_path.clone(),
            artifacts,
            sentences: self.text.len(),
        })
    }

    /// One transcription per line, UTF-8.
    fn write_input(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        for line in &self.text {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Copy the finished model to the caller's path: the ARPA text when the
    /// path ends in `.arpa`, the binary model otherwise.
    fn promote(&self, artifacts: &ArtifactPaths) -> Result<()> {
        let wants_arpa = self
            .model_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("arpa"));
        let source = if wants_arpa {
            &artifacts.arpa
        } else {
            &artifacts.final_model
        };
        if source == &self.model_path {
            return Ok(());
        }
        if let Some(parent) = self.model_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &self.model_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::tests::MockCommandExecutor;
    use crate::stage::{CommandOutput, Toolchain};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Executor that stands in for the OpenGrm tools by writing each stage's
    /// output file from its input. The tool named in `killed` dies by signal
    /// without writing anything.
    #[derive(Default)]
    struct FakeOpenGrm {
        killed: Option<&'static str>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl FakeOpenGrm {
        fn killing(tool: &'static str) -> Self {
            Self {
                killed: Some(tool),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandExecutor for FakeOpenGrm {
        fn execute(&self, program: &Path, args: &[String]) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(program.to_path_buf());
            if self.killed.is_some_and(|tool| program == Path::new(tool)) {
                return Ok(CommandOutput {
                    status: None,
                    ..Default::default()
                });
            }

            let files: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
            let (input, output) = (files[files.len() - 2], files[files.len() - 1]);
            let contents = fs::read(input)?;
            let mut out = format!("{} {}\n", program.display(), args.len()).into_bytes();
            out.extend(contents);
            fs::write(output, out)?;
            Ok(CommandOutput {
                status: Some(0),
                ..Default::default()
            })
        }
    }

    fn hello_text() -> Vec<String> {
        vec!["hello world".to_string(), "hello there".to_string()]
    }

    #[test]
    fn model_name_comes_from_output_stem() {
        let temp = TempDir::new().unwrap();
        let run = TrainingRun::new(hello_text(), Path::new("/out/english_lm.fst"), 2, temp.path())
            .unwrap();

        assert_eq!(run.name(), "english_lm");
        assert_eq!(run.working_dir(), temp.path().join("english_lm"));
        assert!(run.working_dir().is_dir());
        assert_eq!(run.state(), TrainingState::Init);
    }

    #[test]
    fn zero_order_is_rejected_before_any_write() {
        let temp = TempDir::new().unwrap();
        let result = TrainingRun::new(hello_text(), Path::new("lm.fst"), 0, temp.path());

        assert!(matches!(result, Err(LmError::ConfigInvalidValue { .. })));
        assert!(!temp.path().join("lm").exists());
    }

    #[test]
    fn stage_arguments_follow_tool_contracts() {
        let temp = TempDir::new().unwrap();
        let run = TrainingRun::new(hello_text(), Path::new("lm.fst"), 4, temp.path()).unwrap();
        let a = run.artifacts();
        let s = |p: &PathBuf| p.display().to_string();

        let stages = run.stages();
        let kinds: Vec<_> = stages.iter().map(|st| st.kind).collect();
        assert_eq!(kinds, StageKind::ALL);

        assert_eq!(stages[0].args, vec![s(&a.input), s(&a.symbols)]);
        assert_eq!(
            stages[1].args,
            vec![
                format!("--symbols={}", s(&a.symbols)),
                "--keep_symbols=1".to_string(),
                s(&a.input),
                s(&a.archive),
            ]
        );
        assert_eq!(
            stages[2].args,
            vec!["--order=4".to_string(), s(&a.archive), s(&a.counts)]
        );
        assert_eq!(stages[3].args, vec![s(&a.counts), s(&a.estimated_model)]);
        assert_eq!(
            stages[4].args,
            vec!["--ARPA".to_string(), s(&a.estimated_model), s(&a.arpa)]
        );
    }

    #[test]
    fn full_run_produces_all_artifacts_and_model() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let model_path = out.path().join("models/hello.fst");
        let mut run = TrainingRun::new(hello_text(), &model_path, 2, temp.path()).unwrap();
        let runner = StageRunner::new(FakeOpenGrm::default(), Toolchain::default());

        let report = run.train(&runner).unwrap();

        assert_eq!(run.state(), TrainingState::Done);
        assert_eq!(report.sentences, 2);
        assert_eq!(
            fs::read_to_string(&report.artifacts.input).unwrap(),
            "hello world\nhello there\n"
        );
        for artifact in report.artifacts.intermediates() {
            assert!(artifact.is_file(), "missing {}", artifact.display());
        }
        assert!(fs::metadata(&model_path).unwrap().len() > 0);
        assert_eq!(
            fs::read(&model_path).unwrap(),
            fs::read(&report.artifacts.final_model).unwrap()
        );
    }

    #[test]
    fn arpa_output_path_promotes_arpa_text() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let model_path = out.path().join("hello.arpa");
        let mut run = TrainingRun::new(hello_text(), &model_path, 2, temp.path()).unwrap();

        let report = run
            .train(&StageRunner::new(FakeOpenGrm::default(), Toolchain::default()))
            .unwrap();

        assert_eq!(
            fs::read(&model_path).unwrap(),
            fs::read(&report.artifacts.arpa).unwrap()
        );
    }

    #[test]
    fn failing_symbols_stage_stops_the_run() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let model_path = out.path().join("lm.fst");
        let mut run = TrainingRun::new(hello_text(), &model_path, 2, temp.path()).unwrap();
        let runner = StageRunner::new(
            MockCommandExecutor::new().with_stderr(1, "ERROR: bad input\n"),
            Toolchain::default(),
        );

        match run.train(&runner) {
            Err(LmError::Stage { stage, tool, .. }) => {
                assert_eq!(stage, "symbols");
                assert_eq!(tool, "ngramsymbols");
            }
            other => panic!("Expected Stage error, got {:?}", other),
        }
        assert_eq!(run.state(), TrainingState::Failed);
        assert_eq!(runner.executor().call_count(), 1);
        assert!(!model_path.exists());
        assert!(run.working_dir().is_dir());
    }

    #[test]
    fn failing_count_stage_never_reaches_estimate() {
        let temp = TempDir::new().unwrap();
        let mut run = TrainingRun::new(hello_text(), Path::new("lm.fst"), 3, temp.path()).unwrap();
        let runner = StageRunner::new(FakeOpenGrm::killing("ngramcount"), Toolchain::default());

        let err = run.train(&runner).unwrap_err();
        assert!(err.to_string().contains("ngramcount"));
        assert_eq!(
            runner.executor().calls(),
            vec![
                PathBuf::from("ngramsymbols"),
                PathBuf::from("farcompilestrings"),
                PathBuf::from("ngramcount"),
            ]
        );
    }

    #[test]
    fn killed_stage_never_promotes_model_from_earlier_run() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let model_path = out.path().join("lm.fst");
        let working_dir = temp.path().join("lm");
        fs::create_dir_all(&working_dir).unwrap();
        let stale = working_dir.join(defaults::ESTIMATED_MODEL_FILE);
        fs::write(&stale, "STALE MODEL FROM OLD RUN").unwrap();
        fs::write(working_dir.join(defaults::FINAL_MODEL_FILE), "STALE").unwrap();

        let mut run = TrainingRun::new(hello_text(), &model_path, 2, temp.path()).unwrap();
        let runner = StageRunner::new(FakeOpenGrm::killing("ngrammake"), Toolchain::default());

        match run.train(&runner) {
            Err(LmError::Stage { stage, tool, .. }) => {
                assert_eq!(stage, "estimate");
                assert_eq!(tool, "ngrammake");
            }
            other => panic!("Expected Stage error, got {:?}", other),
        }
        assert_eq!(run.state(), TrainingState::Failed);
        assert!(!stale.exists());
        assert!(!model_path.exists());
    }

    #[test]
    fn silent_signal_kill_on_every_stage_fails_first_stage() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let model_path = out.path().join("lm.fst");
        let working_dir = temp.path().join("lm");
        fs::create_dir_all(&working_dir).unwrap();
        fs::write(
            working_dir.join(defaults::ESTIMATED_MODEL_FILE),
            "STALE MODEL FROM OLD RUN",
        )
        .unwrap();

        let mut run = TrainingRun::new(hello_text(), &model_path, 2, temp.path()).unwrap();
        let executor = StageKind::ALL
            .iter()
            .fold(MockCommandExecutor::new(), |mock, _| mock.with_signal());
        let runner = StageRunner::new(executor, Toolchain::default());

        let err = run.train(&runner).unwrap_err();
        assert!(matches!(err, LmError::Stage { ref stage, .. } if stage == "symbols"));
        assert_eq!(runner.executor().call_count(), 1);
        assert!(!model_path.exists());
    }

    #[test]
    fn rerun_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let model_path = out.path().join("lm.fst");
        let runner = StageRunner::new(FakeOpenGrm::default(), Toolchain::default());

        let mut first = TrainingRun::new(hello_text(), &model_path, 2, temp.path()).unwrap();
        let report = first.train(&runner).unwrap();
        let mut snapshot = vec![fs::read(&report.artifacts.input).unwrap()];
        for artifact in report.artifacts.intermediates() {
            snapshot.push(fs::read(artifact).unwrap());
        }
        let model = fs::read(&model_path).unwrap();

        let mut second = TrainingRun::new(hello_text(), &model_path, 2, temp.path()).unwrap();
        let report = second.train(&runner).unwrap();
        let mut again = vec![fs::read(&report.artifacts.input).unwrap()];
        for artifact in report.artifacts.intermediates() {
            again.push(fs::read(artifact).unwrap());
        }

        assert_eq!(snapshot, again);
        assert_eq!(model, fs::read(&model_path).unwrap());
    }
}
