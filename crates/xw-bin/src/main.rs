//! xword entrypoint: a headless session runner.
//!
//! Loads a puzzle, optional saved progress and configuration, replays an
//! input script (file or stdin) through the event loop and writes progress
//! back on exit.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{
    KeyTranslator, SelectionController, SessionObserver, dispatch, run_deferred,
};
use core_events::{EVENT_CHANNEL_CAP, Event, EventSourceRegistry, InputEvent};
use core_grid::{Board, Grid, Puzzle};
use core_state::{Prompt, RestoreReport, Snapshot};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod script;

use script::{ScriptEventSource, StdinScriptSource, parse_script};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "xword", version, about = "Crossword session runner")]
struct Args {
    /// Puzzle definition (JSON).
    pub puzzle: PathBuf,
    /// Input script to replay. Reads script lines from stdin when omitted.
    #[arg(long = "script")]
    pub script: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `xword.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Progress file, restored at startup and saved whenever the grid changes.
    #[arg(long = "progress")]
    pub progress: Option<PathBuf>,
    /// Skip the intro popup.
    #[arg(long = "no-intro")]
    pub no_intro: bool,
    /// Print the final grid.
    #[arg(long = "dump")]
    pub dump: bool,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

struct SessionContext {
    controller: SelectionController,
    translator: KeyTranslator,
    config: core_config::Config,
    progress: Option<PathBuf>,
    script: Option<Vec<InputEvent>>,
    show_intro: bool,
    dump: bool,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn run(&mut self) -> Result<SessionContext> {
        self.configure_logging()?;
        Self::install_panic_hook();
        info!(target: "runtime", "startup");

        let args = Args::parse();
        let context = Self::load_session(&args)?;
        info!(
            target: "runtime",
            puzzle = context.controller.puzzle().id(),
            dimensions = context.controller.puzzle().dimensions(),
            clues = context.controller.puzzle().clues().len(),
            scripted = context.script.is_some(),
            config_override = args.config.is_some(),
            "bootstrap_complete"
        );
        Ok(context)
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("xword.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "xword.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }

    fn load_session(args: &Args) -> Result<SessionContext> {
        let payload = std::fs::read_to_string(&args.puzzle)
            .with_context(|| format!("reading puzzle {}", args.puzzle.display()))?;
        let puzzle = Puzzle::from_json(&payload)
            .with_context(|| format!("parsing puzzle {}", args.puzzle.display()))?;
        tracing::debug!(target: "runtime", file = %args.puzzle.display(), size_bytes = payload.len(), "puzzle_read_ok");

        let config = core_config::load_from(args.config.clone())?;
        let mut controller = SelectionController::new(puzzle, config.assist());
        let translator = KeyTranslator::new(&config.file.compound);

        if let Some(path) = args.progress.as_deref() {
            match Snapshot::load(path) {
                Ok(Some(snapshot)) => match controller.restore(&snapshot) {
                    RestoreReport::Applied { blanked } => {
                        info!(target: "state.persist", file = %path.display(), blanked, "progress_restored")
                    }
                    RestoreReport::Stale => {
                        warn!(target: "state.persist", file = %path.display(), "progress_ignored_stale")
                    }
                },
                Ok(None) => {}
                Err(e) => error!(target: "state.persist", file = %path.display(), error = %format!("{e:#}"), "progress_load_failed"),
            }
        }

        let script = match args.script.as_deref() {
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("reading script {}", path.display()))?;
                Some(parse_script(&source).with_context(|| format!("in {}", path.display()))?)
            }
            None => None,
        };

        Ok(SessionContext {
            controller,
            translator,
            show_intro: config.file.popup.onload && !args.no_intro,
            config,
            progress: args.progress.clone(),
            script,
            dump: args.dump,
        })
    }
}

/// Prints prompts and the completion message to stdout.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_prompt(&self, prompt: Prompt) {
        println!("{prompt}");
    }

    fn on_completed(&self) {
        println!("Congratulations! The puzzle is complete.");
    }
}

#[derive(Debug, Clone, Copy)]
enum ShutdownReason {
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

struct SessionRuntime {
    controller: SelectionController,
    translator: KeyTranslator,
    config: core_config::Config,
    progress: Option<PathBuf>,
    show_intro: bool,
    dump: bool,
    observers: Vec<Box<dyn SessionObserver>>,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<tokio::task::JoinHandle<()>>,
}

impl SessionRuntime {
    fn new(
        context: SessionContext,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
        source_handles: Vec<tokio::task::JoinHandle<()>>,
    ) -> Self {
        let SessionContext {
            controller,
            translator,
            config,
            progress,
            show_intro,
            dump,
            script: _,
        } = context;
        Self {
            controller,
            translator,
            config,
            progress,
            show_intro,
            dump,
            observers: vec![Box::new(ConsoleObserver)],
            rx,
            tx: Some(tx),
            source_handles,
        }
    }

    async fn run(&mut self) -> Result<()> {
        if self.show_intro {
            tokio::time::sleep(self.config.file.popup.onload_delay()).await;
            if self.controller.show_onload() {
                info!(target: "runtime", "onload_popup_shown");
            }
        }

        let loop_span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = loop_span.enter();

        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            match event {
                Event::Input(input) => self.handle_input(&input),
                Event::Tick => self.handle_tick(),
                Event::Shutdown => {
                    shutdown_reason = ShutdownReason::ShutdownEvent;
                    break;
                }
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        self.save_progress();
        println!("{}", summary_line(&self.controller));
        if self.dump {
            for row in render_rows(self.controller.grid()) {
                println!("{row}");
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, input: &InputEvent) {
        let gate = self.controller.gate().kind();
        let Some(action) = self.translator.translate(gate, input) else {
            trace!(target: "runtime", ?input, gate = gate.as_str(), "input_ignored");
            return;
        };
        let result = dispatch(action, &mut self.controller, &self.observers);
        if result.grid_mutated {
            self.save_progress();
        }
        self.handle_tick();
    }

    fn handle_tick(&mut self) {
        run_deferred(&mut self.controller, &self.observers);
    }

    fn save_progress(&self) {
        let Some(path) = self.progress.as_deref() else {
            return;
        };
        if let Err(e) = self.controller.snapshot().save(path) {
            error!(target: "state.persist", file = %path.display(), error = %format!("{e:#}"), "progress_save_failed");
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        log_shutdown_stage(reason, "begin");
        if let Some(tx) = self.tx.take() {
            trace!(
                target: "runtime.shutdown",
                reason = reason.as_str(),
                "dropping_runtime_sender"
            );
            drop(tx);
        }

        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_stopped"
                ),
                Ok(Err(err)) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_cancelled"
                ),
                Ok(Err(err)) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "event_source_task_error"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_timeout"
                ),
            }
        }

        log_shutdown_stage(reason, "complete");
    }
}

/// One line per grid row: `#` blocked, `.` empty, otherwise the value.
fn render_rows(grid: &Grid) -> Vec<String> {
    grid.rows()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if cell.blocked {
                        "#".to_string()
                    } else if cell.is_empty() {
                        ".".to_string()
                    } else {
                        cell.value.clone()
                    }
                })
                .collect()
        })
        .collect()
}

fn summary_line(controller: &SelectionController) -> String {
    let grid = controller.grid();
    let (mut filled, mut total) = (0usize, 0usize);
    for (_, cell) in grid.iter().filter(|(_, c)| !c.blocked) {
        total += 1;
        if !cell.is_empty() {
            filled += 1;
        }
    }
    format!(
        "{}: {filled}/{total} cells filled{}",
        controller.puzzle().id(),
        if controller.is_completed() { ", complete" } else { "" }
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    let mut context = startup.run()?;
    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut registry = EventSourceRegistry::new();
    match context.script.take() {
        Some(events) => registry.register(ScriptEventSource::new(events)),
        None => registry.register(StdinScriptSource),
    }
    let source_handles = registry.spawn_all(&tx);

    let mut runtime = SessionRuntime::new(context, tx, rx, source_handles);
    runtime.run().await
}
