//! Integration tests for the crash-recovery session runner
//!
//! Drives the runner with a scripted session double and a collecting sink,
//! so the state machine is exercised without a real interpreter binary.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use printquest::config::{TimingConfig, VocabularyConfig};
use printquest::error::{Error, Result};
use printquest::models::DisplayBlock;
use printquest::session::{GameSession, RunnerConfig, SessionRunner};
use printquest::sink::Sink;
use printquest::spool;

/// Outcome of one scripted step call
enum StepOutcome {
    Respond(String),
    Crash,
}

/// Shared state behind the scripted session
#[derive(Default)]
struct ScriptState {
    starts: usize,
    stepped: Vec<String>,
    saves: usize,
    terminated: bool,
    step_script: VecDeque<StepOutcome>,
    restore_results: VecDeque<bool>,
}

/// A scripted stand-in for the session controller
#[derive(Clone)]
struct ScriptedSession(Arc<Mutex<ScriptState>>);

impl ScriptedSession {
    fn new() -> (Self, Arc<Mutex<ScriptState>>) {
        let state = Arc::new(Mutex::new(ScriptState::default()));
        (Self(state.clone()), state)
    }
}

#[async_trait]
impl GameSession for ScriptedSession {
    async fn start(&mut self, _width: u16, _boot_command: Option<&str>) -> Result<String> {
        let mut state = self.0.lock().unwrap();
        state.starts += 1;
        Ok(format!("BANNER {}", state.starts))
    }

    async fn step(&mut self, command: &str) -> Result<String> {
        let mut state = self.0.lock().unwrap();
        state.stepped.push(command.to_string());
        match state.step_script.pop_front() {
            Some(StepOutcome::Respond(text)) => Ok(text),
            Some(StepOutcome::Crash) => Err(Error::ProcessTerminated),
            None => Ok(String::new()),
        }
    }

    async fn restore(&mut self) -> Result<bool> {
        let mut state = self.0.lock().unwrap();
        Ok(state.restore_results.pop_front().unwrap_or(false))
    }

    async fn save(&mut self) -> Result<()> {
        self.0.lock().unwrap().saves += 1;
        Ok(())
    }

    fn terminate(&mut self) {
        self.0.lock().unwrap().terminated = true;
    }
}

/// Collects emitted blocks for inspection
#[derive(Clone, Default)]
struct CollectingSink {
    blocks: Arc<Mutex<Vec<DisplayBlock>>>,
    lost: Arc<AtomicBool>,
}

impl Sink for CollectingSink {
    fn emit(&mut self, block: &DisplayBlock) -> Result<()> {
        self.blocks.lock().unwrap().push(block.clone());
        Ok(())
    }

    fn stream_lost(&mut self) {
        self.lost.store(true, Ordering::SeqCst);
    }
}

/// Rejects blocks that carry a command echo; collects the rest
#[derive(Clone, Default)]
struct EchoRejectingSink {
    blocks: Arc<Mutex<Vec<DisplayBlock>>>,
}

impl Sink for EchoRejectingSink {
    fn emit(&mut self, block: &DisplayBlock) -> Result<()> {
        if block.echo.is_some() {
            return Err(Error::SinkWriteFailed {
                reason: "echo rendering failed".to_string(),
            });
        }
        self.blocks.lock().unwrap().push(block.clone());
        Ok(())
    }

    fn stream_lost(&mut self) {}
}

/// Runner configuration with test-sized timeouts
fn test_config() -> RunnerConfig {
    RunnerConfig {
        text_width: 48,
        boot_command: None,
        timing: TimingConfig {
            startup_timeout_ms: 100,
            step_timeout_ms: 100,
            overwrite_confirm_ms: 10,
            pull_timeout_ms: 100,
            pacing_delay_ms: 1,
        },
        vocabulary: VocabularyConfig::default(),
    }
}

async fn run_to_completion<S: GameSession + 'static, K: Sink + 'static>(
    runner: SessionRunner<S, K>,
) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(5), runner.run())
        .await
        .expect("runner should terminate within the test window")
}

#[tokio::test]
async fn test_boot_emits_banner() {
    let (session, state) = ScriptedSession::new();
    let sink = CollectingSink::default();
    let (tx, spooler) = spool::channel(1);
    drop(tx);

    let runner = SessionRunner::new(
        session,
        spooler,
        sink.clone(),
        test_config(),
        CancellationToken::new(),
    );
    run_to_completion(runner).await.unwrap();

    let blocks = sink.blocks.lock().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].lines[0].text, "BANNER 1");
    assert!(blocks[0].echo.is_none());
    assert!(sink.lost.load(Ordering::SeqCst));
    assert!(state.lock().unwrap().terminated);
}

#[tokio::test]
async fn test_forbidden_commands_are_noops() {
    let (session, state) = ScriptedSession::new();
    let sink = CollectingSink::default();
    let (tx, spooler) = spool::channel(10);

    tx.submit("alice", "");
    tx.submit("bob", "save");
    tx.submit("carol", "restart");
    drop(tx);

    let runner = SessionRunner::new(
        session,
        spooler,
        sink.clone(),
        test_config(),
        CancellationToken::new(),
    );
    run_to_completion(runner).await.unwrap();

    let state = state.lock().unwrap();
    // Zero step calls and zero saves; the only emitted block is the banner
    assert!(state.stepped.is_empty());
    assert_eq!(state.saves, 0);
    assert_eq!(sink.blocks.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_accepted_command_is_stepped_emitted_and_saved() {
    let (session, state) = ScriptedSession::new();
    state.lock().unwrap().step_script.push_back(StepOutcome::Respond(
        "Opening the small mailbox reveals a leaflet.".to_string(),
    ));
    let sink = CollectingSink::default();
    let (tx, spooler) = spool::channel(10);

    tx.submit("grue_fan_42", "open mailbox");
    drop(tx);

    let runner = SessionRunner::new(
        session,
        spooler,
        sink.clone(),
        test_config(),
        CancellationToken::new(),
    );
    run_to_completion(runner).await.unwrap();

    {
        let state = state.lock().unwrap();
        assert_eq!(state.stepped, vec!["open mailbox"]);
        assert_eq!(state.saves, 1);
    }

    let blocks = sink.blocks.lock().unwrap();
    assert_eq!(blocks.len(), 2);
    let echo = blocks[1].echo.as_ref().expect("command block has an echo");
    assert_eq!(echo.author, "grue_fan_42");
    assert_eq!(echo.command, "open mailbox");
    assert!(blocks[1]
        .lines
        .iter()
        .any(|l| l.text.contains("leaflet")));
}

#[tokio::test]
async fn test_rejected_input_is_silent() {
    let (session, state) = ScriptedSession::new();
    state.lock().unwrap().step_script.push_back(StepOutcome::Respond(
        "I don't know the word \"frobnicate\".".to_string(),
    ));
    let sink = CollectingSink::default();
    let (tx, spooler) = spool::channel(10);

    tx.submit("alice", "frobnicate lamp");
    drop(tx);

    let runner = SessionRunner::new(
        session,
        spooler,
        sink.clone(),
        test_config(),
        CancellationToken::new(),
    );
    run_to_completion(runner).await.unwrap();

    let state = state.lock().unwrap();
    // The command reached the interpreter but nothing was displayed or saved
    assert_eq!(state.stepped, vec!["frobnicate lamp"]);
    assert_eq!(state.saves, 0);
    assert_eq!(sink.blocks.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_crash_restarts_and_rebooted_banner_is_next_output() {
    let (session, state) = ScriptedSession::new();
    state
        .lock()
        .unwrap()
        .step_script
        .push_back(StepOutcome::Crash);
    let sink = CollectingSink::default();
    let (tx, spooler) = spool::channel(10);

    tx.submit("alice", "go north");
    drop(tx);

    let runner = SessionRunner::new(
        session,
        spooler,
        sink.clone(),
        test_config(),
        CancellationToken::new(),
    );
    // The crash is absorbed, never surfaced as an error
    run_to_completion(runner).await.unwrap();

    {
        let state = state.lock().unwrap();
        assert_eq!(state.starts, 2);
        assert_eq!(state.stepped, vec!["go north"]);
    }

    let blocks = sink.blocks.lock().unwrap();
    // First boot banner, then the post-crash reboot banner
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].lines[0].text, "BANNER 1");
    assert_eq!(blocks[1].lines[0].text, "BANNER 2");
}

#[tokio::test]
async fn test_successful_restore_emits_auto_recovery_look() {
    let (session, state) = ScriptedSession::new();
    {
        let mut state = state.lock().unwrap();
        state.restore_results.push_back(true);
        state.step_script.push_back(StepOutcome::Respond(
            "West of House   Score: 0   Moves: 12\nYou are standing in an open field."
                .to_string(),
        ));
    }
    let sink = CollectingSink::default();
    let (tx, spooler) = spool::channel(10);
    drop(tx);

    let runner = SessionRunner::new(
        session,
        spooler,
        sink.clone(),
        test_config(),
        CancellationToken::new(),
    );
    run_to_completion(runner).await.unwrap();

    {
        let state = state.lock().unwrap();
        assert_eq!(state.stepped, vec!["look"]);
    }

    let blocks = sink.blocks.lock().unwrap();
    // The banner is replaced by the auto-recovery look
    assert_eq!(blocks.len(), 1);
    let echo = blocks[0].echo.as_ref().expect("recovery block has an echo");
    assert_eq!(echo.author, "[AUTO RECOVERY]");
    assert_eq!(echo.command, "look");
    assert!(blocks[0].lines.iter().any(|l| l.text.contains("open field")));
}

#[tokio::test]
async fn test_restore_after_crash_resumes_from_save() {
    let (session, state) = ScriptedSession::new();
    {
        let mut state = state.lock().unwrap();
        // First boot: no save yet. One command plays and autosaves, then a
        // crash; second boot restores and looks.
        state.restore_results.push_back(false);
        state.restore_results.push_back(true);
        state.step_script.push_back(StepOutcome::Respond(
            "Kitchen   Score: 10   Moves: 5\nYou are in the kitchen.".to_string(),
        ));
        state.step_script.push_back(StepOutcome::Crash);
        state.step_script.push_back(StepOutcome::Respond(
            "Kitchen   Score: 10   Moves: 5\nYou are in the kitchen.".to_string(),
        ));
    }
    let sink = CollectingSink::default();
    let (tx, spooler) = spool::channel(10);

    tx.submit("alice", "go east");
    tx.submit("bob", "open sack");
    drop(tx);

    let runner = SessionRunner::new(
        session,
        spooler,
        sink.clone(),
        test_config(),
        CancellationToken::new(),
    );
    run_to_completion(runner).await.unwrap();

    {
        let state = state.lock().unwrap();
        assert_eq!(state.starts, 2);
        assert_eq!(state.saves, 1);
        assert_eq!(state.stepped, vec!["go east", "open sack", "look"]);
    }

    let blocks = sink.blocks.lock().unwrap();
    // Banner, the accepted command, then the recovery look with the same
    // location header as the state at save time
    assert_eq!(blocks.len(), 3);
    let recovery = &blocks[2];
    assert_eq!(
        recovery.echo.as_ref().map(|e| e.author.as_str()),
        Some("[AUTO RECOVERY]")
    );
    assert!(recovery.lines[0].text.starts_with("Kitchen"));
}

#[tokio::test]
async fn test_sink_failure_substitutes_apology() {
    let (session, state) = ScriptedSession::new();
    state
        .lock()
        .unwrap()
        .step_script
        .push_back(StepOutcome::Respond("Taken.".to_string()));
    let sink = EchoRejectingSink::default();
    let (tx, spooler) = spool::channel(10);

    tx.submit("alice", "take lamp");
    drop(tx);

    let runner = SessionRunner::new(
        session,
        spooler,
        sink.clone(),
        test_config(),
        CancellationToken::new(),
    );
    run_to_completion(runner).await.unwrap();

    // The session kept going: the step happened and the autosave followed
    assert_eq!(state.lock().unwrap().saves, 1);

    let blocks = sink.blocks.lock().unwrap();
    // Banner plus the substituted apology block
    assert_eq!(blocks.len(), 2);
    assert!(blocks[1]
        .lines
        .iter()
        .any(|l| l.text.contains("could not be displayed")));
}

#[tokio::test]
async fn test_cancellation_terminates_promptly() {
    let (session, _state) = ScriptedSession::new();
    let sink = CollectingSink::default();
    let (_tx, spooler) = spool::channel(1);
    let shutdown = CancellationToken::new();

    let cancel = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let runner = SessionRunner::new(session, spooler, sink.clone(), test_config(), shutdown);
    run_to_completion(runner).await.unwrap();
    assert!(sink.lost.load(Ordering::SeqCst));
}
