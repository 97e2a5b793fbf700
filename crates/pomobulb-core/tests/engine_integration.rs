//! Integration tests for the phase-cycle engine.
//!
//! Channels record every call so the order of bulb and desktop signals can be
//! checked against the phase sequence.

use std::future::Future;
use std::sync::{Arc, Mutex};

use pomobulb_core::{
    BulbChannel, BulbError, Channels, DesktopChannel, DpsPayload, Event, NotifyError, Phase,
    PhaseEngine, PhasePayloads, PomodoroConfig, Ticker,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Apply(DpsPayload),
    TurnOff,
    Notify(String, String),
}

type Log = Arc<Mutex<Vec<Call>>>;

struct RecordingBulb(Log);

impl BulbChannel for RecordingBulb {
    fn name(&self) -> &str {
        "recording"
    }

    fn apply(&mut self, payload: &DpsPayload) -> Result<(), BulbError> {
        self.0.lock().unwrap().push(Call::Apply(payload.clone()));
        Ok(())
    }

    fn turn_off(&mut self) -> Result<(), BulbError> {
        self.0.lock().unwrap().push(Call::TurnOff);
        Ok(())
    }

    fn status(&mut self) -> Result<serde_json::Value, BulbError> {
        Ok(serde_json::json!({}))
    }
}

struct RecordingDesktop(Log);

impl DesktopChannel for RecordingDesktop {
    fn notify(&mut self, title: &str, message: &str) -> Result<(), NotifyError> {
        self.0
            .lock()
            .unwrap()
            .push(Call::Notify(title.to_string(), message.to_string()));
        Ok(())
    }
}

/// Yields instead of sleeping so a whole cycle runs instantly.
struct InstantTicker;

impl Ticker for InstantTicker {
    fn start(&mut self) {}

    async fn wait(&mut self) {
        tokio::task::yield_now().await;
    }
}

fn pomodoro(cycles: u32) -> PomodoroConfig {
    PomodoroConfig {
        name: "Test".into(),
        duration: 2,
        short_break: 1,
        long_break: 3,
        cycles_before_long_break: cycles,
    }
}

fn payloads() -> PhasePayloads {
    PhasePayloads {
        work: DpsPayload::new().with("20", true).with("21", "work"),
        short_break: DpsPayload::new().with("20", true).with("21", "short"),
        long_break: DpsPayload::new().with("20", true).with("21", "long"),
    }
}

fn recording_channels() -> (Log, Channels) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let channels = Channels::new(
        Box::new(RecordingBulb(Arc::clone(&log))),
        Box::new(RecordingDesktop(Arc::clone(&log))),
    )
    .with_payloads(payloads());
    (log, channels)
}

/// Resolves once `pred` holds for the recorded events.
fn when(
    events: Arc<Mutex<Vec<Event>>>,
    pred: impl Fn(&[Event]) -> bool,
) -> impl Future<Output = ()> {
    async move {
        while !pred(&events.lock().unwrap()) {
            tokio::task::yield_now().await;
        }
    }
}

fn completed(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::PhaseCompleted { .. }))
        .count()
}

fn engine_with_log(
    cycles: u32,
) -> (
    Log,
    Arc<Mutex<Vec<Event>>>,
    PhaseEngine<InstantTicker>,
) {
    let (log, channels) = recording_channels();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let engine = PhaseEngine::new(pomodoro(cycles), channels, InstantTicker)
        .with_observer(move |e: &Event| sink.lock().unwrap().push(e.clone()));
    (log, events, engine)
}

#[tokio::test]
async fn four_work_phases_lead_to_a_long_break() {
    let (log, events, mut engine) = engine_with_log(4);

    let summary = engine
        .run(when(Arc::clone(&events), |e| completed(e) >= 8))
        .await;

    let phases: Vec<(Phase, Phase)> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            Event::PhaseCompleted { phase, next, .. } => Some((*phase, *next)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (Phase::Work, Phase::ShortBreak),
            (Phase::ShortBreak, Phase::Work),
            (Phase::Work, Phase::ShortBreak),
            (Phase::ShortBreak, Phase::Work),
            (Phase::Work, Phase::ShortBreak),
            (Phase::ShortBreak, Phase::Work),
            (Phase::Work, Phase::LongBreak),
            (Phase::LongBreak, Phase::Work),
        ]
    );

    assert_eq!(summary.phase, Phase::Work);
    assert_eq!(summary.position.cycle_index, 0);
    assert_eq!(summary.position.pomodoro_index, 1);

    let log = log.lock().unwrap();
    assert_eq!(log.last(), Some(&Call::TurnOff));
    assert_eq!(log.iter().filter(|c| **c == Call::TurnOff).count(), 1);
    // Bulb first, then desktop, for every phase entered.
    let expected_bulb = [
        "work", "short", "work", "short", "work", "short", "work", "long",
    ];
    for (i, name) in expected_bulb.iter().enumerate() {
        match &log[i * 2] {
            Call::Apply(payload) => {
                assert_eq!(payload.get("21"), Some(&(*name).into()));
            }
            other => panic!("expected bulb call at {}, got {other:?}", i * 2),
        }
        assert!(matches!(&log[i * 2 + 1], Call::Notify(title, _) if title == "Pomodoro Timer"));
    }
}

#[tokio::test]
async fn long_break_position_is_reported_while_it_runs() {
    let (_log, events, mut engine) = engine_with_log(2);

    engine
        .run(when(Arc::clone(&events), |e| {
            e.iter()
                .any(|e| matches!(e, Event::PhaseStarted { phase: Phase::LongBreak, .. }))
        }))
        .await;

    let events = events.lock().unwrap();
    let started = events
        .iter()
        .find_map(|e| match e {
            Event::PhaseStarted {
                phase: Phase::LongBreak,
                cycle_index,
                pomodoro_index,
                duration_secs,
                ..
            } => Some((*cycle_index, *pomodoro_index, *duration_secs)),
            _ => None,
        })
        .unwrap();
    assert_eq!(started, (2, 0, 180));
}

#[tokio::test]
async fn interrupt_mid_countdown_leaves_position_untouched() {
    let (log, events, mut engine) = engine_with_log(4);

    let summary = engine
        .run(when(Arc::clone(&events), |e| {
            e.iter().filter(|e| matches!(e, Event::Tick { .. })).count() >= 30
        }))
        .await;

    assert_eq!(summary.phase, Phase::Work);
    assert_eq!(summary.position.cycle_index, 0);
    assert_eq!(summary.position.pomodoro_index, 0);

    let events = events.lock().unwrap();
    assert_eq!(completed(&events), 0);
    assert!(matches!(events.last(), Some(Event::Stopped { phase: Phase::Work, .. })));

    let log = log.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            Call::Apply(payloads().work),
            Call::Notify("Pomodoro Timer".into(), "🍅 Work session started!".into()),
            Call::TurnOff,
        ]
    );
}

#[tokio::test]
async fn disabled_bulb_skips_payloads_but_still_turns_off() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let channels = Channels::new(
        Box::new(RecordingBulb(Arc::clone(&log))),
        Box::new(RecordingDesktop(Arc::clone(&log))),
    );
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut engine = PhaseEngine::new(pomodoro(4), channels, InstantTicker)
        .with_observer(move |e: &Event| sink.lock().unwrap().push(e.clone()));

    engine
        .run(when(Arc::clone(&events), |e| completed(e) >= 1))
        .await;

    let log = log.lock().unwrap();
    assert!(log.iter().all(|c| !matches!(c, Call::Apply(_))));
    assert_eq!(log.iter().filter(|c| **c == Call::TurnOff).count(), 1);
}

#[tokio::test]
async fn silent_channels_run_the_same_cycle() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut engine = PhaseEngine::new(pomodoro(2), Channels::silent(), InstantTicker)
        .with_observer(move |e: &Event| sink.lock().unwrap().push(e.clone()));

    let summary = engine
        .run(when(Arc::clone(&events), |e| completed(e) >= 4))
        .await;

    assert_eq!(summary.phase, Phase::Work);
    assert_eq!(summary.position.pomodoro_index, 1);
    assert_eq!(summary.position.cycle_index, 0);
}

/// Records like [`RecordingBulb`] and fires `interrupt` on its first apply.
struct InterruptingBulb {
    log: Log,
    interrupt: Option<tokio::sync::oneshot::Sender<()>>,
}

impl BulbChannel for InterruptingBulb {
    fn name(&self) -> &str {
        "interrupting"
    }

    fn apply(&mut self, payload: &DpsPayload) -> Result<(), BulbError> {
        self.log.lock().unwrap().push(Call::Apply(payload.clone()));
        if let Some(tx) = self.interrupt.take() {
            let _ = tx.send(());
        }
        Ok(())
    }

    fn turn_off(&mut self) -> Result<(), BulbError> {
        self.log.lock().unwrap().push(Call::TurnOff);
        Ok(())
    }

    fn status(&mut self) -> Result<serde_json::Value, BulbError> {
        Ok(serde_json::json!({}))
    }
}

/// Fires `interrupt` on its first popup.
struct InterruptingDesktop {
    log: Log,
    interrupt: Option<tokio::sync::oneshot::Sender<()>>,
}

impl DesktopChannel for InterruptingDesktop {
    fn notify(&mut self, title: &str, message: &str) -> Result<(), NotifyError> {
        self.log
            .lock()
            .unwrap()
            .push(Call::Notify(title.to_string(), message.to_string()));
        if let Some(tx) = self.interrupt.take() {
            let _ = tx.send(());
        }
        Ok(())
    }
}

#[tokio::test]
async fn interrupt_during_bulb_update_skips_popup_and_countdown() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = tokio::sync::oneshot::channel();
    let channels = Channels::new(
        Box::new(InterruptingBulb {
            log: Arc::clone(&log),
            interrupt: Some(tx),
        }),
        Box::new(RecordingDesktop(Arc::clone(&log))),
    )
    .with_payloads(payloads());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut engine = PhaseEngine::new(pomodoro(4), channels, InstantTicker)
        .with_observer(move |e: &Event| sink.lock().unwrap().push(e.clone()));

    let summary = engine
        .run(async {
            let _ = rx.await;
        })
        .await;

    assert_eq!(summary.phase, Phase::Work);
    assert_eq!(
        *log.lock().unwrap(),
        vec![Call::Apply(payloads().work), Call::TurnOff]
    );
    let events = events.lock().unwrap();
    assert!(events.iter().all(|e| !matches!(e, Event::Tick { .. })));
    assert!(matches!(events.as_slice(), [Event::Stopped { .. }]));
}

#[tokio::test]
async fn interrupt_during_popup_skips_countdown() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = tokio::sync::oneshot::channel();
    let channels = Channels::new(
        Box::new(RecordingBulb(Arc::clone(&log))),
        Box::new(InterruptingDesktop {
            log: Arc::clone(&log),
            interrupt: Some(tx),
        }),
    )
    .with_payloads(payloads());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut engine = PhaseEngine::new(pomodoro(4), channels, InstantTicker)
        .with_observer(move |e: &Event| sink.lock().unwrap().push(e.clone()));

    engine
        .run(async {
            let _ = rx.await;
        })
        .await;

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 3);
    assert!(matches!(log[1], Call::Notify(..)));
    assert_eq!(log[2], Call::TurnOff);
    let events = events.lock().unwrap();
    assert!(events.iter().all(|e| !matches!(e, Event::Tick { .. })));
}
