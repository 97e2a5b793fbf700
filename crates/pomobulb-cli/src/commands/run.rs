use std::io::Write;
use std::path::Path;

use pomobulb_core::{
    Channels, DesktopChannel, DesktopNotifier, Event, NoOpBulb, NoOpDesktop, PhaseEngine,
    PhasePayloads, SmartBulbNotifier, WallClockTicker,
};
use tracing::{debug, info, warn};

use super::{load_config, CommandResult};

pub struct RunOptions {
    pub bulb: Option<String>,
    pub no_bulb: bool,
    pub pomodoro: Option<String>,
    pub theme: Option<String>,
    pub no_desktop_notification: bool,
    pub json: bool,
}

/// Resolve every profile, then run the timer until Ctrl-C.
pub fn run(config_path: Option<&Path>, opts: RunOptions) -> CommandResult {
    let config = load_config(config_path)?;
    let pomodoro = config.pomodoro(opts.pomodoro.as_deref())?.clone();

    let desktop: Box<dyn DesktopChannel> = if opts.no_desktop_notification {
        Box::new(NoOpDesktop)
    } else {
        Box::new(DesktopNotifier::new())
    };
    let channels = if opts.no_bulb {
        if let Some(name) = opts.theme.as_deref() {
            let theme = config.theme(Some(name))?;
            PhasePayloads::from_theme(theme)?;
            debug!(theme = %theme.name, "theme resolved with the bulb disabled");
        }
        Channels::new(Box::new(NoOpBulb), desktop)
    } else {
        let bulb = config.smart_bulb(opts.bulb.as_deref())?;
        let theme = config.theme(opts.theme.as_deref())?;
        let payloads = PhasePayloads::from_theme(theme)?;
        info!(bulb = %bulb.name, theme = %theme.name, "bulb enabled");
        Channels::new(Box::new(SmartBulbNotifier::new(bulb)?), desktop).with_payloads(payloads)
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let json = opts.json;
    let mut renderer = Renderer::new(std::io::stdout(), json);
    let mut engine = PhaseEngine::new(pomodoro, channels, WallClockTicker::default())
        .with_observer(move |event: &Event| renderer.render(event));

    let summary = runtime.block_on(engine.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }));

    info!(
        phase = %summary.phase,
        cycle = summary.position.cycle_index,
        pomodoro = summary.position.pomodoro_index,
        "stopped"
    );
    if !json {
        println!("\nPomodoro stopped.");
    }
    Ok(())
}

/// Writes engine events, either as a live countdown or as JSON lines.
/// Write failures are logged once and further output is dropped.
struct Renderer<W: Write> {
    out: W,
    json: bool,
    broken: bool,
}

impl<W: Write> Renderer<W> {
    fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            broken: false,
        }
    }

    fn render(&mut self, event: &Event) {
        if self.broken {
            return;
        }
        if let Err(e) = self.write(event) {
            warn!(error = %e, "cannot write to stdout; output disabled");
            self.broken = true;
        }
    }

    fn write(&mut self, event: &Event) -> std::io::Result<()> {
        let out = &mut self.out;
        if self.json {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
            return out.flush();
        }

        match event {
            Event::PhaseStarted {
                phase,
                duration_secs,
                ..
            } => writeln!(
                out,
                "{} {} ({} min)",
                phase.emoji(),
                phase.label(),
                duration_secs / 60
            )?,
            Event::Tick { phase, remaining } => {
                write!(out, "\r{} {} {remaining} ", phase.emoji(), phase.label())?;
            }
            Event::PhaseCompleted { .. } => writeln!(out)?,
            Event::Stopped { .. } => {}
        }
        out.flush()
    }
}
