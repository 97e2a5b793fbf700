use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "pomobulb",
    version,
    about = "Pomodoro timer that signals phases with a desktop popup and a smart bulb"
)]
struct Cli {
    /// Smart bulb to drive (default: first configured bulb)
    #[arg(short = 'b', long, value_name = "NAME", conflicts_with = "no_bulb")]
    bulb: Option<String>,

    /// Run without touching any bulb
    #[arg(short = 'B', long)]
    no_bulb: bool,

    /// Pomodoro profile (default: first configured profile)
    #[arg(short = 'p', long, value_name = "NAME")]
    pomodoro: Option<String>,

    /// Color theme (default: first configured theme)
    #[arg(short = 't', long, value_name = "NAME")]
    theme: Option<String>,

    /// Disable desktop popups
    #[arg(short = 'N', long)]
    no_desktop_notification: bool,

    /// Print the status of a bulb as JSON and exit
    #[arg(
        short = 's',
        long,
        value_name = "BULB",
        conflicts_with_all = ["pomodoro", "theme", "no_desktop_notification"]
    )]
    status: Option<String>,

    /// Configuration file (YAML, JSON or TOML)
    #[arg(short = 'c', long, value_name = "PATH", env = "POMOBULB_CONFIG")]
    config: Option<PathBuf>,

    /// Print engine events as JSON lines instead of the countdown
    #[arg(long)]
    json: bool,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.status {
        Some(bulb) => commands::status::run(config, &bulb),
        None => commands::run::run(
            config,
            commands::run::RunOptions {
                bulb: cli.bulb,
                no_bulb: cli.no_bulb,
                pomodoro: cli.pomodoro,
                theme: cli.theme,
                no_desktop_notification: cli.no_desktop_notification,
                json: cli.json,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
