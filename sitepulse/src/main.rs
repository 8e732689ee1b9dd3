//! Entry point for the sitepulse TUI. Parses args, bootstraps a session and runs the App.

use std::env;
use tokio::sync::mpsc;
use tracing::{info, warn};
use url::Url;

use sitepulse::app::App;
use sitepulse::scheduler::PollScheduler;
use sitepulse::transport::{bootstrap, http_client, FallbackTransport, HttpTransport, Transport};
use sitepulse::types::Settings;
use sitepulse::ws::{ws_url, WsTransport};

const DEFAULT_URL: &str = "http://127.0.0.1:3000";

struct ParsedArgs {
    url: Option<String>,
    token: Option<String>,
}

fn usage(prog: &str) -> String {
    format!("Usage: {prog} [--token TOKEN|-t TOKEN] [http://HOST:PORT]")
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "sitepulse".into());
    let mut url: Option<String> = None;
    let mut token: Option<String> = None;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--token" | "-t" => {
                token = it.next();
            }
            _ if arg.starts_with("--token=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        token = Some(v.to_string());
                    }
                }
            }
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
            }
        }
    }
    Ok(ParsedArgs { url, token })
}

// The TUI owns the terminal, so logs only go to a file when asked for.
fn init_logging() {
    let Some(path) = env::var_os("SITEPULSE_LOG") else {
        return;
    };
    match std::fs::File::create(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sitepulse=debug")),
                )
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        Err(e) => eprintln!("cannot open log file {}: {e}", path.to_string_lossy()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };
    init_logging();

    let raw = parsed
        .url
        .or_else(|| env::var("SITEPULSE_URL").ok())
        .unwrap_or_else(|| DEFAULT_URL.into());
    let base = Url::parse(&raw)?;
    let token = parsed
        .token
        .or_else(|| env::var("SITEPULSE_TOKEN").ok())
        .filter(|t| !t.is_empty());

    let client = http_client()?;
    let (nonce, settings) = match bootstrap(&client, &base, token.as_deref()).await {
        Ok(s) => (Some(s.nonce), s.settings),
        Err(e) => {
            warn!("session bootstrap failed, using default settings: {e}");
            (None, Settings::default())
        }
    };
    info!(url = %base, refresh = settings.refresh_interval_s, "starting dashboard");

    let primary: Box<dyn Transport> = Box::new(HttpTransport::new(client, &base, token)?);
    let secondary: Option<Box<dyn Transport>> = match nonce {
        Some(n) => Some(Box::new(WsTransport::new(ws_url(&base, &n)?))),
        None => None,
    };
    let scheduler = PollScheduler::new(
        FallbackTransport::new(primary, secondary),
        settings.refresh_interval_s,
    );

    let (tx, rx) = mpsc::channel(16);
    let poller = scheduler.spawn(tx);
    let mut app = App::new(settings, rx);
    let res = app.run().await;
    poller.abort();
    res
}
