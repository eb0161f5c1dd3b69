use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use causerie::api::OllamaBackend;
use causerie::commands::CommandProcessor;
use causerie::core::app::App;
use causerie::core::config::Config;
use causerie::core::scrollback::EntryKind;
use causerie::link::{ReceiveLink, SendLink};
use causerie::ui;
use causerie::utils::notify::{BuzzerNotifier, NoopNotifier, Notifier};

#[derive(Parser)]
#[command(name = "causerie")]
#[command(about = "A terminal chat client for the causerie relay")]
#[command(long_about = "Causerie is a full-screen terminal chat client. Every message you send \
is fanned out by the relay to all connected participants; the link to the relay reconnects \
automatically and typing is never blocked by network state.\n\n\
Environment Variables:\n\
  CAUSERIE_USERNAME  Display identity (overrides the config file)\n\
  CAUSERIE_LOG       Append tracing output to this file\n\n\
Controls:\n\
  Type               Enter your message in the input line\n\
  Enter              Send the message\n\
  Up/Down            Scroll through history (Down to the tail resumes follow)\n\
  Ctrl+C             Quit")]
struct Args {
    #[arg(long, help = "Relay websocket URL (overrides the config file)")]
    relay_url: Option<String>,

    #[arg(short, long, help = "Display identity (overrides the config file)")]
    username: Option<String>,

    #[arg(long, help = "Path to an alternate config file")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    causerie::logging::init_client()?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let relay_url = args.relay_url.clone().unwrap_or_else(|| config.relay_url());
    let identity = args.username.clone().unwrap_or_else(|| config.username());

    let app = Arc::new(Mutex::new(App::new(identity.clone())));
    app.lock()
        .await
        .notice("Press Enter to send, Backspace to edit");

    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<String>();
    let (send_tx, send_rx) = mpsc::unbounded_channel::<String>();
    let cancel = CancellationToken::new();

    let primary = Arc::new(OllamaBackend::new(
        &config.generation.primary.base_url,
        &config.generation.primary.model,
    ));
    let fallback = Arc::new(OllamaBackend::new(
        &config.generation.fallback.base_url,
        &config.generation.fallback.model,
    ));
    let notifier: Arc<dyn Notifier> = if config.notify_on_receive {
        Arc::new(BuzzerNotifier)
    } else {
        Arc::new(NoopNotifier)
    };

    let receive = ReceiveLink::new(
        relay_url.clone(),
        identity.clone(),
        Arc::clone(&app),
        notifier,
        config.notify_on_receive,
    );
    tokio::spawn(receive.run(cancel.child_token()));

    let send = SendLink::new(relay_url.clone(), identity.clone(), Arc::clone(&app));
    tokio::spawn(send.run(send_tx.clone(), send_rx, cancel.child_token()));

    let processor = CommandProcessor::new(
        identity,
        primary,
        fallback,
        Arc::clone(&app),
        send_tx.clone(),
    );
    tokio::spawn(processor.run(raw_rx, cancel.child_token()));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &app, &raw_tx).await;

    cancel.cancel();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &Arc<Mutex<App>>,
    raw_tx: &mpsc::UnboundedSender<String>,
) -> Result<(), Box<dyn Error>> {
    loop {
        {
            let mut app_guard = app.lock().await;
            if app_guard.take_dirty() {
                // A transient rendering fault never terminates the session.
                if let Err(err) = terminal.draw(|frame| ui::draw(frame, &app_guard)) {
                    tracing::debug!("draw failed: {err}");
                }
            }
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(());
                }
                KeyCode::Enter => {
                    let mut app_guard = app.lock().await;
                    let text = app_guard.input.trim().to_string();
                    app_guard.input.clear();
                    app_guard.mark_dirty();
                    if !text.is_empty() {
                        // Plain submissions echo immediately; command output
                        // is mirrored only after generation completes.
                        if !text.starts_with('/') {
                            let line = format!("{}: {}", app_guard.identity, text);
                            app_guard.append(EntryKind::Own, line);
                        }
                        let _ = raw_tx.send(text);
                    }
                }
                KeyCode::Backspace => {
                    let mut app_guard = app.lock().await;
                    app_guard.input.pop();
                    app_guard.mark_dirty();
                }
                KeyCode::Up => {
                    let height = terminal.size().unwrap_or_default().height;
                    let mut app_guard = app.lock().await;
                    app_guard.scroll_up(ui::viewport_height(height));
                }
                KeyCode::Down => {
                    let mut app_guard = app.lock().await;
                    app_guard.scroll_down();
                }
                KeyCode::Char(c) => {
                    let mut app_guard = app.lock().await;
                    app_guard.input.push(c);
                    app_guard.mark_dirty();
                }
                _ => {}
            },
            Event::Resize(_, _) => {
                app.lock().await.mark_dirty();
            }
            _ => {}
        }
    }
}
