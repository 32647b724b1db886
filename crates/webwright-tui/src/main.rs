use anyhow::{Context, Result};
use clap::Parser;
use webwright_core::preview_server::open_in_browser;
use webwright_core::{
    logging, Config, GeminiClient, GenerationClient, PreviewRenderer, PreviewServer,
    SessionManager, Workbench,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "webwright", version)]
#[command(about = "Describe a website in a chat and get a single-file HTML page with a live preview")]
struct Cli {
    /// Gemini model to use (overrides the config file)
    #[arg(short, long)]
    model: Option<String>,

    /// Port for the local preview server, 0 picks a free one
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not start the local preview server
    #[arg(long)]
    no_serve: bool,

    /// Open the preview in the default browser on startup
    #[arg(long, conflicts_with = "no_serve")]
    open: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init().context("failed to initialize logging")?;

    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.model = Some(model);
    }
    if let Some(port) = cli.port {
        config.preview_port = Some(port);
    }

    let api_key = config.resolve_api_key();
    if api_key.is_none() {
        tracing::warn!("No API key found in GEMINI_API_KEY, API_KEY or the config file");
    }
    let backend = GeminiClient::with_base_url(api_key.as_deref().unwrap_or_default(), config.base_url());
    let sessions = SessionManager::new(config.session_settings());
    let workbench = Workbench::new(GenerationClient::new(backend, sessions));
    let renderer = PreviewRenderer::new(workbench.current_html(), workbench.device());

    let preview_url = if cli.no_serve {
        None
    } else {
        start_preview_server(&config, &renderer).await
    };
    if cli.open {
        if let Some(url) = &preview_url {
            open_in_browser(url);
        }
    }

    let mut app = App::new(workbench, renderer, preview_url, api_key.is_some());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    tui::restore()?;
    tracing::info!("Webwright exiting");
    result
}

/// Serve the preview in the background. A busy port is not fatal; the
/// workbench still runs with the code view.
async fn start_preview_server(config: &Config, renderer: &PreviewRenderer) -> Option<String> {
    let server = match PreviewServer::bind(config.preview_port()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Preview server unavailable on port {}: {}", config.preview_port(), e);
            return None;
        }
    };
    let url = match server.url() {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Preview server has no address: {}", e);
            return None;
        }
    };

    let frames = renderer.subscribe();
    tokio::spawn(async move {
        if let Err(e) = server.serve(frames).await {
            tracing::error!("Preview server stopped: {}", e);
        }
    });
    Some(url)
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
