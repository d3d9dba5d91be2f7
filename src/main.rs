// ============================================================================
// solconv - Convertisseur SOL / Lamports / USD
// ============================================================================
// Programme TUI : trois champs synchronisés (SOL, Lamports, USD) et un prix
// SOL/USD récupéré une fois au démarrage depuis l'API Jupiter.
//
// Déroulement :
// 1. Logging vers fichier (stdout appartient au TUI)
// 2. Lancement de la récupération du prix en arrière-plan
// 3. Boucle : prix reçu ? → dessin → événement → mise à jour
// 4. Restauration du terminal, même en cas d'erreur
// ============================================================================

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use solconv::api::{spawn_price_fetch, PriceClient, PriceFetchHandle};
use solconv::app::App;
use solconv::config::Config;
use solconv::models::PriceUpdate;
use solconv::ui::{copy_to_clipboard, render, Event, EventHandler};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

// ============================================================================
// Initialisation du logging
// ============================================================================

/// Initialise le logging vers un fichier à rotation quotidienne
///
/// ```bash
/// tail -f ~/.local/share/solconv/logs/solconv.log.*
/// RUST_LOG=solconv=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = &config.log_dir;
    std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "solconv.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Le prix arrive d'un autre thread
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solconv=debug,info".into()),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::default();

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("Warning: failed to initialize logging: {:#}", e);
        eprintln!("Continuing without logging...");
    });

    info!("solconv starting up");

    let mut app = App::new();

    // Une seule récupération par exécution. Si le client ne peut pas être
    // construit, on reste sur le prix de repli.
    let price_fetch = if app.start_price_fetch() {
        match PriceClient::new(config.price.clone()) {
            Ok(client) => Some(spawn_price_fetch(client)),
            Err(e) => {
                error!(error = ?e, "Error fetching Solana price");
                app.apply_price_update(PriceUpdate::failed(format!("{:#}", e)));
                None
            }
        }
    } else {
        None
    };

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new(config.tick_rate);

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, price_fetch.as_ref());

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================

/// Exécute la boucle principale jusqu'à ce que l'utilisateur quitte
///
/// `price_fetch` est le seul lien avec le thread de fond : quand la boucle
/// se termine, il est droppé et un prix tardif est ignoré.
fn run(
    terminal: &mut Tui,
    app: &mut App,
    events: &EventHandler,
    price_fetch: Option<&PriceFetchHandle>,
) -> Result<()> {
    while app.is_running() {
        // 0. PRIX : applique le résultat s'il est arrivé
        if let Some(update) = price_fetch.and_then(PriceFetchHandle::try_take) {
            app.apply_price_update(update);
        }

        // 1. RENDER
        terminal.draw(|frame| render(frame, &*app))?;

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(terminal, app, event)?,
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// Les caractères vont dans le champ actif : les raccourcis utilisent
/// Échap, Tab, Entrée et Ctrl.
fn handle_event(terminal: &mut Tui, app: &mut App, event: Event) -> Result<()> {
    use solconv::ui::events::{
        get_char_from_event, is_backspace_event, is_clear_event, is_copy_event,
        is_force_quit_event, is_next_field_event, is_previous_field_event, is_quit_event,
    };

    if matches!(event, Event::Tick) {
        return Ok(());
    }

    // Échap : quit en deux temps
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return Ok(());
    }

    // Toute autre touche annule la confirmation
    app.cancel_quit();

    if is_force_quit_event(&event) {
        info!("User forced quit");
        app.quit();
    } else if is_next_field_event(&event) {
        app.focus_next();
    } else if is_previous_field_event(&event) {
        app.focus_previous();
    } else if is_copy_event(&event) {
        let text = app.copy_focused();
        if let Err(e) = copy_to_clipboard(terminal.backend_mut(), &text) {
            error!(error = ?e, "Failed to copy to clipboard");
            app.status_message = Some("Copy failed".to_string());
        }
    } else if is_clear_event(&event) {
        app.clear_field();
    } else if is_backspace_event(&event) {
        app.backspace();
    } else if let Some(c) = get_char_from_event(&event) {
        debug!(key = %c, field = app.focused.unit(), "User typed");
        app.type_char(c);
    }

    Ok(())
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
