// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier et produit des Ticks en l'absence de saisie
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching avec matches! et guards
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (permet de lire le résultat du prix sans saisie)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    /// Attente max avant de produire un Tick
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec le délai de Tick donné
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================
// Tous les caractères "normaux" vont dans le champ actif : les raccourcis
// utilisent donc des touches spéciales ou Ctrl.
// ============================================================================

fn has_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Échap : quitter (deux pressions)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Ctrl+C : quitter immédiatement
pub fn is_force_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        has_ctrl(key) && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    } else {
        false
    }
}

/// Tab ou flèche vers le bas : champ suivant
pub fn is_next_field_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Tab | KeyCode::Down)
    } else {
        false
    }
}

/// Shift+Tab ou flèche vers le haut : champ précédent
pub fn is_previous_field_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::BackTab | KeyCode::Up)
    } else {
        false
    }
}

/// Entrée : copier le champ actif
pub fn is_copy_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Enter)
    } else {
        false
    }
}

/// Ctrl+U : vider le champ actif
pub fn is_clear_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        has_ctrl(key) && matches!(key.code, KeyCode::Char('u') | KeyCode::Char('U'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Backspace)
    } else {
        false
    }
}

/// Extrait le caractère à saisir (sans Ctrl/Alt)
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
