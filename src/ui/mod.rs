// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod clipboard; // Copie via la séquence OSC 52
pub mod converter; // Rendu de l'écran du convertisseur
pub mod events;    // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use clipboard::copy_to_clipboard;
pub use converter::render;
pub use events::{Event, EventHandler};
