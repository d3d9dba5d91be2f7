// ============================================================================
// Presse-papier via OSC 52
// ============================================================================
// Le terminal gère lui-même le presse-papier quand on lui envoie :
//
//   ESC ] 52 ; c ; <texte en base64> BEL
//
// Fonctionne en local comme en SSH, sans dépendre d'un serveur X/Wayland.
// Les terminaux qui ne supportent pas OSC 52 ignorent la séquence.
// ============================================================================

use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crossterm::{execute, Command};

/// Commande crossterm qui place un texte dans le presse-papier
///
/// CONCEPT RUST : Implémenter un trait externe
/// - crossterm::Command décrit une séquence ANSI
/// - execute!() l'écrit puis flush le writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyToClipboard(pub String);

impl Command for CopyToClipboard {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1b]52;c;{}\x07", STANDARD.encode(&self.0))
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        // Pas d'équivalent WinAPI : seule la séquence ANSI est supportée
        Ok(())
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}

/// Copie `text` dans le presse-papier du terminal
pub fn copy_to_clipboard<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    execute!(writer, CopyToClipboard(text.to_string()))
        .context("Failed to write clipboard sequence")
}
