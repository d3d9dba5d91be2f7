// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état de l'application TUI
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Un seul propriétaire : la boucle principale (pas de Mutex)
//
// App ajoute au Converter ce qui relève de l'interface : le champ qui a le
// focus, le texte affiché dans chaque champ, la ligne de statut, le quit.
// ============================================================================

use tracing::{debug, info};

use crate::models::{
    format_amount, is_partial_amount, parse_amount, AmountTriple, ConversionRate, Converter, Field, PriceState,
    PriceUpdate,
};

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Première pression sur Échap faite, en attente de confirmation
    pub confirm_quit: bool,

    /// Champ qui reçoit la saisie
    pub focused: Field,

    /// Message de statut (copie, prix reçu, etc.)
    pub status_message: Option<String>,

    /// Taux, montants et état du prix
    converter: Converter,

    /// Texte affiché dans chaque champ, indexé par Field::index()
    ///
    /// Le champ en cours d'édition garde le texte tapé ("0." reste "0.") ;
    /// les deux autres sont réécrits à partir du triplet.
    inputs: [String; 3],
}

impl App {
    /// Crée l'application au taux de repli, montants à zéro
    pub fn new() -> Self {
        Self::with_converter(Converter::new())
    }

    /// Crée l'application avec un taux initial donné
    pub fn with_rate(rate: ConversionRate) -> Self {
        Self::with_converter(Converter::with_rate(rate))
    }

    fn with_converter(converter: Converter) -> Self {
        let amounts = converter.amounts();
        Self {
            running: true,
            confirm_quit: false,
            focused: Field::Sol,
            status_message: None,
            inputs: Field::ALL.map(|field| format_amount(amounts.get(field))),
            converter,
        }
    }

    // ========================================================================
    // Lecture de l'état
    // ========================================================================

    /// Texte affiché dans un champ
    pub fn display(&self, field: Field) -> &str {
        &self.inputs[field.index()]
    }

    /// Montants courants
    pub fn amounts(&self) -> AmountTriple {
        self.converter.amounts()
    }

    /// Taux courant (USD pour 1 SOL)
    pub fn rate(&self) -> ConversionRate {
        self.converter.rate()
    }

    /// État de la récupération du prix
    pub fn price_state(&self) -> &PriceState {
        self.converter.price_state()
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Édition des champs
    // ========================================================================

    /// Ajoute un caractère au champ actif
    pub fn type_char(&mut self, c: char) {
        self.inputs[self.focused.index()].push(c);
        self.commit_focused();
    }

    /// Supprime le dernier caractère du champ actif
    pub fn backspace(&mut self) {
        self.inputs[self.focused.index()].pop();
        self.commit_focused();
    }

    /// Vide le champ actif (équivaut à 0)
    pub fn clear_field(&mut self) {
        self.inputs[self.focused.index()].clear();
        self.commit_focused();
    }

    /// Remplace le texte d'un champ, comme si l'utilisateur l'avait tapé
    pub fn set_field(&mut self, field: Field, text: &str) {
        self.focus(field);
        self.inputs[field.index()] = text.to_string();
        self.commit_focused();
    }

    /// Parse le champ actif et réécrit les deux autres
    fn commit_focused(&mut self) {
        let field = self.focused;
        let value = parse_amount(&self.inputs[field.index()]);
        let amounts = self.converter.edit(field, value);

        // Un nombre en cours de saisie ("0.", "1e") reste tel quel ;
        // un texte invalide ("abc", "inf") s'affiche "NaN" tout de suite
        if value.is_nan() && !is_partial_amount(&self.inputs[field.index()]) {
            self.inputs[field.index()] = format_amount(value);
        }

        for other in Field::ALL {
            if other != field {
                self.inputs[other.index()] = format_amount(amounts.get(other));
            }
        }
        self.status_message = None;
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Donne le focus à un champ
    ///
    /// Le champ quitté est normalisé : "abc" devient "NaN", "" devient "0"
    pub fn focus(&mut self, field: Field) {
        if field == self.focused {
            return;
        }
        let left = self.focused;
        self.inputs[left.index()] = format_amount(self.converter.amounts().get(left));
        self.focused = field;
        debug!(from = left.unit(), to = field.unit(), "Focus changed");
    }

    /// Champ suivant (Tab, ↓)
    pub fn focus_next(&mut self) {
        self.focus(self.focused.next());
    }

    /// Champ précédent (Shift+Tab, ↑)
    pub fn focus_previous(&mut self) {
        self.focus(self.focused.previous());
    }

    // ========================================================================
    // Presse-papier
    // ========================================================================

    /// Retourne le texte du champ actif à copier
    pub fn copy_focused(&mut self) -> String {
        let text = self.display(self.focused).to_string();
        info!(field = self.focused.unit(), value = %text, "Copying field to clipboard");
        self.status_message = Some(format!("Copied {} {}", text, self.focused.unit()));
        text
    }

    // ========================================================================
    // Prix
    // ========================================================================

    /// Marque le début de la récupération du prix
    ///
    /// Retourne false si elle a déjà été lancée
    pub fn start_price_fetch(&mut self) -> bool {
        let started = self.converter.begin_price_fetch();
        if started {
            self.status_message = Some("Fetching SOL price...".to_string());
        }
        started
    }

    /// Applique le résultat de la récupération
    ///
    /// Les montants affichés ne changent pas ; seules les saisies suivantes
    /// utilisent le nouveau taux.
    pub fn apply_price_update(&mut self, update: PriceUpdate) {
        self.converter.apply_price_update(update);
        self.status_message = match self.converter.price_state() {
            PriceState::Fetched { .. } => None,
            PriceState::FetchFailed { .. } => Some("Using fallback price".to_string()),
            _ => self.status_message.take(),
        };
    }

    // ========================================================================
    // Quit
    // ========================================================================

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Demande la confirmation de quitter (première pression sur Échap)
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert_eq!(app.focused, Field::Sol);
        assert_eq!(app.rate().usd_per_sol(), 240.0);
        for field in Field::ALL {
            assert_eq!(app.display(field), "0");
        }
    }

    #[test]
    fn test_edit_sol() {
        let mut app = App::new();
        app.set_field(Field::Sol, "2");
        assert_eq!(app.display(Field::Sol), "2");
        assert_eq!(app.display(Field::Lamports), "2000000000");
        assert_eq!(app.display(Field::Usd), "480");
    }

    #[test]
    fn test_edit_lamports() {
        let mut app = App::new();
        app.set_field(Field::Lamports, "1000000000");
        assert_eq!(app.display(Field::Sol), "1");
        assert_eq!(app.display(Field::Usd), "240");
    }

    #[test]
    fn test_edit_usd_after_fetch() {
        let mut app = App::new();
        assert!(app.start_price_fetch());
        app.apply_price_update(PriceUpdate::fetched_now(300.0));

        app.set_field(Field::Usd, "30");
        assert_eq!(app.display(Field::Sol), "0.1");
        assert_eq!(app.display(Field::Lamports), "100000000");
    }

    #[test]
    fn test_non_numeric_input() {
        let mut app = App::new();
        app.set_field(Field::Sol, "abc");
        assert_eq!(app.display(Field::Sol), "NaN");
        assert_eq!(app.display(Field::Lamports), "NaN");
        assert_eq!(app.display(Field::Usd), "NaN");
        assert!(app.amounts().sol.is_nan());

        // Le champ actif affiche déjà "NaN" : c'est ce qui est copié
        assert_eq!(app.focused, Field::Sol);
        assert_eq!(app.copy_focused(), "NaN");

        app.focus_next();
        assert_eq!(app.display(Field::Sol), "NaN");
    }

    #[test]
    fn test_typed_letters_become_nan() {
        let mut app = App::new();
        app.clear_field();
        app.type_char('a');
        assert_eq!(app.display(Field::Sol), "NaN");

        app.set_field(Field::Usd, "inf");
        assert_eq!(app.display(Field::Usd), "NaN");
        assert_eq!(app.display(Field::Sol), "NaN");
        assert_eq!(app.display(Field::Lamports), "NaN");
    }

    #[test]
    fn test_partial_numbers_stay_as_typed() {
        let mut app = App::new();
        for text in ["-", "0.", "1e", "2.5e-"] {
            app.set_field(Field::Lamports, text);
            assert_eq!(app.display(Field::Lamports), text);
        }

        // Quitter le champ normalise la saisie incomplète
        app.focus_next();
        assert_eq!(app.display(Field::Lamports), "NaN");
    }

    #[test]
    fn test_typing_keeps_partial_input() {
        let mut app = App::new();
        app.clear_field();
        for c in "0.5".chars() {
            app.type_char(c);
        }
        assert_eq!(app.display(Field::Sol), "0.5");
        assert_eq!(app.display(Field::Usd), "120");

        app.backspace();
        assert_eq!(app.display(Field::Sol), "0.");
        assert_eq!(app.display(Field::Lamports), "0");

        app.clear_field();
        assert_eq!(app.display(Field::Sol), "");
        assert_eq!(app.amounts(), AmountTriple::default());
    }

    #[test]
    fn test_focus_cycle() {
        let mut app = App::new();
        app.focus_next();
        assert_eq!(app.focused, Field::Lamports);
        app.focus_next();
        assert_eq!(app.focused, Field::Usd);
        app.focus_next();
        assert_eq!(app.focused, Field::Sol);
        app.focus_previous();
        assert_eq!(app.focused, Field::Usd);
    }

    #[test]
    fn test_copy_focused() {
        let mut app = App::new();
        app.set_field(Field::Sol, "2");
        app.focus(Field::Lamports);
        assert_eq!(app.copy_focused(), "2000000000");
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_price_update_does_not_recompute_display() {
        let mut app = App::new();
        app.set_field(Field::Sol, "1");
        app.start_price_fetch();
        app.apply_price_update(PriceUpdate::fetched_now(300.0));

        assert_eq!(app.display(Field::Usd), "240");
        assert_eq!(app.rate().usd_per_sol(), 300.0);
    }

    #[test]
    fn test_failed_fetch_keeps_fallback() {
        let mut app = App::new();
        app.start_price_fetch();
        app.apply_price_update(PriceUpdate::failed("HTTP error 500: Internal Server Error"));

        assert_eq!(app.rate(), ConversionRate::FALLBACK);
        assert_eq!(app.price_state().source_label(), "fallback");
        assert_eq!(app.status_message.as_deref(), Some("Using fallback price"));
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }
}
