// ============================================================================
// Conversion SOL / Lamports / USD
// ============================================================================
// Trois montants liés par deux relations fixes :
//   lamports = sol × 10^9
//   usd      = sol × taux
//
// Le dernier champ édité fait foi : les deux autres sont recalculés à partir
// de lui, en une seule fois (recompute est une fonction pure).
//
// CONCEPTS RUST :
// 1. Newtype : ConversionRate enveloppe un f64 qui ne peut pas être ≤ 0
// 2. Fonctions pures : recompute ne dépend que de ses arguments
// 3. f64 et NaN : une saisie invalide se propage sans erreur
// ============================================================================

use tracing::{debug, info, warn};

use crate::models::price::{PriceState, PriceUpdate};

/// Nombre de lamports dans 1 SOL
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Prix de repli (USD pour 1 SOL) tant qu'aucune cotation n'a réussi
pub const FALLBACK_USD_PER_SOL: f64 = 240.0;

// ============================================================================
// Enum : Field
// ============================================================================

/// Les trois champs de saisie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Sol,
    Lamports,
    Usd,
}

impl Field {
    /// Ordre d'affichage (et de navigation avec Tab)
    pub const ALL: [Field; 3] = [Field::Sol, Field::Lamports, Field::Usd];

    /// Libellé du champ
    pub fn label(&self) -> &'static str {
        match self {
            Field::Sol => "Solana Amount",
            Field::Lamports => "Lamports Amount",
            Field::Usd => "USD Amount",
        }
    }

    /// Unité courte (pour les logs et la ligne de statut)
    pub fn unit(&self) -> &'static str {
        match self {
            Field::Sol => "SOL",
            Field::Lamports => "Lamports",
            Field::Usd => "USD",
        }
    }

    /// Position dans Field::ALL
    pub fn index(&self) -> usize {
        match self {
            Field::Sol => 0,
            Field::Lamports => 1,
            Field::Usd => 2,
        }
    }

    /// Champ suivant (cycle : Sol → Lamports → Usd → Sol)
    pub fn next(&self) -> Self {
        match self {
            Field::Sol => Field::Lamports,
            Field::Lamports => Field::Usd,
            Field::Usd => Field::Sol,
        }
    }

    /// Champ précédent (cycle inverse)
    pub fn previous(&self) -> Self {
        match self {
            Field::Sol => Field::Usd,
            Field::Lamports => Field::Sol,
            Field::Usd => Field::Lamports,
        }
    }
}

// ============================================================================
// Newtype : ConversionRate
// ============================================================================
// CONCEPT RUST : Newtype pattern
// - Un f64 "brut" pourrait valoir 0, -3 ou NaN
// - ConversionRate::new() refuse ces valeurs
// - Une fois construit, le taux est toujours utilisable comme diviseur
// ============================================================================

/// Taux de conversion : USD pour 1 SOL (toujours fini et > 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRate(f64);

impl ConversionRate {
    /// Taux de repli (240 USD/SOL)
    pub const FALLBACK: ConversionRate = ConversionRate(FALLBACK_USD_PER_SOL);

    /// Crée un taux si la valeur est finie et strictement positive
    pub fn new(usd_per_sol: f64) -> Option<Self> {
        if usd_per_sol.is_finite() && usd_per_sol > 0.0 {
            Some(Self(usd_per_sol))
        } else {
            None
        }
    }

    /// Valeur brute du taux
    pub fn usd_per_sol(&self) -> f64 {
        self.0
    }
}

impl Default for ConversionRate {
    fn default() -> Self {
        Self::FALLBACK
    }
}

// ============================================================================
// Structure : AmountTriple
// ============================================================================

/// Les trois montants affichés
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AmountTriple {
    pub sol: f64,
    pub lamports: f64,
    pub usd: f64,
}

impl AmountTriple {
    /// Montant d'un champ donné
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Sol => self.sol,
            Field::Lamports => self.lamports,
            Field::Usd => self.usd,
        }
    }
}

/// Recalcule le triplet à partir du champ édité
///
/// CONCEPT : Fonction pure
/// - Aucun état caché : même entrée, même sortie
/// - Le triplet est produit d'un bloc, jamais à moitié mis à jour
pub fn recompute(edited: Field, value: f64, rate: ConversionRate) -> AmountTriple {
    let rate = rate.usd_per_sol();

    match edited {
        Field::Sol => AmountTriple {
            sol: value,
            lamports: value * LAMPORTS_PER_SOL,
            usd: value * rate,
        },
        Field::Lamports => {
            let sol = value / LAMPORTS_PER_SOL;
            AmountTriple {
                sol,
                lamports: value,
                usd: sol * rate,
            }
        }
        Field::Usd => {
            let sol = value / rate;
            AmountTriple {
                sol,
                lamports: sol * LAMPORTS_PER_SOL,
                usd: value,
            }
        }
    }
}

// ============================================================================
// Parsing et formatage des montants
// ============================================================================

/// Convertit le texte d'un champ en nombre
///
/// - Espaces ignorés
/// - Champ vide → 0
/// - Texte non numérique → NaN (pas d'erreur, NaN se propage)
/// - "Infinity" (signe optionnel) est la seule écriture de l'infini
pub fn parse_amount(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    // f64::from_str accepte "inf", "nan"... : seul l'exposant est une lettre
    if unsigned
        .chars()
        .any(|c| c.is_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Vrai si le texte est un nombre en cours de saisie ("", "-", "0.", "1e-")
///
/// Ces formes restent affichées telles quelles dans le champ actif ; tout
/// autre texte invalide est remplacé par "NaN".
pub fn is_partial_amount(text: &str) -> bool {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };

    let mantissa_ok = mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
        && mantissa.matches('.').count() <= 1;

    let exponent_ok = match exponent {
        None => true,
        Some(exponent) => {
            let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            mantissa.chars().any(|c| c.is_ascii_digit()) && digits.chars().all(|c| c.is_ascii_digit())
        }
    };

    mantissa_ok && exponent_ok
}

/// Formate un montant pour un champ de saisie
///
/// Décimal simple, sans séparateur ni exposant : 2000000000, 0.1, NaN
///
/// Jamais de notation scientifique : 1 lamport donne "0.000000001" et non
/// "1e-9", pour que la valeur copiée se relise telle quelle.
pub fn format_amount(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if value == 0.0 {
        // Couvre aussi -0.0
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Formate un montant pour la ligne de résumé
///
/// Séparateur de milliers ",", au plus `max_fraction_digits` décimales,
/// zéros finaux supprimés : 1,000,000,000 ou 240.1235
pub fn format_grouped(value: f64, max_fraction_digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = format!("{:.*}", max_fraction_digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }

    let rounds_to_zero = frac_part.is_empty() && int_part.bytes().all(|b| b == b'0');
    if value < 0.0 && !rounds_to_zero {
        out.insert(0, '-');
    }
    out
}

// ============================================================================
// Structure : Converter
// ============================================================================
// Le "state holder" : possède le taux, le triplet et l'état du prix.
// Un seul propriétaire (la boucle principale), pas de verrou.
// ============================================================================

/// État de conversion : taux + montants + état de la cotation
#[derive(Debug, Clone, Default)]
pub struct Converter {
    rate: ConversionRate,
    amounts: AmountTriple,
    price_state: PriceState,
}

impl Converter {
    /// Convertisseur au taux de repli, montants à zéro
    pub fn new() -> Self {
        Self::default()
    }

    /// Convertisseur avec un taux initial donné
    pub fn with_rate(rate: ConversionRate) -> Self {
        Self {
            rate,
            ..Self::default()
        }
    }

    /// Taux courant
    pub fn rate(&self) -> ConversionRate {
        self.rate
    }

    /// Montants courants
    pub fn amounts(&self) -> AmountTriple {
        self.amounts
    }

    /// État de la cotation
    pub fn price_state(&self) -> &PriceState {
        &self.price_state
    }

    /// Applique l'édition d'un champ et retourne le nouveau triplet
    pub fn edit(&mut self, field: Field, value: f64) -> AmountTriple {
        self.amounts = recompute(field, value, self.rate);
        debug!(
            field = field.unit(),
            value,
            sol = self.amounts.sol,
            lamports = self.amounts.lamports,
            usd = self.amounts.usd,
            "Amounts recomputed"
        );
        self.amounts
    }

    /// Passe de NotFetched à Fetching
    ///
    /// Retourne false si une récupération a déjà eu lieu (une seule par vie)
    pub fn begin_price_fetch(&mut self) -> bool {
        if self.price_state != PriceState::NotFetched {
            warn!(state = ?self.price_state, "Price fetch already started, ignoring");
            return false;
        }
        self.price_state = PriceState::Fetching;
        true
    }

    /// Applique le résultat de la récupération
    ///
    /// Ne recalcule pas le triplet affiché : seules les éditions suivantes
    /// utilisent le nouveau taux.
    pub fn apply_price_update(&mut self, update: PriceUpdate) {
        if !self.price_state.is_pending() {
            warn!(state = ?self.price_state, ?update, "Price update outside of a fetch, ignoring");
            return;
        }

        match update {
            PriceUpdate::Fetched {
                usd_per_sol,
                fetched_at,
            } => match ConversionRate::new(usd_per_sol) {
                Some(rate) => {
                    info!(usd_per_sol, "Conversion rate updated from live quote");
                    self.rate = rate;
                    self.price_state = PriceState::Fetched {
                        usd_per_sol,
                        fetched_at,
                    };
                }
                None => {
                    warn!(usd_per_sol, "Rejected non-positive quote, keeping fallback rate");
                    self.price_state = PriceState::FetchFailed {
                        reason: format!("invalid price {}", usd_per_sol),
                    };
                }
            },
            PriceUpdate::Failed { reason } => {
                info!(%reason, rate = self.rate.usd_per_sol(), "Keeping current conversion rate");
                self.price_state = PriceState::FetchFailed { reason };
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    fn rate(usd_per_sol: f64) -> ConversionRate {
        ConversionRate::new(usd_per_sol).unwrap()
    }

    #[test]
    fn test_fallback_rate() {
        let converter = Converter::new();
        assert_eq!(converter.rate().usd_per_sol(), 240.0);
        assert_eq!(converter.amounts(), AmountTriple::default());
        assert_eq!(converter.price_state(), &PriceState::NotFetched);
    }

    #[test]
    fn test_rate_rejects_invalid_values() {
        assert!(ConversionRate::new(0.0).is_none());
        assert!(ConversionRate::new(-1.0).is_none());
        assert!(ConversionRate::new(f64::NAN).is_none());
        assert!(ConversionRate::new(f64::INFINITY).is_none());
        assert_eq!(ConversionRate::new(300.0).unwrap().usd_per_sol(), 300.0);
    }

    #[test]
    fn test_recompute_from_sol() {
        for v in [0.0, 0.5, 1.0, 2.0, 123.456, 1e6] {
            let triple = recompute(Field::Sol, v, rate(240.0));
            assert_eq!(triple.sol, v);
            assert_close(triple.lamports, v * 1e9);
            assert_close(triple.usd, v * 240.0);
        }
    }

    #[test]
    fn test_recompute_from_lamports() {
        for v in [0.0, 1.0, 5_000.0, 1e9, 3.5e12] {
            let triple = recompute(Field::Lamports, v, rate(187.25));
            assert_eq!(triple.lamports, v);
            assert_close(triple.sol, v / 1e9);
            assert_close(triple.usd, (v / 1e9) * 187.25);
        }
    }

    #[test]
    fn test_recompute_from_usd() {
        for v in [0.0, 1.0, 30.0, 999.99] {
            let triple = recompute(Field::Usd, v, rate(300.0));
            assert_eq!(triple.usd, v);
            assert_close(triple.sol, v / 300.0);
            assert_close(triple.lamports, (v / 300.0) * 1e9);
        }
    }

    #[test]
    fn test_sol_lamports_round_trip() {
        let mut converter = Converter::new();
        for v in [0.1, 1.0, 2.75, 0.000000001, 42_000.5] {
            let lamports = converter.edit(Field::Sol, v).lamports;
            let back = converter.edit(Field::Lamports, lamports);
            assert_close(back.sol, v);
        }
    }

    #[test]
    fn test_nan_propagates() {
        let triple = recompute(Field::Sol, parse_amount("abc"), rate(240.0));
        assert!(triple.sol.is_nan());
        assert!(triple.lamports.is_nan());
        assert!(triple.usd.is_nan());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("2"), 2.0);
        assert_eq!(parse_amount("  0.25 "), 0.25);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("-3"), -3.0);
        assert_eq!(parse_amount("1e3"), 1000.0);
        assert!(parse_amount("abc").is_nan());
        assert!(parse_amount("1.2.3").is_nan());
    }

    #[test]
    fn test_parse_amount_infinity_spellings() {
        for text in ["inf", "infinity", "INF", "+inf", "-inf", "nan", "NaN", "Inf"] {
            assert!(parse_amount(text).is_nan(), "{text} should be NaN");
        }
        assert_eq!(parse_amount("Infinity"), f64::INFINITY);
        assert_eq!(parse_amount("+Infinity"), f64::INFINITY);
        assert_eq!(parse_amount("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_amount("2E3"), 2000.0);
        assert_eq!(parse_amount("1e-9"), 1e-9);
    }

    #[test]
    fn test_is_partial_amount() {
        for text in ["", "-", "+", ".", "0.", "12", "1e", "1e-", "-2.5E+", " 3 "] {
            assert!(is_partial_amount(text), "{text:?} should be partial");
        }
        for text in ["abc", "1.2.3", "e5", "1e5e", "inf", "NaN", "1-"] {
            assert!(!is_partial_amount(text), "{text:?} should not be partial");
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2_000_000_000.0), "2000000000");
        assert_eq!(format_amount(480.0), "480");
        assert_eq!(format_amount(0.1), "0.1");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(-0.0), "0");
        assert_eq!(format_amount(f64::NAN), "NaN");
        assert_eq!(format_amount(f64::INFINITY), "Infinity");
        assert_eq!(format_amount(0.000000001), "0.000000001");
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(LAMPORTS_PER_SOL, 0), "1,000,000,000");
        assert_eq!(format_grouped(240.0, 4), "240");
        assert_eq!(format_grouped(240.123456, 4), "240.1235");
        assert_eq!(format_grouped(1234.5, 4), "1,234.5");
        assert_eq!(format_grouped(999.0, 2), "999");
        assert_eq!(format_grouped(-1234567.25, 2), "-1,234,567.25");
        assert_eq!(format_grouped(-0.00001, 4), "0");
        assert_eq!(format_grouped(f64::NAN, 4), "NaN");
    }

    #[test]
    fn test_scenarios() {
        let mut converter = Converter::new();

        let triple = converter.edit(Field::Sol, parse_amount("2"));
        assert_eq!(format_amount(triple.lamports), "2000000000");
        assert_eq!(format_amount(triple.usd), "480");

        let triple = converter.edit(Field::Lamports, parse_amount("1000000000"));
        assert_eq!(format_amount(triple.sol), "1");
        assert_eq!(format_amount(triple.usd), "240");

        let mut converter = Converter::with_rate(rate(300.0));
        let triple = converter.edit(Field::Usd, parse_amount("30"));
        assert_eq!(format_amount(triple.sol), "0.1");
        assert_eq!(format_amount(triple.lamports), "100000000");
    }

    #[test]
    fn test_price_fetch_success_updates_rate_only() {
        let mut converter = Converter::new();
        converter.edit(Field::Sol, 1.0);

        assert!(converter.begin_price_fetch());
        converter.apply_price_update(PriceUpdate::fetched_now(300.0));

        assert_eq!(converter.rate().usd_per_sol(), 300.0);
        assert!(converter.price_state().is_live());
        // Le triplet affiché n'est pas recalculé
        assert_eq!(converter.amounts().usd, 240.0);
        // Les éditions suivantes utilisent le nouveau taux
        assert_eq!(converter.edit(Field::Sol, 1.0).usd, 300.0);
    }

    #[test]
    fn test_price_fetch_failure_keeps_rate() {
        let mut converter = Converter::new();
        assert!(converter.begin_price_fetch());
        converter.apply_price_update(PriceUpdate::failed("HTTP 500"));

        assert_eq!(converter.rate(), ConversionRate::FALLBACK);
        assert_eq!(
            converter.price_state(),
            &PriceState::FetchFailed {
                reason: "HTTP 500".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_quote_keeps_rate() {
        let mut converter = Converter::new();
        assert!(converter.begin_price_fetch());
        converter.apply_price_update(PriceUpdate::fetched_now(0.0));

        assert_eq!(converter.rate(), ConversionRate::FALLBACK);
        assert!(matches!(converter.price_state(), PriceState::FetchFailed { .. }));
    }

    #[test]
    fn test_price_fetch_happens_once() {
        let mut converter = Converter::new();
        assert!(converter.begin_price_fetch());
        assert!(!converter.begin_price_fetch());

        converter.apply_price_update(PriceUpdate::fetched_now(300.0));
        assert!(!converter.begin_price_fetch());

        // Une deuxième cotation est ignorée
        converter.apply_price_update(PriceUpdate::fetched_now(500.0));
        assert_eq!(converter.rate().usd_per_sol(), 300.0);
    }

    #[test]
    fn test_update_without_fetch_is_ignored() {
        let mut converter = Converter::new();
        converter.apply_price_update(PriceUpdate::fetched_now(300.0));
        assert_eq!(converter.rate(), ConversionRate::FALLBACK);
        assert_eq!(converter.price_state(), &PriceState::NotFetched);
    }

    #[test]
    fn test_field_cycle() {
        assert_eq!(Field::Sol.next(), Field::Lamports);
        assert_eq!(Field::Usd.next(), Field::Sol);
        assert_eq!(Field::Sol.previous(), Field::Usd);
        for field in Field::ALL {
            assert_eq!(field.next().previous(), field);
            assert_eq!(Field::ALL[field.index()], field);
        }
    }
}
