// ============================================================================
// Module : models
// ============================================================================
// Structures de données du convertisseur : montants, taux, état du prix
// ============================================================================

pub mod conversion; // Triplet SOL / Lamports / USD et taux
pub mod price;      // État de la récupération du prix

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use solconv::models::conversion::Converter;
// On peut faire : use solconv::models::Converter;
pub use conversion::{
    format_amount, format_grouped, is_partial_amount, parse_amount, recompute, AmountTriple, ConversionRate,
    Converter, Field, FALLBACK_USD_PER_SOL, LAMPORTS_PER_SOL,
};
pub use price::{PriceState, PriceUpdate};
