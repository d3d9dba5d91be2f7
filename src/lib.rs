// ============================================================================
// solconv - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;    // API de prix Jupiter
pub mod app;    // État de l'application
pub mod config; // Configuration par défaut
pub mod models; // Montants, taux, état du prix
pub mod ui;     // Interface utilisateur
