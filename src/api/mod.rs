// ============================================================================
// Module : api
// ============================================================================
// Récupération du prix SOL/USD : client HTTP Jupiter et thread de fond
// ============================================================================

pub mod fetcher; // Récupération unique en arrière-plan
pub mod jupiter; // Client API Jupiter Price

// Re-export des fonctions principales
pub use fetcher::{fetch_price_update, spawn_price_fetch, PriceFetchHandle};
pub use jupiter::PriceClient;
