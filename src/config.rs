// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut de l'application regroupées dans une structure typée.
// Pas de fichier de configuration ni d'option en ligne de commande :
// seul RUST_LOG (filtre des logs) est lu dans l'environnement.
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

/// Endpoint de l'API de prix Jupiter (v2)
pub const JUPITER_PRICE_API: &str = "https://api.jup.ag/price/v2";

/// Mint du SOL (wrapped SOL), identifiant de l'actif côté Jupiter
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Configuration de l'appel à l'API de prix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceConfig {
    /// URL de l'endpoint (sans query string)
    pub endpoint: String,

    /// Identifiant de l'actif demandé (paramètre `ids`)
    pub asset_id: String,

    /// User-Agent envoyé avec la requête
    pub user_agent: String,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            endpoint: JUPITER_PRICE_API.to_string(),
            asset_id: SOL_MINT.to_string(),
            user_agent: format!("solconv/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration globale
#[derive(Debug, Clone)]
pub struct Config {
    /// Appel à l'API de prix
    pub price: PriceConfig,

    /// Délai max d'attente d'un événement clavier avant un Tick
    pub tick_rate: Duration,

    /// Répertoire des fichiers de logs
    pub log_dir: PathBuf,
}

impl Config {
    /// Répertoire de logs par défaut
    ///
    /// - Linux : ~/.local/share/solconv/logs
    /// - macOS : ~/Library/Application Support/solconv/logs
    /// - Windows : C:\Users\<user>\AppData\Local\solconv\logs
    /// - Sinon : ./logs
    pub fn default_log_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("solconv").join("logs"))
            .unwrap_or_else(|| PathBuf::from("./logs"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            price: PriceConfig::default(),
            tick_rate: Duration::from_millis(250),
            log_dir: Self::default_log_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_price_config() {
        let config = PriceConfig::default();
        assert_eq!(config.endpoint, "https://api.jup.ag/price/v2");
        assert_eq!(config.asset_id, SOL_MINT);
        assert!(config.user_agent.starts_with("solconv/"));
    }

    #[test]
    fn test_default_log_dir() {
        let dir = Config::default_log_dir();
        assert!(dir.ends_with("logs"));
    }
}
