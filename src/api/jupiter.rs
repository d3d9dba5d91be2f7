// ============================================================================
// API Client : Jupiter Price API
// ============================================================================
// Récupère le prix du SOL en USD depuis l'API de prix Jupiter
//
//   GET https://api.jup.ag/price/v2?ids=So11111111111111111111111111111111111111112
//
//   {
//     "data": {
//       "So11111111111111111111111111111111111111112": {
//         "id": "So11111111111111111111111111111111111111112",
//         "type": "derivedPrice",
//         "price": "187.423519000"
//       }
//     }
//   }
//
// Le prix arrive en chaîne ou en nombre selon les versions de l'API.
// ============================================================================

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer};
use tracing::{debug, error, info, instrument};

use crate::config::PriceConfig;

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================

/// Réponse complète de l'API de prix
#[derive(Debug, Deserialize)]
struct PriceResponse {
    data: Option<HashMap<String, Option<PriceEntry>>>,
}

/// Cotation d'un actif (null si Jupiter ne connaît pas le mint)
#[derive(Debug, Deserialize)]
struct PriceEntry {
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    price: Option<f64>,
}

/// Corps d'une réponse non-2xx
#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Désérialise un prix donné en chaîne ("187.42") ou en nombre (187.42)
fn deserialize_optional_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OptionalPrice;

    impl<'de> de::Visitor<'de> for OptionalPrice {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a price as a string or a number")
        }

        fn visit_none<E>(self) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Option<f64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(OptionalPrice)
        }

        fn visit_str<E>(self, value: &str) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }
    }

    deserializer.deserialize_option(OptionalPrice)
}

// ============================================================================
// Client
// ============================================================================

/// Client de l'API de prix
///
/// CONCEPT RUST : Composition
/// - Garde un reqwest::Client (pool de connexions réutilisable)
/// - Et la configuration (endpoint, actif)
#[derive(Debug, Clone)]
pub struct PriceClient {
    client: reqwest::Client,
    config: PriceConfig,
}

impl PriceClient {
    /// Crée un client avec le User-Agent configuré
    pub fn new(config: PriceConfig) -> Result<Self> {
        debug!("Creating HTTP client");
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    /// Crée un client à partir d'un reqwest::Client existant
    pub fn with_client(client: reqwest::Client, config: PriceConfig) -> Self {
        Self { client, config }
    }

    /// Configuration utilisée
    pub fn config(&self) -> &PriceConfig {
        &self.config
    }

    /// Récupère le prix de l'actif configuré, en USD
    ///
    /// Une seule requête, pas de retry, timeouts par défaut du transport.
    ///
    /// # Erreurs
    /// - Échec réseau
    /// - Statut HTTP hors 2xx (le champ `message` du corps est repris)
    /// - JSON invalide, actif absent, prix absent ou non positif
    #[instrument(skip(self), fields(asset = %self.config.asset_id))]
    pub async fn fetch_usd_per_sol(&self) -> Result<f64> {
        debug!(endpoint = %self.config.endpoint, "Sending price request");
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("ids", self.config.asset_id.as_str())])
            .send()
            .await
            .context("Price request failed")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            // Le corps d'erreur est optionnel : on prend ce qu'on peut
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "unknown error".to_string());

            error!(status = %status, %message, "Price API returned error status");
            anyhow::bail!("HTTP error {}: {}", status.as_u16(), message);
        }

        let body: PriceResponse = response
            .json()
            .await
            .context("Failed to parse price response")?;

        let price = extract_price(body, &self.config.asset_id)?;
        info!(price, "Fetched SOL price");
        Ok(price)
    }
}

/// Extrait un prix utilisable de la réponse
///
/// Un prix nul, négatif ou non fini est traité comme absent.
fn extract_price(response: PriceResponse, asset_id: &str) -> Result<f64> {
    let price = response
        .data
        .and_then(|mut data| data.remove(asset_id))
        .flatten()
        .and_then(|entry| entry.price)
        .with_context(|| format!("Invalid data received from API: no price for {}", asset_id))?;

    if !price.is_finite() || price <= 0.0 {
        anyhow::bail!("Invalid data received from API: price {} for {}", price, asset_id);
    }

    Ok(price)
}

/// Lit le champ `message` d'un corps d'erreur JSON
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiError>(body)
        .ok()
        .and_then(|err| err.message)
        .filter(|message| !message.is_empty())
}

// ============================================================================
// Tests unitaires
// ============================================================================
