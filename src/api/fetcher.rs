// ============================================================================
// Récupération du prix en arrière-plan
// ============================================================================
// Lance UNE requête de prix sur un thread séparé, sans bloquer l'UI.
//
// CONCEPTS RUST :
// 1. std::thread::spawn + runtime tokio dédié au thread
// 2. mpsc channel : le thread envoie un PriceUpdate, la boucle le lit
// 3. Si la boucle a disparu (receiver droppé), send() échoue : no-op
// ============================================================================

use std::sync::mpsc;

use tracing::{debug, error, info};

use crate::api::jupiter::PriceClient;
use crate::models::PriceUpdate;

/// Poignée sur la récupération en cours
///
/// CONCEPT : Guarded callback
/// - Le receiver vit avec l'état de l'application
/// - Quand il est droppé, le résultat tardif du thread est ignoré
pub struct PriceFetchHandle {
    receiver: mpsc::Receiver<PriceUpdate>,
}

impl PriceFetchHandle {
    /// Récupère le résultat s'il est arrivé (non bloquant)
    pub fn try_take(&self) -> Option<PriceUpdate> {
        match self.receiver.try_recv() {
            Ok(update) => Some(update),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => None,
        }
    }
}

/// Exécute la requête et convertit le résultat en PriceUpdate
///
/// Ne retourne jamais d'erreur : tout échec est loggé puis transformé
/// en PriceUpdate::Failed.
pub async fn fetch_price_update(client: &PriceClient) -> PriceUpdate {
    match client.fetch_usd_per_sol().await {
        Ok(price) => PriceUpdate::fetched_now(price),
        Err(e) => {
            error!(error = ?e, "Error fetching Solana price");
            PriceUpdate::failed(format!("{:#}", e))
        }
    }
}

/// Lance la récupération du prix sur un thread dédié
///
/// CONCEPT : Runtime per-thread
/// - Le thread principal reste synchrone (boucle TUI)
/// - Ce thread crée son runtime, fait un block_on, puis se termine
pub fn spawn_price_fetch(client: PriceClient) -> PriceFetchHandle {
    let (sender, receiver) = mpsc::channel::<PriceUpdate>();

    info!(endpoint = %client.config().endpoint, "Spawning price fetch thread");
    std::thread::spawn(move || {
        let update = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime.block_on(fetch_price_update(&client)),
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime for price fetch");
                PriceUpdate::failed(format!("runtime unavailable: {}", e))
            }
        };

        if sender.send(update).is_err() {
            debug!("Converter closed before the price arrived, dropping update");
        }
    });

    PriceFetchHandle { receiver }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::jupiter::tests::{local_client, serve_once};

    use std::time::Duration;

    impl PriceFetchHandle {
        /// Attend le résultat au plus `timeout`
        fn wait(&self, timeout: Duration) -> Option<PriceUpdate> {
            self.receiver.recv_timeout(timeout).ok()
        }
    }

    #[tokio::test]
    async fn test_fetch_price_update_success() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"data":{"So11111111111111111111111111111111111111112":{"price":"300"}}}"#,
        )
        .await;

        match fetch_price_update(&local_client(endpoint)).await {
            PriceUpdate::Fetched { usd_per_sol, .. } => assert_eq!(usd_per_sol, 300.0),
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_price_update_swallows_errors() {
        let endpoint = serve_once("500 Internal Server Error", r#"{"message":"boom"}"#).await;

        let update = fetch_price_update(&local_client(endpoint)).await;
        assert!(matches!(update, PriceUpdate::Failed { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawn_price_fetch_delivers_once() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"data":{"So11111111111111111111111111111111111111112":{"price":123.5}}}"#,
        )
        .await;

        let handle = spawn_price_fetch(local_client(endpoint));
        let update = handle.wait(Duration::from_secs(10)).expect("price update");
        assert!(matches!(update, PriceUpdate::Fetched { usd_per_sol, .. } if usd_per_sol == 123.5));

        // Le thread est terminé : plus rien à recevoir
        assert!(handle.wait(Duration::from_millis(100)).is_none());
    }
}
