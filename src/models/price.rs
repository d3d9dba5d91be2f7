// ============================================================================
// Prix SOL/USD : état de la récupération
// ============================================================================
// Le prix est récupéré une seule fois au démarrage. Cette machine à états
// décrit où en est cette récupération :
//
//   NotFetched → Fetching → Fetched
//                         ↘ FetchFailed
//
// FetchFailed se comporte comme NotFetched pour le taux (on reste sur le
// prix de repli), mais on ne repasse jamais par Fetching.
// ============================================================================

use chrono::{DateTime, Utc};

/// État de la récupération du prix
///
/// CONCEPT RUST : Enum avec données
/// - Fetched transporte le prix et l'heure de récupération
/// - FetchFailed garde la raison (pour le log et la ligne de statut)
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PriceState {
    /// Aucune requête lancée
    #[default]
    NotFetched,

    /// Requête en cours
    Fetching,

    /// Prix récupéré avec succès
    Fetched {
        usd_per_sol: f64,
        fetched_at: DateTime<Utc>,
    },

    /// Échec de la récupération (le taux de repli reste en place)
    FetchFailed { reason: String },
}

impl PriceState {
    /// Étiquette affichée à côté du taux
    pub fn source_label(&self) -> &'static str {
        match self {
            PriceState::NotFetched | PriceState::FetchFailed { .. } => "fallback",
            PriceState::Fetching => "loading",
            PriceState::Fetched { .. } => "live",
        }
    }

    /// Vrai si le taux affiché vient d'une cotation réelle
    pub fn is_live(&self) -> bool {
        matches!(self, PriceState::Fetched { .. })
    }

    /// Vrai tant que la requête n'est pas résolue
    pub fn is_pending(&self) -> bool {
        matches!(self, PriceState::Fetching)
    }
}

/// Résultat envoyé par le thread de récupération
///
/// CONCEPT : Message entre threads
/// - Le worker ne touche jamais l'état directement
/// - Il envoie un PriceUpdate, la boucle principale l'applique
#[derive(Debug, Clone, PartialEq)]
pub enum PriceUpdate {
    /// Cotation reçue
    Fetched {
        usd_per_sol: f64,
        fetched_at: DateTime<Utc>,
    },

    /// Échec (réseau, statut HTTP, payload invalide)
    Failed { reason: String },
}

impl PriceUpdate {
    /// Construit une mise à jour réussie horodatée maintenant
    pub fn fetched_now(usd_per_sol: f64) -> Self {
        PriceUpdate::Fetched {
            usd_per_sol,
            fetched_at: Utc::now(),
        }
    }

    /// Construit une mise à jour en échec
    pub fn failed(reason: impl Into<String>) -> Self {
        PriceUpdate::Failed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels() {
        assert_eq!(PriceState::NotFetched.source_label(), "fallback");
        assert_eq!(PriceState::Fetching.source_label(), "loading");
        assert_eq!(
            PriceState::FetchFailed {
                reason: "HTTP 500".to_string()
            }
            .source_label(),
            "fallback"
        );

        let fetched = PriceState::Fetched {
            usd_per_sol: 300.0,
            fetched_at: Utc::now(),
        };
        assert_eq!(fetched.source_label(), "live");
        assert!(fetched.is_live());
        assert!(!fetched.is_pending());
    }

    #[test]
    fn test_default_is_not_fetched() {
        assert_eq!(PriceState::default(), PriceState::NotFetched);
    }
}
