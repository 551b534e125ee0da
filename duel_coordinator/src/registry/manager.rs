//! Player registry state machine.
//!
//! UNKNOWN -> READY on a ready signal, READY -> IN_MATCH on pairing (done by
//! the store's pairing writes), back to UNKNOWN on match completion or on
//! disconnect.

use log::{info, warn};
use std::sync::Arc;

use super::models::{PlayerRegistry, RegistryStatus};
use crate::db::Store;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::matches::MatchStatus;
use crate::session::{SessionDirectory, SessionEntry};
use crate::tournament::{Tournament, TournamentId, TournamentStatus};

/// Player registry manager
#[derive(Clone)]
pub struct RegistryManager {
    store: Arc<dyn Store>,
    sessions: SessionDirectory,
}

impl RegistryManager {
    pub fn new(store: Arc<dyn Store>, sessions: SessionDirectory) -> Self {
        Self { store, sessions }
    }

    async fn tournament(&self, tournament_id: TournamentId) -> CoordinatorResult<Tournament> {
        self.store
            .get_tournament(tournament_id)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound(format!("tournament {tournament_id}")))
    }

    /// Register a player, issuing a fresh passkey
    pub async fn register(
        &self,
        tournament_id: TournamentId,
        user_id: &str,
    ) -> CoordinatorResult<PlayerRegistry> {
        let tournament = self.tournament(tournament_id).await?;
        if !matches!(
            tournament.status,
            TournamentStatus::Created | TournamentStatus::Open
        ) {
            return Err(CoordinatorError::Forbidden(format!(
                "registration is closed, tournament is {}",
                tournament.status
            )));
        }

        let registry = PlayerRegistry::new(tournament_id, user_id);
        self.store.insert_registry(&registry).await?;

        info!("User {user_id} registered for tournament {tournament_id}");
        Ok(registry)
    }

    /// A player's own registry
    pub async fn get(
        &self,
        tournament_id: TournamentId,
        user_id: &str,
    ) -> CoordinatorResult<PlayerRegistry> {
        self.store
            .get_registry(tournament_id, user_id)
            .await?
            .ok_or_else(|| {
                CoordinatorError::NotFound(format!("registration of {user_id} in {tournament_id}"))
            })
    }

    /// Registry behind a passkey, visible only to its owner
    pub async fn get_by_passkey(
        &self,
        passkey: &str,
        requester_id: &str,
    ) -> CoordinatorResult<PlayerRegistry> {
        let registry = self.by_passkey(passkey).await?;
        if registry.player_user_id != requester_id {
            warn!("User {requester_id} asked for a passkey it does not own");
            return Err(CoordinatorError::Forbidden(
                "passkey belongs to another player".to_string(),
            ));
        }
        Ok(registry)
    }

    pub(crate) async fn by_passkey(&self, passkey: &str) -> CoordinatorResult<PlayerRegistry> {
        self.store
            .get_registry_by_passkey(passkey)
            .await?
            .ok_or_else(|| CoordinatorError::NotFound("registration for passkey".to_string()))
    }

    /// Registry behind a passkey, if its owner may connect now.
    ///
    /// The tournament must be accepting players (OPEN) or playing (STARTED).
    /// Nothing is bound; transports call this before accepting a connection.
    pub async fn admit(&self, passkey: &str) -> CoordinatorResult<PlayerRegistry> {
        let registry = self.by_passkey(passkey).await?;
        let tournament = self.tournament(registry.tournament_id).await?;
        if !matches!(
            tournament.status,
            TournamentStatus::Open | TournamentStatus::Started
        ) {
            warn!(
                "Connection refused, tournament {} is {}",
                tournament.tournament_id, tournament.status
            );
            return Err(CoordinatorError::Forbidden("tournament not open".to_string()));
        }
        Ok(registry)
    }

    /// Bind the passkey owner's session to a new connection, under the same
    /// conditions as [`RegistryManager::admit`].
    pub async fn on_connect(
        &self,
        passkey: &str,
        connection_id: &str,
    ) -> CoordinatorResult<PlayerRegistry> {
        let registry = self.admit(passkey).await?;
        if let Some(SessionEntry::Online(previous)) =
            self.sessions.entry(&registry.player_user_id).await?
        {
            info!(
                "User {} reconnected, replacing connection {previous}",
                registry.player_user_id
            );
        }
        self.sessions
            .connect(&registry.player_user_id, connection_id)
            .await?;
        Ok(registry)
    }

    /// Mark the connection's user offline and sweep every READY or IN_MATCH
    /// registry of that user, across tournaments, back to UNKNOWN.
    ///
    /// Returns the registries that were reset.
    pub async fn on_disconnect(&self, connection_id: &str) -> CoordinatorResult<Vec<PlayerRegistry>> {
        let user_id = self.sessions.disconnect(connection_id).await?;

        let mut reset = Vec::new();
        for status in RegistryStatus::ACTIVE {
            let registries = self
                .store
                .list_user_registries_by_status(&user_id, status)
                .await?;

            for registry in registries {
                match self
                    .store
                    .transition_registry(
                        registry.tournament_id,
                        &user_id,
                        &RegistryStatus::ACTIVE,
                        RegistryStatus::Unknown,
                    )
                    .await
                {
                    Ok(updated) => reset.push(updated),
                    // Already moved on, e.g. its match just completed
                    Err(CoordinatorError::Conflict(reason)) => {
                        warn!("Skipped registry reset for {user_id}: {reason}");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(
            "User {user_id} disconnected, {} registries reset to {}",
            reset.len(),
            RegistryStatus::Unknown
        );
        Ok(reset)
    }

    /// UNKNOWN -> READY for the user behind a connection.
    ///
    /// Idempotent while READY. A player in a match cannot become ready, even
    /// after a reconnect reset the registry while the match is still ongoing.
    pub async fn mark_ready(
        &self,
        connection_id: &str,
        tournament_id: TournamentId,
    ) -> CoordinatorResult<(Tournament, PlayerRegistry)> {
        let user_id = self.sessions.user_of(connection_id).await?;
        let tournament = self.tournament(tournament_id).await?;
        if !matches!(
            tournament.status,
            TournamentStatus::Open | TournamentStatus::Started
        ) {
            return Err(CoordinatorError::Forbidden(format!(
                "tournament is {}",
                tournament.status
            )));
        }

        let registry = self.get(tournament_id, &user_id).await?;
        if let Some(ongoing) = self
            .store
            .list_matches_by_passkey(&registry.passkey, MatchStatus::Ongoing)
            .await?
            .first()
        {
            return Err(CoordinatorError::conflict(format!(
                "{user_id} is still playing match {}",
                ongoing.match_id
            )));
        }

        let registry = match registry.status {
            RegistryStatus::Ready => registry,
            RegistryStatus::InMatch => {
                return Err(CoordinatorError::conflict(format!(
                    "{user_id} is already playing a match"
                )));
            }
            RegistryStatus::Unknown => {
                let ready = self
                    .store
                    .transition_registry(
                        tournament_id,
                        &user_id,
                        &[RegistryStatus::Unknown],
                        RegistryStatus::Ready,
                    )
                    .await?;
                info!("User {user_id} is ready in tournament {tournament_id}");
                ready
            }
        };

        Ok((tournament, registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, TournamentRepository};
    use crate::game::GameRef;
    use crate::tournament::TournamentConfig;

    async fn setup(status: TournamentStatus) -> (RegistryManager, Arc<MemoryStore>, Tournament) {
        let store = Arc::new(MemoryStore::new());
        let mut tournament = Tournament::new(
            "host",
            TournamentConfig::new("Cup", GameRef::new("tictactoe", "0.0.1")),
        );
        tournament.status = status;
        store.insert_tournament(&tournament).await.unwrap();

        let manager = RegistryManager::new(store.clone(), SessionDirectory::in_memory());
        (manager, store, tournament)
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let (manager, _, tournament) = setup(TournamentStatus::Open).await;
        manager.register(tournament.tournament_id, "alice").await.unwrap();

        assert!(matches!(
            manager.register(tournament.tournament_id, "alice").await,
            Err(CoordinatorError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_register_after_start_is_forbidden() {
        let (manager, _, tournament) = setup(TournamentStatus::Started).await;
        assert!(matches!(
            manager.register(tournament.tournament_id, "alice").await,
            Err(CoordinatorError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_requires_open_tournament() {
        let (manager, store, tournament) = setup(TournamentStatus::Created).await;
        let registry = manager.register(tournament.tournament_id, "alice").await.unwrap();

        assert!(matches!(
            manager.on_connect(&registry.passkey, "conn-1").await,
            Err(CoordinatorError::Forbidden(_))
        ));

        store
            .transition_tournament(
                tournament.tournament_id,
                TournamentStatus::Created,
                TournamentStatus::Open,
            )
            .await
            .unwrap();
        manager.on_connect(&registry.passkey, "conn-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_admit_binds_nothing() {
        let (manager, _, tournament) = setup(TournamentStatus::Open).await;
        let registry = manager.register(tournament.tournament_id, "alice").await.unwrap();

        assert_eq!(manager.admit(&registry.passkey).await.unwrap(), registry);
        assert_eq!(manager.sessions.entry("alice").await.unwrap(), None);
        assert!(matches!(
            manager.admit("no-such-passkey").await,
            Err(CoordinatorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ready_is_idempotent() {
        let (manager, _, tournament) = setup(TournamentStatus::Open).await;
        let registry = manager.register(tournament.tournament_id, "alice").await.unwrap();
        manager.on_connect(&registry.passkey, "conn-1").await.unwrap();

        let (_, first) = manager
            .mark_ready("conn-1", tournament.tournament_id)
            .await
            .unwrap();
        let (_, second) = manager
            .mark_ready("conn-1", tournament.tournament_id)
            .await
            .unwrap();
        assert_eq!(first.status, RegistryStatus::Ready);
        assert_eq!(second.status, RegistryStatus::Ready);
    }

    #[tokio::test]
    async fn test_ready_from_unknown_connection() {
        let (manager, _, tournament) = setup(TournamentStatus::Open).await;
        assert!(matches!(
            manager.mark_ready("ghost", tournament.tournament_id).await,
            Err(CoordinatorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_passkey_lookup_is_owner_only() {
        let (manager, _, tournament) = setup(TournamentStatus::Open).await;
        let registry = manager.register(tournament.tournament_id, "alice").await.unwrap();

        assert_eq!(
            manager
                .get_by_passkey(&registry.passkey, "alice")
                .await
                .unwrap(),
            registry
        );
        assert!(matches!(
            manager.get_by_passkey(&registry.passkey, "bob").await,
            Err(CoordinatorError::Forbidden(_))
        ));
    }
}
