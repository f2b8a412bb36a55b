//! Turning a [`ServiceConfig`] into running pieces: the log subscriber and
//! the [`DataService`].

use rendezvous_api::{LogFormat, ServiceConfig};
use rendezvous_store::{DataService, EntityStore, NotificationBus, load_seed};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::StartupError;

/// Install the global `tracing` subscriber described by the logging
/// section. An unparsable level falls back to `info`.
pub fn init_logging(config: &ServiceConfig) {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    match config.logging.format {
        LogFormat::Plain => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Build the data service: seed collections if a seed path is configured,
/// pick the identifier strategy, size the notification channels.
///
/// # Errors
///
/// Returns [`StartupError::Seed`] if the seed file cannot be read, is not a
/// valid dataset, or repeats an identifier.
pub fn build_service(config: &ServiceConfig) -> Result<DataService, StartupError> {
    let store = match &config.store.seed_path {
        Some(path) => {
            let seed = load_seed(path)?;
            info!(
                path = %path.display(),
                users = seed.users.len(),
                locations = seed.locations.len(),
                events = seed.events.len(),
                participants = seed.participants.len(),
                "Seed data loaded"
            );
            EntityStore::from_seed(seed)?
        }
        None => {
            info!("No seed configured, starting with empty collections");
            EntityStore::new()
        }
    };

    let ids = config.store.id_strategy.build();
    let bus = NotificationBus::new(config.notifications.channel_capacity);
    Ok(DataService::new(store, ids, bus))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use rendezvous_store::IdStrategy;
    use rendezvous_types::{CreateUserInput, User};

    use super::*;

    #[tokio::test]
    async fn default_config_builds_an_empty_service() {
        let service = build_service(&ServiceConfig::default()).unwrap();
        assert!(service.list::<User>().await.is_empty());
    }

    #[tokio::test]
    async fn seeded_service_with_sequential_ids() {
        let path =
            std::env::temp_dir().join(format!("rendezvous-seed-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "users": [ { "id": 1, "username": "ann", "email": "ann@example.com" } ] }"#,
        )
        .unwrap();

        let mut config = ServiceConfig::default();
        config.store.seed_path = Some(path.clone());
        config.store.id_strategy = IdStrategy::Sequential;
        let service = build_service(&config).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(service.list::<User>().await.len(), 1);
        let created = service
            .mutations()
            .create_user(CreateUserInput {
                username: String::from("bob"),
                email: String::from("bob@example.com"),
            })
            .await
            .unwrap();
        assert_eq!(created.id.as_str(), "u1");
    }

    #[test]
    fn missing_seed_file_is_a_startup_error() {
        let mut config = ServiceConfig::default();
        config.store.seed_path = Some(PathBuf::from("/no/such/seed.json"));
        let err = build_service(&config).unwrap_err();
        assert!(matches!(err, StartupError::Seed { .. }));
    }
}
