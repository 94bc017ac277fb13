use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Catalog;
use crate::domain::{ApiVersion, Strategy};
use crate::services::{
    ActorService, MovieService, PersonService, SeaOrmActorService, SeaOrmMovieService,
    SeaOrmPersonService,
};

/// Everything a request needs, built once at startup. Services are keyed by
/// the strategy and version they speak; a missing key means the route does
/// not exist for that version.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub catalog: Catalog,

    movies: HashMap<(Strategy, ApiVersion), Arc<dyn MovieService>>,

    actors: HashMap<Strategy, Arc<dyn ActorService>>,

    people: HashMap<Strategy, Arc<dyn PersonService>>,

    pub start_time: std::time::Instant,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = Catalog::connect(&config.database).await?;
        Ok(Self::from_catalog(config, catalog))
    }

    #[must_use]
    pub fn from_catalog(config: Config, catalog: Catalog) -> Self {
        let mut movies: HashMap<(Strategy, ApiVersion), Arc<dyn MovieService>> = HashMap::new();
        let mut actors: HashMap<Strategy, Arc<dyn ActorService>> = HashMap::new();
        let mut people: HashMap<Strategy, Arc<dyn PersonService>> = HashMap::new();

        for strategy in Strategy::ALL {
            let store = catalog.store(strategy);
            for version in ApiVersion::ALL {
                movies.insert(
                    (strategy, version),
                    Arc::new(SeaOrmMovieService::new(store.clone(), version)),
                );
            }
            actors.insert(strategy, Arc::new(SeaOrmActorService::new(store.clone())));
            people.insert(strategy, Arc::new(SeaOrmPersonService::new(store.clone())));
        }

        Self {
            config,
            catalog,
            movies,
            actors,
            people,
            start_time: std::time::Instant::now(),
        }
    }

    #[must_use]
    pub fn movies(&self, strategy: Strategy, version: ApiVersion) -> Option<&Arc<dyn MovieService>> {
        self.movies.get(&(strategy, version))
    }

    /// Actors are served by v4 only.
    #[must_use]
    pub fn actors(&self, strategy: Strategy, version: ApiVersion) -> Option<&Arc<dyn ActorService>> {
        if version.has_actors() {
            self.actors.get(&strategy)
        } else {
            None
        }
    }

    /// People are served from v5 on.
    #[must_use]
    pub fn people(&self, strategy: Strategy, version: ApiVersion) -> Option<&Arc<dyn PersonService>> {
        if version.has_people() {
            self.people.get(&strategy)
        } else {
            None
        }
    }
}
