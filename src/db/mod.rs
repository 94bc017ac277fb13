use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::{ApiVersion, Strategy};

pub mod genres;
pub mod guard;
pub mod layout;
pub mod migrator;
pub mod query;
pub mod relations;
pub mod repositories;

use guard::Guard;
use layout::Layout;
use repositories::{
    ActorRepository, CrewRepository, MovieActorRepository, MovieRepository, PersonRepository,
};

/// Connection pool of one strategy's database.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    strategy: Strategy,
    guard: Guard,
}

impl Store {
    pub async fn connect(strategy: Strategy, db_url: &str, config: &DatabaseConfig) -> Result<Self> {
        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .with_context(|| format!("Failed to connect to the {strategy} store"))?;

        migrator::up(strategy, &conn)
            .await
            .with_context(|| format!("Failed to migrate the {strategy} store"))?;

        info!(
            "{} store connected & migrations applied (pool: {}-{})",
            strategy, config.min_connections, config.max_connections
        );

        Ok(Self {
            conn,
            strategy,
            guard: Guard::new(config.operation_timeout()),
        })
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub const fn guard(&self) -> Guard {
        self.guard
    }

    #[must_use]
    pub const fn layout(&self, version: ApiVersion) -> Layout {
        Layout::resolve(self.strategy, version)
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn movies(&self, version: ApiVersion) -> MovieRepository {
        MovieRepository::new(self.conn.clone(), self.layout(version), self.guard)
    }

    /// Credit tables do not change between API versions of one strategy.
    #[must_use]
    pub fn actors(&self) -> ActorRepository {
        ActorRepository::new(self.conn.clone(), self.credit_tables(), self.guard)
    }

    #[must_use]
    pub fn people(&self) -> PersonRepository {
        PersonRepository::new(self.conn.clone(), self.credit_tables(), self.guard)
    }

    #[must_use]
    pub fn movie_actors(&self) -> MovieActorRepository {
        MovieActorRepository::new(self.conn.clone(), self.credit_tables(), self.guard)
    }

    #[must_use]
    pub fn crew(&self) -> CrewRepository {
        CrewRepository::new(self.conn.clone(), self.credit_tables(), self.guard)
    }

    const fn credit_tables(&self) -> layout::CreditTables {
        self.layout(ApiVersion::V5).credits
    }
}

/// The three strategy stores side by side.
#[derive(Clone)]
pub struct Catalog {
    views: Store,
    expand_deprecate: Store,
    branches: Store,
}

impl Catalog {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let (views, expand_deprecate, branches) = futures::try_join!(
            Store::connect(Strategy::Views, &config.views_url, config),
            Store::connect(
                Strategy::ExpandDeprecate,
                &config.expand_deprecate_url,
                config
            ),
            Store::connect(Strategy::Branches, &config.branches_url, config),
        )?;

        Ok(Self {
            views,
            expand_deprecate,
            branches,
        })
    }

    #[must_use]
    pub const fn store(&self, strategy: Strategy) -> &Store {
        match strategy {
            Strategy::Views => &self.views,
            Strategy::ExpandDeprecate => &self.expand_deprecate,
            Strategy::Branches => &self.branches,
        }
    }

    pub async fn ping(&self) -> Result<()> {
        futures::future::try_join_all(Strategy::ALL.iter().map(|s| self.store(*s).ping())).await?;
        Ok(())
    }
}
