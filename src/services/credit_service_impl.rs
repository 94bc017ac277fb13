//! `SeaORM` implementations of [`ActorService`] and [`PersonService`].

use tracing::info;

use crate::db::Store;
use crate::domain::validation::{Validator, validate_actor, validate_person};
use crate::error::CatalogResult;
use crate::models::{Actor, Person};
use crate::services::credit_service::{ActorService, PersonInput, PersonService};

pub struct SeaOrmActorService {
    store: Store,
}

impl SeaOrmActorService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ActorService for SeaOrmActorService {
    async fn list(&self) -> CatalogResult<Vec<Actor>> {
        self.store.actors().get_all().await
    }

    async fn get(&self, id: i64) -> CatalogResult<Actor> {
        self.store.actors().get(id).await
    }

    async fn create(&self, input: PersonInput) -> CatalogResult<Actor> {
        let mut actor = Actor::default();
        input.apply(&mut actor.name, &mut actor.birthdate, 0);

        let mut v = Validator::new();
        validate_actor(&mut v, &actor);
        v.finish()?;

        self.store.actors().insert(&mut actor).await?;
        Ok(actor)
    }

    async fn update(&self, id: i64, input: PersonInput) -> CatalogResult<Actor> {
        let repo = self.store.actors();
        let mut actor = repo.get(id).await?;
        actor.version = input.apply(&mut actor.name, &mut actor.birthdate, actor.version);

        let mut v = Validator::new();
        validate_actor(&mut v, &actor);
        v.finish()?;

        repo.update(&mut actor).await?;
        Ok(actor)
    }

    async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.store.actors().delete(id).await
    }
}

pub struct SeaOrmPersonService {
    store: Store,
}

impl SeaOrmPersonService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl PersonService for SeaOrmPersonService {
    async fn list(&self) -> CatalogResult<Vec<Person>> {
        self.store.people().get_all().await
    }

    async fn get(&self, id: i64) -> CatalogResult<Person> {
        self.store.people().get(id).await
    }

    async fn create(&self, input: PersonInput) -> CatalogResult<Person> {
        let mut person = Person::default();
        input.apply(&mut person.name, &mut person.birthdate, 0);

        let mut v = Validator::new();
        validate_person(&mut v, &person);
        v.finish()?;

        self.store.people().insert(&mut person).await?;
        info!("Person {} available to legacy readers as actor {:?}", person.id, person.old_actor_id);
        Ok(person)
    }

    async fn update(&self, id: i64, input: PersonInput) -> CatalogResult<Person> {
        let repo = self.store.people();
        let mut person = repo.get(id).await?;
        person.version = input.apply(&mut person.name, &mut person.birthdate, person.version);

        let mut v = Validator::new();
        validate_person(&mut v, &person);
        v.finish()?;

        repo.update(&mut person).await?;
        Ok(person)
    }

    async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.store.people().delete(id).await
    }
}
