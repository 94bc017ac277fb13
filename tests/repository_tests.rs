use reelstrata::config::DatabaseConfig;
use reelstrata::db::Store;
use reelstrata::domain::{ApiVersion, CrewType, Strategy};
use reelstrata::error::CatalogError;
use reelstrata::models::{Actor, Crew, Movie, MovieActor, Person};
use sea_orm::ConnectionTrait;

async fn open_store(strategy: Strategy) -> Store {
    let path = std::env::temp_dir().join(format!(
        "reelstrata-repo-{}-{}.db",
        strategy,
        uuid::Uuid::new_v4()
    ));
    let url = format!("sqlite:{}", path.display());
    Store::connect(strategy, &url, &DatabaseConfig::default())
        .await
        .expect("Failed to open store")
}

fn movie(title: &str, year: i32, genres: &[&str]) -> Movie {
    Movie {
        title: title.to_string(),
        year,
        genres: genres.iter().map(ToString::to_string).collect(),
        director: Some("Denis Villeneuve".to_string()),
        runtime: Some(137),
        language: Some("English".to_string()),
        ..Movie::default()
    }
}

fn crew_member(movie_id: i64, person_id: i64, crew_type: CrewType, role: Option<&str>) -> Crew {
    Crew {
        movie_id,
        person_id: Some(person_id),
        person_name: String::new(),
        crew_type,
        role: role.map(ToString::to_string),
        legacy_actor_id: None,
        created_at: String::new(),
        updated_at: String::new(),
        version: 1,
    }
}

#[tokio::test]
async fn test_insert_starts_at_version_one_everywhere() {
    for strategy in Strategy::ALL {
        let store = open_store(strategy).await;
        for version in ApiVersion::ALL {
            let repo = store.movies(version);
            let mut m = movie("Arrival", 2016, &["Sci-Fi"]);
            repo.insert(&mut m).await.unwrap();
            assert!(m.id > 0, "{strategy}/{version}");
            assert_eq!(m.version, 1, "{strategy}/{version}");
            assert!(!m.created_at.is_empty());

            let stored = repo.get(m.id).await.unwrap();
            assert_eq!(stored.title, "Arrival");
            assert_eq!(stored.genres, vec!["Sci-Fi".to_string()]);
        }
    }
}

#[tokio::test]
async fn test_dune_update_then_stale_update() {
    let store = open_store(Strategy::ExpandDeprecate).await;
    let repo = store.movies(ApiVersion::V3);

    let mut dune = Movie {
        title: "Dune".to_string(),
        year: 1984,
        genres: vec!["Sci-Fi".to_string()],
        director: Some("David Lynch".to_string()),
        runtime: Some(137),
        language: Some("English".to_string()),
        ..Movie::default()
    };
    repo.insert(&mut dune).await.unwrap();
    assert_eq!(dune.version, 1);

    let mut fresh = dune.clone();
    fresh.runtime = Some(155);
    repo.update(&mut fresh).await.unwrap();
    assert_eq!(fresh.version, 2);

    let stored = repo.get(dune.id).await.unwrap();
    assert_eq!(stored.runtime, Some(155));
    assert_eq!(stored.version, 2);

    let mut stale = dune.clone();
    stale.runtime = Some(190);
    let err = repo.update(&mut stale).await.unwrap_err();
    assert!(matches!(err, CatalogError::EditConflict));
    assert_eq!(stale.version, 1);

    assert_eq!(repo.get(dune.id).await.unwrap().runtime, Some(155));
}

#[tokio::test]
async fn test_non_positive_ids_are_not_found() {
    let store = open_store(Strategy::Views).await;
    let repo = store.movies(ApiVersion::V2);

    assert!(matches!(repo.get(0).await, Err(CatalogError::RecordNotFound)));
    assert!(matches!(repo.delete(-5).await, Err(CatalogError::RecordNotFound)));
    assert!(matches!(repo.get(4242).await, Err(CatalogError::RecordNotFound)));
    assert!(matches!(repo.delete(4242).await, Err(CatalogError::RecordNotFound)));
    assert!(matches!(
        store.crew().get_for_movie(0).await,
        Err(CatalogError::RecordNotFound)
    ));
}

#[tokio::test]
async fn test_update_of_missing_row_is_not_found() {
    let store = open_store(Strategy::Branches).await;
    let mut ghost = movie("Ghost", 1990, &["Romance"]);
    ghost.id = 999;
    ghost.version = 1;
    let err = store.movies(ApiVersion::V2).update(&mut ghost).await.unwrap_err();
    assert!(matches!(err, CatalogError::RecordNotFound));
}

#[tokio::test]
async fn test_concurrent_updates_have_one_winner() {
    let store = open_store(Strategy::ExpandDeprecate).await;
    let mut original = movie("Heat", 1995, &["Crime"]);
    store.movies(ApiVersion::V2).insert(&mut original).await.unwrap();

    let repo_a = store.movies(ApiVersion::V2);
    let repo_b = store.movies(ApiVersion::V2);
    let mut a = original.clone();
    a.runtime = Some(170);
    let mut b = original.clone();
    b.runtime = Some(171);

    let (ra, rb) = tokio::join!(repo_a.update(&mut a), repo_b.update(&mut b));
    let outcomes = [ra, rb];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(CatalogError::EditConflict)))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 1);

    let stored = store.movies(ApiVersion::V2).get(original.id).await.unwrap();
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn test_sequential_updates_increment_by_one() {
    let store = open_store(Strategy::Branches).await;
    let repo = store.movies(ApiVersion::V4);
    let mut m = movie("Sicario", 2015, &["Thriller"]);
    repo.insert(&mut m).await.unwrap();

    for n in 0..5 {
        m.runtime = Some(121 + n);
        repo.update(&mut m).await.unwrap();
    }
    assert_eq!(m.version, 6);
    assert_eq!(repo.get(m.id).await.unwrap().version, 6);
}

#[tokio::test]
async fn test_genre_merge_across_versions() {
    let store = open_store(Strategy::ExpandDeprecate).await;
    let v1 = store.movies(ApiVersion::V1);
    let v3 = store.movies(ApiVersion::V3);

    let mut listed = movie("Paths of Glory", 1957, &["Drama", "War"]);
    v3.insert(&mut listed).await.unwrap();
    assert_eq!(v1.get(listed.id).await.unwrap().genres, vec!["Drama".to_string()]);

    // A legacy write touches only the scalar column; the list keeps precedence.
    let mut legacy = v1.get(listed.id).await.unwrap();
    legacy.genres = vec!["Comedy".to_string()];
    v1.update(&mut legacy).await.unwrap();
    assert_eq!(v1.get(listed.id).await.unwrap().genres, vec!["Comedy".to_string()]);
    assert_eq!(
        v3.get(listed.id).await.unwrap().genres,
        vec!["Drama".to_string(), "War".to_string()]
    );

    let mut scalar = movie("The Thing", 1982, &["Horror"]);
    v1.insert(&mut scalar).await.unwrap();
    assert_eq!(v3.get(scalar.id).await.unwrap().genres, vec!["Horror".to_string()]);
}

#[tokio::test]
async fn test_branch_rows_missing_read_as_absent() {
    let store = open_store(Strategy::Branches).await;
    let v1 = store.movies(ApiVersion::V1);
    let v2 = store.movies(ApiVersion::V2);

    let mut old = movie("Metropolis", 1927, &["Sci-Fi"]);
    v1.insert(&mut old).await.unwrap();

    let seen = v2.get(old.id).await.unwrap();
    assert_eq!(seen.director, None);
    assert_eq!(seen.runtime, None);
    assert_eq!(seen.language, None);
    assert_eq!(seen.genres, vec!["Sci-Fi".to_string()]);

    let mut detailed = seen;
    detailed.director = Some("Fritz Lang".to_string());
    detailed.runtime = Some(153);
    detailed.language = Some("German".to_string());
    v2.update(&mut detailed).await.unwrap();

    let seen = store.movies(ApiVersion::V4).get(old.id).await.unwrap();
    assert_eq!(seen.director.as_deref(), Some("Fritz Lang"));
    assert_eq!(seen.runtime, Some(153));
    assert_eq!(seen.genres, vec!["Sci-Fi".to_string()]);
    assert_eq!(seen.version, 2);
}

#[tokio::test]
async fn test_views_versions_are_separate_tables() {
    let store = open_store(Strategy::Views).await;
    let mut m = movie("Stalker", 1979, &["Drama"]);
    store.movies(ApiVersion::V1).insert(&mut m).await.unwrap();

    assert_eq!(store.movies(ApiVersion::V1).get_all().await.unwrap().len(), 1);
    assert!(store.movies(ApiVersion::V2).get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_movie_removes_dependents() {
    let store = open_store(Strategy::ExpandDeprecate).await;
    let mut m = movie("Blade Runner 2049", 2017, &["Sci-Fi"]);
    store.movies(ApiVersion::V5).insert(&mut m).await.unwrap();

    for (name, role) in [("Ryan Gosling", "K"), ("Ana de Armas", "Joi")] {
        let mut person = Person {
            name: name.to_string(),
            ..Person::default()
        };
        store.people().insert(&mut person).await.unwrap();
        let mut credit = crew_member(m.id, person.id, CrewType::Actor, Some(role));
        store.crew().insert(&mut credit).await.unwrap();
    }
    assert_eq!(store.crew().get_for_movie(m.id).await.unwrap().len(), 2);
    assert_eq!(store.movie_actors().get_for_movie(m.id).await.unwrap().len(), 2);

    store.movies(ApiVersion::V5).delete(m.id).await.unwrap();

    assert!(store.crew().get_for_movie(m.id).await.unwrap().is_empty());
    assert!(store.movie_actors().get_for_movie(m.id).await.unwrap().is_empty());
    assert!(matches!(
        store.movies(ApiVersion::V3).get(m.id).await,
        Err(CatalogError::RecordNotFound)
    ));
}

#[tokio::test]
async fn test_person_shadow_round_trip() {
    let store = open_store(Strategy::ExpandDeprecate).await;
    let mut m = movie("Dune: Part Two", 2024, &["Sci-Fi", "Adventure"]);
    store.movies(ApiVersion::V5).insert(&mut m).await.unwrap();

    let mut person = Person {
        name: "Zendaya".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut person).await.unwrap();
    let shadow_id = person.old_actor_id.expect("shadow actor");
    assert_eq!(store.actors().get(shadow_id).await.unwrap().name, "Zendaya");

    let mut chani = crew_member(m.id, person.id, CrewType::Actor, Some("Chani"));
    store.crew().insert(&mut chani).await.unwrap();
    assert_eq!(chani.version, 1);
    assert_eq!(chani.person_name, "Zendaya");

    let legacy = store.movie_actors().get_for_movie(m.id).await.unwrap();
    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].actor_id, shadow_id);
    assert_eq!(legacy[0].role, "Chani");

    let crew = store.crew().get_for_movie(m.id).await.unwrap();
    assert_eq!(crew.len(), 1);
    assert_eq!(crew[0].person_id, Some(person.id));

    person.name = "Zendaya Coleman".to_string();
    store.people().update(&mut person).await.unwrap();
    assert_eq!(person.version, 2);
    assert_eq!(
        store.actors().get(shadow_id).await.unwrap().name,
        "Zendaya Coleman"
    );

    // Switching away from Actor drops the legacy association.
    chani.crew_type = CrewType::Producer;
    chani.role = None;
    store.crew().update(&mut chani).await.unwrap();
    assert_eq!(chani.version, 2);
    assert!(store.movie_actors().get_for_movie(m.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_crew_includes_legacy_cast() {
    let store = open_store(Strategy::Branches).await;
    let mut m = movie("Prisoners", 2013, &["Thriller"]);
    store.movies(ApiVersion::V4).insert(&mut m).await.unwrap();

    let mut actor = Actor {
        name: "Hugh Jackman".to_string(),
        ..Actor::default()
    };
    store.actors().insert(&mut actor).await.unwrap();
    let mut cast = MovieActor {
        movie_id: m.id,
        actor_id: actor.id,
        role: "Keller Dover".to_string(),
        ..MovieActor::default()
    };
    store.movie_actors().insert(&mut cast).await.unwrap();
    assert_eq!(cast.actor_name, "Hugh Jackman");

    let mut director = Person {
        name: "Denis Villeneuve".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut director).await.unwrap();
    let mut credit = crew_member(m.id, director.id, CrewType::Director, None);
    store.crew().insert(&mut credit).await.unwrap();

    let crew = store.crew().get_for_movie(m.id).await.unwrap();
    assert_eq!(crew.len(), 2);
    assert_eq!(crew[0].crew_type, CrewType::Director);
    assert_eq!(crew[1].crew_type, CrewType::Actor);
    assert_eq!(crew[1].person_id, None);
    assert_eq!(crew[1].person_name, "Hugh Jackman");
    assert_eq!(crew[1].role.as_deref(), Some("Keller Dover"));
}

#[tokio::test]
async fn test_association_bulk_deletes_tolerate_empty_movies() {
    let store = open_store(Strategy::Views).await;
    store.movie_actors().delete_for_movie(77).await.unwrap();
    store.crew().delete_for_movie(77).await.unwrap();
    assert!(store.movie_actors().get_for_movie(77).await.unwrap().is_empty());
    assert!(store.crew().get_for_movie(77).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_movie_actor_stale_role_update_conflicts() {
    let store = open_store(Strategy::Views).await;
    let mut m = movie("Enemy", 2013, &["Mystery"]);
    store.movies(ApiVersion::V4).insert(&mut m).await.unwrap();

    let mut actor = Actor {
        name: "Jake Gyllenhaal".to_string(),
        ..Actor::default()
    };
    store.actors().insert(&mut actor).await.unwrap();

    let mut cast = MovieActor {
        movie_id: m.id,
        actor_id: actor.id,
        role: "Adam".to_string(),
        ..MovieActor::default()
    };
    store.movie_actors().insert(&mut cast).await.unwrap();

    let mut first = cast.clone();
    first.role = "Adam Bell".to_string();
    store.movie_actors().update(&mut first).await.unwrap();
    assert_eq!(first.version, 2);

    let mut stale = cast.clone();
    stale.role = "Anthony".to_string();
    assert!(matches!(
        store.movie_actors().update(&mut stale).await,
        Err(CatalogError::EditConflict)
    ));

    let mut missing = MovieActor {
        movie_id: m.id,
        actor_id: 9999,
        role: "Nobody".to_string(),
        ..MovieActor::default()
    };
    assert!(matches!(
        store.movie_actors().insert(&mut missing).await,
        Err(CatalogError::RecordNotFound)
    ));
}

#[tokio::test]
async fn test_deleted_shadow_is_recreated_on_person_update() {
    let store = open_store(Strategy::ExpandDeprecate).await;
    let mut person = Person {
        name: "Rebecca Ferguson".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut person).await.unwrap();
    let shadow_id = person.old_actor_id.expect("shadow actor");

    store.actors().delete(shadow_id).await.unwrap();
    assert_eq!(store.people().get(person.id).await.unwrap().old_actor_id, None);

    let mut current = store.people().get(person.id).await.unwrap();
    current.name = "Rebecca Louisa Ferguson".to_string();
    store.people().update(&mut current).await.unwrap();

    let new_shadow = current.old_actor_id.expect("recreated shadow");
    assert_ne!(new_shadow, shadow_id);
    assert_eq!(
        store.actors().get(new_shadow).await.unwrap().name,
        "Rebecca Louisa Ferguson"
    );
}

#[tokio::test]
async fn test_delete_person_removes_shadow_and_credits() {
    let store = open_store(Strategy::Branches).await;
    let mut m = movie("Incendies", 2010, &["Drama"]);
    store.movies(ApiVersion::V5).insert(&mut m).await.unwrap();

    let mut person = Person {
        name: "Lubna Azabal".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut person).await.unwrap();
    let shadow_id = person.old_actor_id.expect("shadow actor");

    let mut credit = crew_member(m.id, person.id, CrewType::Actor, Some("Nawal"));
    store.crew().insert(&mut credit).await.unwrap();

    store.people().delete(person.id).await.unwrap();
    assert!(store.crew().get_for_movie(m.id).await.unwrap().is_empty());
    assert!(matches!(
        store.actors().get(shadow_id).await,
        Err(CatalogError::RecordNotFound)
    ));
    assert!(matches!(
        store.people().delete(person.id).await,
        Err(CatalogError::RecordNotFound)
    ));
}

#[tokio::test]
async fn test_failed_dependent_delete_keeps_movie() {
    let store = open_store(Strategy::ExpandDeprecate).await;
    let mut m = movie("Sicario", 2015, &["Crime"]);
    store.movies(ApiVersion::V5).insert(&mut m).await.unwrap();

    let mut person = Person {
        name: "Emily Blunt".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut person).await.unwrap();
    let mut kate = crew_member(m.id, person.id, CrewType::Actor, Some("Kate Macer"));
    store.crew().insert(&mut kate).await.unwrap();

    store
        .conn
        .execute_unprepared(
            "CREATE TRIGGER crew_locked BEFORE DELETE ON crew \
             BEGIN SELECT RAISE(ABORT, 'crew is locked'); END;",
        )
        .await
        .unwrap();

    assert!(matches!(
        store.movies(ApiVersion::V5).delete(m.id).await,
        Err(CatalogError::Storage(_))
    ));

    // Nothing of the delete survives, including the legacy rows removed
    // before the crew table refused.
    assert_eq!(store.movies(ApiVersion::V5).get(m.id).await.unwrap().title, "Sicario");
    assert_eq!(store.movie_actors().get_for_movie(m.id).await.unwrap().len(), 1);
    assert_eq!(store.crew().get(m.id, person.id).await.unwrap().role.as_deref(), Some("Kate Macer"));
}

#[tokio::test]
async fn test_legacy_cast_replacement_drops_mirrored_crew() {
    let store = open_store(Strategy::ExpandDeprecate).await;
    let mut m = movie("Arrival", 2016, &["Drama", "Sci-Fi"]);
    store.movies(ApiVersion::V5).insert(&mut m).await.unwrap();

    let mut amy = Person {
        name: "Amy Adams".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut amy).await.unwrap();
    let mut denis = Person {
        name: "Denis Villeneuve".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut denis).await.unwrap();

    let mut louise = crew_member(m.id, amy.id, CrewType::Actor, Some("Louise Banks"));
    store.crew().insert(&mut louise).await.unwrap();
    let mut director = crew_member(m.id, denis.id, CrewType::Director, None);
    store.crew().insert(&mut director).await.unwrap();

    let mut jeremy = Actor {
        name: "Jeremy Renner".to_string(),
        ..Actor::default()
    };
    store.actors().insert(&mut jeremy).await.unwrap();

    store.movie_actors().delete_for_movie(m.id).await.unwrap();
    let mut ian = MovieActor {
        movie_id: m.id,
        actor_id: jeremy.id,
        role: "Ian Donnelly".to_string(),
        ..MovieActor::default()
    };
    store.movie_actors().insert(&mut ian).await.unwrap();

    assert!(matches!(
        store.crew().get(m.id, amy.id).await,
        Err(CatalogError::RecordNotFound)
    ));
    let crew = store.crew().get_for_movie(m.id).await.unwrap();
    assert_eq!(crew.len(), 2);
    assert_eq!(crew[0].crew_type, CrewType::Director);
    assert_eq!(crew[1].person_name, "Jeremy Renner");
    assert_eq!(crew[1].role.as_deref(), Some("Ian Donnelly"));
}

#[tokio::test]
async fn test_single_legacy_delete_drops_mirrored_crew() {
    let store = open_store(Strategy::Branches).await;
    let mut m = movie("Arrival", 2016, &["Drama"]);
    store.movies(ApiVersion::V5).insert(&mut m).await.unwrap();

    let mut amy = Person {
        name: "Amy Adams".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut amy).await.unwrap();
    let shadow_id = amy.old_actor_id.expect("shadow actor");
    let mut louise = crew_member(m.id, amy.id, CrewType::Actor, Some("Louise Banks"));
    store.crew().insert(&mut louise).await.unwrap();

    store.movie_actors().delete(m.id, shadow_id).await.unwrap();

    assert!(matches!(
        store.crew().get(m.id, amy.id).await,
        Err(CatalogError::RecordNotFound)
    ));
    assert!(store.crew().get_for_movie(m.id).await.unwrap().is_empty());
    assert!(matches!(
        store.movie_actors().delete(m.id, shadow_id).await,
        Err(CatalogError::RecordNotFound)
    ));
}

#[tokio::test]
async fn test_legacy_role_change_reaches_crew() {
    let store = open_store(Strategy::Branches).await;
    let mut m = movie("Arrival", 2016, &["Drama"]);
    store.movies(ApiVersion::V5).insert(&mut m).await.unwrap();

    let mut amy = Person {
        name: "Amy Adams".to_string(),
        ..Person::default()
    };
    store.people().insert(&mut amy).await.unwrap();
    let shadow_id = amy.old_actor_id.expect("shadow actor");
    let mut louise = crew_member(m.id, amy.id, CrewType::Actor, Some("Louise Banks"));
    store.crew().insert(&mut louise).await.unwrap();

    let mut legacy = store.movie_actors().get(m.id, shadow_id).await.unwrap();
    legacy.role = "Dr. Banks".to_string();
    store.movie_actors().update(&mut legacy).await.unwrap();

    let stored = store.crew().get(m.id, amy.id).await.unwrap();
    assert_eq!(stored.role.as_deref(), Some("Dr. Banks"));
    assert_eq!(stored.version, 2);

    let crew = store.crew().get_for_movie(m.id).await.unwrap();
    assert_eq!(crew.len(), 1);
    assert_eq!(crew[0].person_id, Some(amy.id));
    assert_eq!(crew[0].role.as_deref(), Some("Dr. Banks"));
}
