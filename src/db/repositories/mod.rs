pub mod actor;
pub mod crew;
pub mod movie;
pub mod movie_actor;
pub mod person;

pub use actor::ActorRepository;
pub use crew::CrewRepository;
pub use movie::MovieRepository;
pub use movie_actor::MovieActorRepository;
pub use person::PersonRepository;
