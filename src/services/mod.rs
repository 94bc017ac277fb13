pub mod credit_service;
pub mod credit_service_impl;
pub mod movie_service;
pub mod movie_service_impl;

pub use credit_service::{ActorService, PersonInput, PersonService};
pub use credit_service_impl::{SeaOrmActorService, SeaOrmPersonService};
pub use movie_service::{MovieDetails, MovieInput, MovieService};
pub use movie_service_impl::SeaOrmMovieService;
