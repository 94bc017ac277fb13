pub mod credit;
pub mod movie;
pub mod person;

pub use credit::{CastDraft, Crew, CrewDraft, MovieActor};
pub use movie::Movie;
pub use person::{Actor, Person};
