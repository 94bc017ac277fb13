//! Physical layout descriptors.
//!
//! A [`Layout`] says, for one strategy and one API version, which tables and
//! columns hold each logical field. Repositories build their SQL from it, so
//! adding a version means adding a table entry here rather than new code.

use crate::domain::{ApiVersion, Strategy};

/// Where an optional movie column lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Home {
    /// On the movie table itself.
    Base,
    /// On a satellite table keyed by the movie id.
    Branch(&'static str),
}

/// Optional movie attributes that appeared after the first version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Genres,
    Director,
    Runtime,
    Language,
}

impl Extension {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Genres => "genres",
            Self::Director => "director",
            Self::Runtime => "runtime",
            Self::Language => "language",
        }
    }
}

/// A table whose rows must go when the referenced movie goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependent {
    pub table: &'static str,
    pub key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieLayout {
    pub table: &'static str,
    /// The single-value `genre` column exists.
    pub legacy_genre: bool,
    pub genres: Option<Home>,
    pub director: Option<Home>,
    pub runtime: Option<Home>,
    pub language: Option<Home>,
    pub dependents: &'static [Dependent],
}

impl MovieLayout {
    /// Optional columns present in this layout, in a fixed order.
    #[must_use]
    pub fn extensions(&self) -> Vec<(Extension, Home)> {
        [
            (Extension::Genres, self.genres),
            (Extension::Director, self.director),
            (Extension::Runtime, self.runtime),
            (Extension::Language, self.language),
        ]
        .into_iter()
        .filter_map(|(ext, home)| home.map(|h| (ext, h)))
        .collect()
    }

    #[must_use]
    pub fn base_extensions(&self) -> Vec<Extension> {
        self.extensions()
            .into_iter()
            .filter(|(_, home)| *home == Home::Base)
            .map(|(ext, _)| ext)
            .collect()
    }

    /// Branch tables with the columns each one carries, in first-seen order.
    #[must_use]
    pub fn branches(&self) -> Vec<(&'static str, Vec<Extension>)> {
        let mut grouped: Vec<(&'static str, Vec<Extension>)> = Vec::new();
        for (ext, home) in self.extensions() {
            if let Home::Branch(table) = home {
                match grouped.iter_mut().find(|(t, _)| *t == table) {
                    Some((_, cols)) => cols.push(ext),
                    None => grouped.push((table, vec![ext])),
                }
            }
        }
        grouped
    }

    #[must_use]
    pub const fn has(&self, ext: Extension) -> bool {
        match ext {
            Extension::Genres => self.genres.is_some(),
            Extension::Director => self.director.is_some(),
            Extension::Runtime => self.runtime.is_some(),
            Extension::Language => self.language.is_some(),
        }
    }
}

/// Actor, person and association tables of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditTables {
    pub actors: &'static str,
    pub movie_actors: &'static str,
    pub people: &'static str,
    pub crew: &'static str,
    /// Crew rows of type Actor are mirrored into `movie_actors`, and legacy
    /// rows show up in a movie's crew. Only possible when both association
    /// tables reference the same movie table.
    pub crew_mirrors_legacy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub strategy: Strategy,
    pub version: ApiVersion,
    pub movies: MovieLayout,
    pub credits: CreditTables,
}

const VIEWS_CREDITS: CreditTables = CreditTables {
    actors: "actors_v1",
    movie_actors: "movie_actors_v1",
    people: "people_v1",
    crew: "crew_v1",
    crew_mirrors_legacy: false,
};

const SHARED_CREDITS: CreditTables = CreditTables {
    actors: "actors",
    movie_actors: "movie_actors",
    people: "people",
    crew: "crew",
    crew_mirrors_legacy: true,
};

const VIEWS_V4_DEPENDENTS: &[Dependent] = &[Dependent {
    table: "movie_actors_v1",
    key: "movie_id",
}];

const VIEWS_V5_DEPENDENTS: &[Dependent] = &[Dependent {
    table: "crew_v1",
    key: "movie_id",
}];

const EXPAND_DEPRECATE_DEPENDENTS: &[Dependent] = &[
    Dependent {
        table: "movie_actors",
        key: "movie_id",
    },
    Dependent {
        table: "crew",
        key: "movie_id",
    },
];

pub const BRANCH_V2: &str = "movies_branch_v2";
pub const BRANCH_V3: &str = "movies_branch_v3";

const BRANCHES_DEPENDENTS: &[Dependent] = &[
    Dependent {
        table: "movie_actors",
        key: "movie_id",
    },
    Dependent {
        table: "crew",
        key: "movie_id",
    },
    Dependent {
        table: BRANCH_V2,
        key: "id",
    },
    Dependent {
        table: BRANCH_V3,
        key: "id",
    },
];

const fn views_movies(version: ApiVersion) -> MovieLayout {
    let base = Some(Home::Base);
    match version {
        ApiVersion::V1 => MovieLayout {
            table: "movies_v1",
            legacy_genre: true,
            genres: None,
            director: None,
            runtime: None,
            language: None,
            dependents: &[],
        },
        ApiVersion::V2 => MovieLayout {
            table: "movies_v2",
            legacy_genre: true,
            genres: None,
            director: base,
            runtime: base,
            language: base,
            dependents: &[],
        },
        ApiVersion::V3 => MovieLayout {
            table: "movies_v3",
            legacy_genre: false,
            genres: base,
            director: base,
            runtime: base,
            language: base,
            dependents: &[],
        },
        ApiVersion::V4 => MovieLayout {
            table: "movies_v4",
            legacy_genre: false,
            genres: base,
            director: base,
            runtime: base,
            language: base,
            dependents: VIEWS_V4_DEPENDENTS,
        },
        ApiVersion::V5 => MovieLayout {
            table: "movies_v5",
            legacy_genre: false,
            genres: base,
            director: None,
            runtime: base,
            language: base,
            dependents: VIEWS_V5_DEPENDENTS,
        },
    }
}

/// One table; every column added so far stays and is written.
const fn expand_deprecate_movies(version: ApiVersion) -> MovieLayout {
    let base = Some(Home::Base);
    let details = if version.has_details() { base } else { None };
    MovieLayout {
        table: "movies",
        legacy_genre: true,
        genres: if version.has_genre_list() { base } else { None },
        director: details,
        runtime: details,
        language: details,
        dependents: EXPAND_DEPRECATE_DEPENDENTS,
    }
}

/// Stable base table; v2 columns in one branch, the genre list in another.
const fn branches_movies(version: ApiVersion) -> MovieLayout {
    let v2 = if version.has_details() {
        Some(Home::Branch(BRANCH_V2))
    } else {
        None
    };
    MovieLayout {
        table: "movies",
        legacy_genre: true,
        genres: if version.has_genre_list() {
            Some(Home::Branch(BRANCH_V3))
        } else {
            None
        },
        director: v2,
        runtime: v2,
        language: v2,
        dependents: BRANCHES_DEPENDENTS,
    }
}

impl Layout {
    #[must_use]
    pub const fn resolve(strategy: Strategy, version: ApiVersion) -> Self {
        let (movies, credits) = match strategy {
            Strategy::Views => (views_movies(version), VIEWS_CREDITS),
            Strategy::ExpandDeprecate => (expand_deprecate_movies(version), SHARED_CREDITS),
            Strategy::Branches => (branches_movies(version), SHARED_CREDITS),
        };
        Self {
            strategy,
            version,
            movies,
            credits,
        }
    }

    /// The director column exists but clients do not write it; it follows
    /// the movie's first Director crew member instead.
    #[must_use]
    pub const fn derives_director(&self) -> bool {
        self.movies.director.is_some() && !self.version.has_director()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_use_one_table_per_version() {
        let tables: Vec<_> = ApiVersion::ALL
            .iter()
            .map(|v| Layout::resolve(Strategy::Views, *v).movies.table)
            .collect();
        assert_eq!(
            tables,
            ["movies_v1", "movies_v2", "movies_v3", "movies_v4", "movies_v5"]
        );
    }

    #[test]
    fn test_views_v5_drops_director() {
        let layout = Layout::resolve(Strategy::Views, ApiVersion::V5);
        assert!(layout.movies.director.is_none());
        assert!(!layout.derives_director());
        assert!(!layout.movies.legacy_genre);
    }

    #[test]
    fn test_expand_deprecate_keeps_legacy_genre_everywhere() {
        for version in ApiVersion::ALL {
            let layout = Layout::resolve(Strategy::ExpandDeprecate, version);
            assert_eq!(layout.movies.table, "movies");
            assert!(layout.movies.legacy_genre);
            assert!(layout.movies.branches().is_empty());
        }
        assert!(Layout::resolve(Strategy::ExpandDeprecate, ApiVersion::V5).derives_director());
    }

    #[test]
    fn test_branches_group_columns_by_satellite() {
        let layout = Layout::resolve(Strategy::Branches, ApiVersion::V3);
        let branches = layout.movies.branches();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].0, BRANCH_V3);
        assert_eq!(branches[0].1, vec![Extension::Genres]);
        assert_eq!(branches[1].0, BRANCH_V2);
        assert_eq!(
            branches[1].1,
            vec![Extension::Director, Extension::Runtime, Extension::Language]
        );
        assert!(layout.movies.base_extensions().is_empty());
    }

    #[test]
    fn test_branches_v1_reads_base_only() {
        let layout = Layout::resolve(Strategy::Branches, ApiVersion::V1);
        assert!(layout.movies.extensions().is_empty());
        assert_eq!(layout.movies.dependents.len(), 4);
    }

    #[test]
    fn test_only_shared_tables_mirror_legacy_credits() {
        assert!(!Layout::resolve(Strategy::Views, ApiVersion::V5).credits.crew_mirrors_legacy);
        assert!(Layout::resolve(Strategy::Branches, ApiVersion::V5).credits.crew_mirrors_legacy);
    }
}
