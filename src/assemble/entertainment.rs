//! Entertainment collections: movies, genres and the release lists.

use crate::graph::vocab::Property;
use crate::graph::{Graph, Literal};
use crate::identity::EntityKind;
use crate::source::{FilmRef, GenreRow, MovieGenreRow, MovieRow};

pub fn movies(rows: &[MovieRow]) -> Graph {
    let mut g = Graph::new();
    for row in rows {
        let Some(id) = row.film_id else { continue };
        let subject = EntityKind::Film.node(id);

        if let Some(title) = row.title.as_deref() {
            g.add(&subject, Property::MovieTitle, Literal::string(title));
        }
        if let Some(original) = row.original_title.as_deref() {
            g.add(&subject, Property::MovieLanguage, Literal::string(original));
        }
        if let Some(date) = row.release_date.as_ref().and_then(|d| d.literal()) {
            g.add(&subject, Property::MovieReleaseDate, date);
        }
        if let Some(revenue) = row.revenue {
            g.add(&subject, Property::MovieRevenue, Literal::integer(revenue));
        }
        if let Some(budget) = row.budget {
            g.add(&subject, Property::MovieBudget, Literal::integer(budget));
        }
        // Runtime arrives as a float column; NaN means unknown.
        if let Some(runtime) = row.runtime.filter(|r| r.is_finite()) {
            g.add(&subject, Property::MovieRuntime, Literal::integer(runtime.trunc() as i64));
        }
        if let Some(adult) = row.adult {
            g.add(&subject, Property::MovieAdult, Literal::boolean(adult));
        }
        if let Some(lit) = row.popularity.and_then(Literal::double) {
            g.add(&subject, Property::MoviePopularity, lit);
        }
        if let Some(lit) = row.vote_average.and_then(Literal::double) {
            g.add(&subject, Property::MovieVoteAvg, lit);
        }
        if let Some(count) = row.vote_count {
            g.add(&subject, Property::MovieVoteCnt, Literal::integer(count));
        }
    }
    g
}

pub fn movie_genres(rows: &[MovieGenreRow]) -> Graph {
    let mut g = Graph::new();
    for row in rows {
        if let (Some(film), Some(genre)) = (row.film_id, row.genre_id) {
            g.add(
                &EntityKind::Film.node(film),
                Property::HasGenre,
                EntityKind::Genre.node(genre),
            );
        }
    }
    g
}

/// Flag every listed film with `property = true`.
pub fn flagged(rows: &[FilmRef], property: Property) -> Graph {
    let mut g = Graph::new();
    for id in rows.iter().filter_map(|r| r.film_id) {
        g.add(&EntityKind::Film.node(id), property, Literal::boolean(true));
    }
    g
}

pub fn genres(rows: &[GenreRow]) -> Graph {
    let mut g = Graph::new();
    for row in rows {
        if let (Some(id), Some(name)) = (row.genre_id, row.name.as_deref()) {
            g.add(&EntityKind::Genre.node(id), Property::GenreName, Literal::string(name));
        }
    }
    g
}
