//! ABox assembly: typed source rows to graph statements.
//!
//! Each collection has a pure function returning its own [`Graph`]; nothing
//! here performs I/O. [`assemble`] runs the independent steps on the rayon
//! pool and unions the results.
//!
//! Ordering within a run:
//!
//! 1. keywords are extracted per news topic
//! 2. the [`Universe`] (identifier pools) is derived from the source rows
//! 3. sports, entertainment and news statements are built in parallel
//! 4. synthetic users are drawn from the universe with the caller's RNG

pub mod entertainment;
pub mod news;
pub mod sports;
pub mod users;

use std::collections::HashSet;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::graph::vocab::Property;
use crate::identity::{EntityKind, NodeId};
use crate::keywords::{self, KeywordExtractor};
use crate::source::{NewsCollection, SourceData};

pub use news::KeywordMatch;

/// Tunables of one assembly run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    /// Keywords extracted per news topic.
    #[serde(default = "default_keywords_per_topic")]
    pub keywords_per_topic: usize,
    #[serde(default)]
    pub keyword_match: KeywordMatch,
}

fn default_keywords_per_topic() -> usize {
    15
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            keywords_per_topic: default_keywords_per_topic(),
            keyword_match: KeywordMatch::default(),
        }
    }
}

/// Node pools synthetic users draw from.
///
/// Pools are deduplicated and keep first-seen order, so a seeded RNG
/// reproduces the same users for the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    pub films: Vec<NodeId>,
    pub genres: Vec<NodeId>,
    pub teams: Vec<NodeId>,
    pub competitions: Vec<NodeId>,
    pub countries: Vec<NodeId>,
    pub keywords: Vec<NodeId>,
}

impl Universe {
    /// Derive the pools from source rows and the per-topic keywords.
    pub fn from_source(data: &SourceData, topic_keywords: &[Vec<String>]) -> Self {
        Self {
            films: dedup(data.movies.iter().filter_map(|r| r.film_id).map(|id| EntityKind::Film.node(id))),
            genres: dedup(data.genres.iter().filter_map(|r| r.genre_id).map(|id| EntityKind::Genre.node(id))),
            teams: dedup(data.teams.iter().filter_map(|r| r.team_id).map(|id| EntityKind::Team.node(id))),
            competitions: dedup(
                data.leagues
                    .iter()
                    .filter_map(|r| r.league_id)
                    .map(|id| EntityKind::Competition.node(id)),
            ),
            // Only coded countries; `World` stays a competition country.
            countries: dedup(
                data.leagues
                    .iter()
                    .filter_map(|r| r.country.as_ref()?.code.as_deref())
                    .map(|code| EntityKind::Country.node(code)),
            ),
            keywords: dedup(
                topic_keywords
                    .iter()
                    .flatten()
                    .map(|k| EntityKind::Keyword.node(k.as_str())),
            ),
        }
    }
}

fn dedup(nodes: impl Iterator<Item = NodeId>) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    nodes.filter(|n| seen.insert(n.clone())).collect()
}

/// Result of an assembly run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub graph: Graph,
    pub universe: Universe,
    /// Keywords per news collection, in collection order.
    pub keywords: Vec<Vec<String>>,
}

/// Keywords of one news collection.
pub fn topic_keywords(collection: &NewsCollection, top_n: usize) -> Vec<String> {
    let documents: Vec<String> = collection
        .rows
        .iter()
        .map(|r| keywords::combine_fields(&r.text_fields()))
        .collect();
    KeywordExtractor::default().extract(&documents, top_n)
}

/// Sports statements: matches, competitions, teams, venues.
pub fn sports_graph(data: &SourceData) -> Graph {
    let mut g = sports::matches(&data.matches);
    g.merge(sports::leagues(&data.leagues));
    g.merge(sports::teams(&data.teams));
    g.merge(sports::venues(&data.venues));
    g
}

/// Entertainment statements: movies, genre links, release lists, genres.
pub fn entertainment_graph(data: &SourceData) -> Graph {
    let mut g = entertainment::movies(&data.movies);
    g.merge(entertainment::movie_genres(&data.movie_genres));
    g.merge(entertainment::flagged(&data.trending, Property::TrendingMovie));
    g.merge(entertainment::flagged(&data.upcoming, Property::UpcomingMovie));
    g.merge(entertainment::flagged(&data.now_playing, Property::NowPlayingMovie));
    g.merge(entertainment::genres(&data.genres));
    g
}

/// Build the full ABox for `data` plus `users` synthetic users.
pub fn assemble(
    data: &SourceData,
    users: usize,
    options: &AssemblyOptions,
    rng: &mut impl Rng,
) -> Assembly {
    let keywords: Vec<Vec<String>> = data
        .news
        .par_iter()
        .map(|c| topic_keywords(c, options.keywords_per_topic))
        .collect();
    for (collection, kws) in data.news.iter().zip(&keywords) {
        tracing::info!(
            topic = collection.topic.collection(),
            keywords = ?kws,
            "extracted topic keywords"
        );
    }

    let universe = Universe::from_source(data, &keywords);

    let (mut graph, (films, articles)) = rayon::join(
        || sports_graph(data),
        || {
            rayon::join(
                || entertainment_graph(data),
                || {
                    data.news
                        .par_iter()
                        .zip(keywords.par_iter())
                        .map(|(c, kws)| news::news(c, kws, options.keyword_match))
                        .collect::<Vec<_>>()
                },
            )
        },
    );
    graph.merge(films);
    for g in articles {
        graph.merge(g);
    }
    graph.merge(users::synthesize(users, &universe, rng));

    tracing::info!(
        statements = graph.len(),
        users,
        films = universe.films.len(),
        teams = universe.teams.len(),
        "assembled graph"
    );
    Assembly {
        graph,
        universe,
        keywords,
    }
}
