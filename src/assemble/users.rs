//! Synthetic users with random names, countries, likes and interests.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::graph::vocab::{Class, Property};
use crate::graph::{Graph, Literal};
use crate::identity::{EntityKind, NodeId};

use super::Universe;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Alba", "Bruno", "Carla", "Chen", "Dario", "Elena", "Emma", "Farid", "Grace",
    "Hugo", "Ines", "Ivan", "Jonas", "Julia", "Kofi", "Laia", "Liam", "Marta", "Mateo", "Nadia",
    "Noah", "Olga", "Pau", "Priya", "Rosa", "Sami", "Sofia", "Tomas", "Uma", "Victor", "Yara",
    "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Alvarez", "Bauer", "Costa", "Dubois", "Eriksen", "Ferrer", "Garcia", "Haddad", "Ibarra",
    "Jensen", "Kowalski", "Lopez", "Martin", "Nakamura", "Okafor", "Petrov", "Quintana", "Rossi",
    "Schmidt", "Tanaka", "Usman", "Vidal", "Weber", "Xu", "Young", "Zamora",
];

/// Liked items of each kind: between 1 and 3.
const LIKES: (usize, usize) = (1, 3);
/// Interested keywords: between 1 and 5.
const INTERESTS: (usize, usize) = (1, 5);

/// Synthesize `count` users referencing nodes of `universe`.
///
/// Every sample is clamped to the size of its pool, so a small pool yields
/// fewer likes and an empty pool yields none.
pub fn synthesize(count: usize, universe: &Universe, rng: &mut impl Rng) -> Graph {
    let mut g = Graph::new();
    for i in 0..count {
        let subject = EntityKind::User.node(i as i64);
        g.add_type(&subject, Class::User);
        g.add(&subject, Property::UserName, Literal::string(full_name(rng)));

        if let Some(country) = universe.countries.choose(rng) {
            g.add(&subject, Property::UserCountry, country);
        }
        for (property, pool) in [
            (Property::LikesMovie, &universe.films),
            (Property::LikesGenre, &universe.genres),
            (Property::LikesTeam, &universe.teams),
            (Property::LikesCompetition, &universe.competitions),
        ] {
            link_sample(&mut g, &subject, property, pool, LIKES, rng);
        }
        link_sample(
            &mut g,
            &subject,
            Property::InterestedIn,
            &universe.keywords,
            INTERESTS,
            rng,
        );
    }
    tracing::debug!(count, "synthesized users");
    g
}

fn full_name(rng: &mut impl Rng) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
    format!("{first} {last}")
}

/// Link `subject` to a sample without replacement drawn from `pool`.
fn link_sample(
    g: &mut Graph,
    subject: &NodeId,
    property: Property,
    pool: &[NodeId],
    (min, max): (usize, usize),
    rng: &mut impl Rng,
) {
    let wanted = rng.gen_range(min..=max);
    let amount = wanted.min(pool.len());
    for node in pool.choose_multiple(rng, amount) {
        g.add(subject, property, node);
    }
}
