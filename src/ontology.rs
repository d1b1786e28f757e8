//! TBox: the schema statements of the ontology.
//!
//! Domains and ranges come straight from [`Property::domain`] and
//! [`Property::range`], so the schema and the assembler cannot disagree.

use crate::graph::vocab::{
    Class, FOAF_NAME, FOAF_PERSON, Property, RDFS_DOMAIN, RDFS_RANGE, RDFS_SUBCLASS_OF,
    RDFS_SUBPROPERTY_OF,
};
use crate::graph::{Graph, Iri, Statement};

/// Class hierarchy as `(subclass, superclass)` pairs inside the ontology namespace.
pub const SUBCLASSES: &[(Class, Class)] = &[
    (Class::Match, Class::Sports),
    (Class::Competition, Class::Sports),
    (Class::League, Class::Competition),
    (Class::Cup, Class::Competition),
    (Class::Team, Class::Sports),
    (Class::Referee, Class::Sports),
    (Class::Venue, Class::Sports),
    (Class::Movie, Class::Entertainment),
    (Class::Genre, Class::Entertainment),
    (Class::EntertainmentNews, Class::News),
    (Class::EntertainmentNews, Class::Entertainment),
    (Class::SportsNews, Class::News),
    (Class::SportsNews, Class::Sports),
    (Class::TechNews, Class::News),
    (Class::TechNews, Class::Technology),
];

/// Classes whose instances are people.
pub const PERSONS: &[Class] = &[Class::User, Class::Referee, Class::Author];

/// Build the schema graph.
pub fn build() -> Graph {
    let domain = Iri::new(RDFS_DOMAIN);
    let range = Iri::new(RDFS_RANGE);
    let sub_class = Iri::new(RDFS_SUBCLASS_OF);
    let sub_property = Iri::new(RDFS_SUBPROPERTY_OF);

    let mut g = Graph::new();
    for &p in Property::ALL {
        g.insert(Statement::new(p, domain.clone(), p.domain()));
        g.insert(Statement::new(p, range.clone(), p.range().iri()));
        if p.is_person_name() {
            g.insert(Statement::new(p, sub_property.clone(), Iri::new(FOAF_NAME)));
        }
    }
    for &(sub, sup) in SUBCLASSES {
        g.insert(Statement::new(sub, sub_class.clone(), sup));
    }
    for &class in PERSONS {
        g.insert(Statement::new(class, sub_class.clone(), Iri::new(FOAF_PERSON)));
    }
    tracing::debug!(statements = g.len(), "built ontology");
    g
}
