//! Knowledge graph: statements and the in-memory statement set.
//!
//! - **Statement model** ([`Statement`], [`Term`], [`Literal`]): subject and
//!   predicate are IRIs, the object is an IRI or a typed literal
//! - **Accumulator** ([`Graph`]): an ordered set of statements; inserting the
//!   same statement twice has no further effect
//! - **Vocabulary** ([`vocab`]): namespaces, ontology classes and properties
//! - **RDF layer** ([`sparql`]): Turtle serialization and local SPARQL via `oxigraph`

pub mod sparql;
pub mod vocab;

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::identity::NodeId;

use vocab::{Class, Property, RDF_TYPE, RESOURCE_NS, XSD_NS};

/// An absolute IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// IRI of an instance node in the resource namespace.
    pub fn resource(node: &NodeId) -> Self {
        Self(format!("{RESOURCE_NS}{node}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&NodeId> for Iri {
    fn from(node: &NodeId) -> Self {
        Iri::resource(node)
    }
}

impl From<Class> for Iri {
    fn from(class: Class) -> Self {
        class.iri()
    }
}

impl From<Property> for Iri {
    fn from(property: Property) -> Self {
        property.iri()
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// XSD datatypes used by literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Datatype {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    DateTime,
}

impl Datatype {
    /// Local name in the XSD namespace.
    pub fn local_name(self) -> &'static str {
        match self {
            Datatype::String => "string",
            Datatype::Integer => "integer",
            Datatype::Double => "double",
            Datatype::Boolean => "boolean",
            Datatype::Date => "date",
            Datatype::DateTime => "dateTime",
        }
    }

    pub fn iri(self) -> Iri {
        Iri::new(format!("{XSD_NS}{}", self.local_name()))
    }
}

/// A typed literal, stored in its XSD lexical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    datatype: Datatype,
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            datatype: Datatype::String,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Integer,
        }
    }

    /// A double literal. Returns `None` for NaN and infinities.
    pub fn double(value: f64) -> Option<Self> {
        value.is_finite().then(|| Self {
            // Debug keeps the fractional part ("2.0"), which stays a valid xsd:double.
            lexical: format!("{value:?}"),
            datatype: Datatype::Double,
        })
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Boolean,
        }
    }

    pub fn date(value: NaiveDate) -> Self {
        Self {
            lexical: value.format("%Y-%m-%d").to_string(),
            datatype: Datatype::Date,
        }
    }

    pub fn date_time(value: DateTime<FixedOffset>) -> Self {
        Self {
            lexical: value.to_rfc3339(),
            datatype: Datatype::DateTime,
        }
    }

    /// A dateTime without a timezone, which xsd:dateTime allows.
    pub fn naive_date_time(value: NaiveDateTime) -> Self {
        Self {
            lexical: value.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            datatype: Datatype::DateTime,
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> Datatype {
        self.datatype
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}^^{}", self.lexical, self.datatype.iri())
    }
}

/// Object position of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
}

impl Term {
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            Term::Iri(_) => None,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<&NodeId> for Term {
    fn from(node: &NodeId) -> Self {
        Term::Iri(Iri::resource(node))
    }
}

impl From<NodeId> for Term {
    fn from(node: NodeId) -> Self {
        Term::Iri(Iri::resource(&node))
    }
}

impl From<Class> for Term {
    fn from(class: Class) -> Self {
        Term::Iri(class.iri())
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => iri.fmt(f),
            Term::Literal(lit) => lit.fmt(f),
        }
    }
}

/// A subject-predicate-object fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Term,
}

impl Statement {
    pub fn new(subject: impl Into<Iri>, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Append-only statement set owned by one assembly step.
///
/// Steps return their own `Graph`; the caller merges them with
/// [`Graph::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    statements: BTreeSet<Statement>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a statement. Returns `false` if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    /// Shorthand for inserting `(node, property, object)`.
    pub fn add(&mut self, subject: &NodeId, property: Property, object: impl Into<Term>) -> bool {
        self.insert(Statement::new(subject, property, object))
    }

    /// Shorthand for `(node, rdf:type, class)`.
    pub fn add_type(&mut self, subject: &NodeId, class: Class) -> bool {
        self.insert(Statement::new(subject, Iri::new(RDF_TYPE), class))
    }

    /// Union another graph into this one.
    pub fn merge(&mut self, other: Graph) {
        if self.statements.is_empty() {
            self.statements = other.statements;
        } else {
            self.statements.extend(other.statements);
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// All statements with the given subject.
    pub fn about<'a>(&'a self, subject: &'a Iri) -> impl Iterator<Item = &'a Statement> + 'a {
        self.statements.iter().filter(move |s| &s.subject == subject)
    }

    /// Objects of `(subject, predicate, ?)`.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Iri,
        predicate: &'a Iri,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.about(subject)
            .filter(move |s| &s.predicate == predicate)
            .map(|s| &s.object)
    }
}

impl IntoIterator for Graph {
    type Item = Statement;
    type IntoIter = std::collections::btree_set::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Statement;
    type IntoIter = std::collections::btree_set::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl Extend<Statement> for Graph {
    fn extend<I: IntoIterator<Item = Statement>>(&mut self, iter: I) {
        self.statements.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::EntityKind;

    #[test]
    fn duplicate_insert_is_idempotent() {
        let mut g = Graph::new();
        let team = EntityKind::Team.node(7);
        assert!(g.add(&team, Property::TeamName, Literal::string("Barcelona")));
        assert!(!g.add(&team, Property::TeamName, Literal::string("Barcelona")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn merge_is_union() {
        let team = EntityKind::Team.node(7);
        let mut a = Graph::new();
        a.add(&team, Property::TeamName, Literal::string("Barcelona"));
        let mut b = a.clone();
        b.add_type(&team, Class::Team);

        a.merge(b.clone());
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn resource_iri_uses_resource_namespace() {
        let iri = Iri::resource(&EntityKind::Match.node(42));
        assert_eq!(iri.as_str(), "http://sdm_upc.org/resource/match_42");
    }

    #[test]
    fn double_rejects_non_finite() {
        assert!(Literal::double(f64::NAN).is_none());
        assert!(Literal::double(f64::INFINITY).is_none());
        assert_eq!(Literal::double(2.0).unwrap().lexical(), "2.0");
        assert_eq!(Literal::double(7.25).unwrap().lexical(), "7.25");
    }

    #[test]
    fn date_literals_use_xsd_lexical_forms() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Literal::date(d).lexical(), "2024-03-09");
        let dt = DateTime::parse_from_rfc3339("2023-08-11T19:00:00+00:00").unwrap();
        assert_eq!(Literal::date_time(dt).lexical(), "2023-08-11T19:00:00+00:00");
        let naive = NaiveDate::from_ymd_opt(2023, 8, 11)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        let lit = Literal::naive_date_time(naive);
        assert_eq!(lit.lexical(), "2023-08-11T19:00:00");
        assert_eq!(lit.datatype(), Datatype::DateTime);
    }

    #[test]
    fn objects_filters_by_predicate() {
        let mut g = Graph::new();
        let m = EntityKind::Match.node(1);
        g.add(&m, Property::MatchHomeGoals, Literal::integer(3));
        g.add(&m, Property::MatchAwayGoals, Literal::integer(1));
        let subject = Iri::resource(&m);
        let predicate = Property::MatchHomeGoals.iri();
        let objs: Vec<_> = g.objects(&subject, &predicate).collect();
        assert_eq!(objs, vec![&Term::Literal(Literal::integer(3))]);
    }
}
