//! RDF layer backed by oxigraph.
//!
//! Serializes a [`Graph`] to Turtle and offers a local SPARQL store used to
//! read serialized graphs back as flat `(subject, predicate, object)` rows.

use std::io::{Read, Write};

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{GraphName, Literal as OxLiteral, NamedNode, Quad, Term as OxTerm};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::GraphError;
use crate::export::TripleRow;

use super::vocab::PREFIXES;
use super::{Graph, Iri, Statement, Term};

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// The query used to read every statement back.
pub const SELECT_ALL: &str = "SELECT ?s ?p ?o WHERE { ?s ?p ?o . }";

fn named_node(iri: &Iri) -> GraphResult<NamedNode> {
    NamedNode::new(iri.as_str()).map_err(|e| GraphError::InvalidIri {
        iri: iri.as_str().to_string(),
        message: e.to_string(),
    })
}

fn object_term(term: &Term) -> GraphResult<OxTerm> {
    Ok(match term {
        Term::Iri(iri) => named_node(iri)?.into(),
        Term::Literal(lit) => {
            let datatype = named_node(&lit.datatype().iri())?;
            OxLiteral::new_typed_literal(lit.lexical(), datatype).into()
        }
    })
}

/// Convert a statement to an oxigraph quad in the default graph.
pub fn to_quad(statement: &Statement) -> GraphResult<Quad> {
    Ok(Quad::new(
        named_node(&statement.subject)?,
        named_node(&statement.predicate)?,
        object_term(&statement.object)?,
        GraphName::DefaultGraph,
    ))
}

/// Serialize a graph as Turtle with the project prefixes.
///
/// Statements are written in the graph's sorted order, so identical graphs
/// produce identical bytes.
pub fn write_turtle<W: Write>(graph: &Graph, writer: W) -> GraphResult<W> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
    for (prefix, iri) in PREFIXES {
        serializer = serializer
            .with_prefix(*prefix, *iri)
            .map_err(|e| GraphError::InvalidIri {
                iri: (*iri).to_string(),
                message: e.to_string(),
            })?;
    }

    let mut out = serializer.for_writer(writer);
    for statement in graph {
        let quad = to_quad(statement)?;
        out.serialize_quad(&quad)
            .map_err(|e| GraphError::Serialize {
                message: e.to_string(),
            })?;
    }
    out.finish().map_err(|e| GraphError::Serialize {
        message: e.to_string(),
    })
}

/// Serialize a graph to a Turtle file, creating parent directories.
pub fn write_turtle_file(graph: &Graph, path: &std::path::Path) -> GraphResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GraphError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    let file = std::fs::File::create(path).map_err(|e| GraphError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut writer = write_turtle(graph, std::io::BufWriter::new(file))?;
    writer.flush().map_err(|e| GraphError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::info!(
        path = %path.display(),
        statements = graph.len(),
        "serialized graph"
    );
    Ok(())
}

/// Render an oxigraph term as the plain value that goes into a triples table.
fn plain_value(term: &OxTerm) -> String {
    match term {
        OxTerm::NamedNode(n) => n.as_str().to_string(),
        OxTerm::BlankNode(b) => format!("_:{}", b.as_str()),
        OxTerm::Literal(l) => l.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

/// Local, in-memory SPARQL-capable RDF store.
pub struct SparqlStore {
    store: Store,
}

impl SparqlStore {
    /// Create a new in-memory SPARQL store.
    pub fn in_memory() -> GraphResult<Self> {
        let store = Store::new().map_err(|e| GraphError::Sparql {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self { store })
    }

    /// Insert every statement of a graph. Returns the number inserted.
    pub fn load_graph(&self, graph: &Graph) -> GraphResult<usize> {
        for statement in graph {
            let quad = to_quad(statement)?;
            self.store.insert(&quad).map_err(|e| GraphError::Sparql {
                message: format!("insert failed: {e}"),
            })?;
        }
        Ok(graph.len())
    }

    /// Parse Turtle from a reader into the store.
    pub fn load_turtle(&self, reader: impl Read) -> GraphResult<()> {
        self.store
            .load_from_reader(RdfFormat::Turtle, reader)
            .map_err(|e| GraphError::Sparql {
                message: format!("failed to load turtle: {e}"),
            })
    }

    /// Parse a Turtle file into the store.
    pub fn load_turtle_file(&self, path: &std::path::Path) -> GraphResult<()> {
        let file = std::fs::File::open(path).map_err(|e| GraphError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.load_turtle(std::io::BufReader::new(file))
    }

    /// Execute a SPARQL SELECT query and return results as Vec of binding maps.
    pub fn query_select(&self, sparql: &str) -> GraphResult<Vec<Vec<(String, String)>>> {
        let results = self.store.query(sparql).map_err(|e| GraphError::Sparql {
            message: format!("SPARQL query failed: {e}"),
        })?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| GraphError::Sparql {
                        message: format!("solution error: {e}"),
                    })?;
                    let mut row = Vec::new();
                    for (var, term) in solution.iter() {
                        row.push((var.as_str().to_string(), plain_value(term)));
                    }
                    rows.push(row);
                }
                Ok(rows)
            }
            QueryResults::Boolean(b) => Ok(vec![vec![("result".to_string(), b.to_string())]]),
            QueryResults::Graph(_) => Err(GraphError::Sparql {
                message: "CONSTRUCT/DESCRIBE queries not supported via query_select".into(),
            }),
        }
    }

    /// Every statement in the store as plain string rows.
    pub fn select_all(&self) -> GraphResult<Vec<TripleRow>> {
        let results = self.store.query(SELECT_ALL).map_err(|e| GraphError::Sparql {
            message: format!("SPARQL select-all query failed: {e}"),
        })?;

        let QueryResults::Solutions(solutions) = results else {
            return Err(GraphError::Sparql {
                message: "unexpected result type from select-all query".into(),
            });
        };

        let mut rows = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| GraphError::Sparql {
                message: format!("solution error: {e}"),
            })?;
            if let (Some(s), Some(p), Some(o)) = (solution.get("s"), solution.get("p"), solution.get("o")) {
                rows.push(TripleRow {
                    subject: plain_value(s),
                    predicate: plain_value(p),
                    object: plain_value(o),
                });
            }
        }
        Ok(rows)
    }

    /// Number of statements in the store.
    pub fn len(&self) -> GraphResult<usize> {
        self.store.len().map_err(|e| GraphError::Sparql {
            message: format!("failed to count statements: {e}"),
        })
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> GraphResult<bool> {
        self.len().map(|n| n == 0)
    }
}

impl std::fmt::Debug for SparqlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Literal;
    use crate::graph::vocab::{Class, Property};
    use crate::identity::EntityKind;

    fn sample_graph() -> Graph {
        let mut g = Graph::new();
        let m = EntityKind::Match.node(42);
        g.add(&m, Property::MatchHomeTeam, EntityKind::Team.node(7));
        g.add(&m, Property::MatchHomeGoals, Literal::integer(2));
        g.add(&m, Property::MatchStatus, Literal::string("match finished"));
        g.add_type(&EntityKind::User.node(0), Class::User);
        g
    }

    #[test]
    fn turtle_uses_prefixes() {
        let bytes = write_turtle(&sample_graph(), Vec::new()).unwrap();
        let ttl = String::from_utf8(bytes).unwrap();
        assert!(ttl.contains("@prefix dbo: <http://sdm_upc.org/ontology/>"));
        assert!(ttl.contains("dbr:match_42"));
    }

    #[test]
    fn turtle_is_deterministic() {
        let a = write_turtle(&sample_graph(), Vec::new()).unwrap();
        let b = write_turtle(&sample_graph(), Vec::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn turtle_reloads_into_store() {
        let bytes = write_turtle(&sample_graph(), Vec::new()).unwrap();
        let store = SparqlStore::in_memory().unwrap();
        store.load_turtle(bytes.as_slice()).unwrap();
        assert_eq!(store.len().unwrap(), 4);

        let rows = store.select_all().unwrap();
        assert!(rows.iter().any(|r| {
            r.subject == "http://sdm_upc.org/resource/match_42"
                && r.predicate == "http://sdm_upc.org/ontology/match_home_goals"
                && r.object == "2"
        }));
    }

    #[test]
    fn load_graph_counts_statements() {
        let store = SparqlStore::in_memory().unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.load_graph(&sample_graph()).unwrap(), 4);
        assert_eq!(store.len().unwrap(), 4);
    }

    #[test]
    fn query_select_returns_bindings() {
        let store = SparqlStore::in_memory().unwrap();
        store.load_graph(&sample_graph()).unwrap();
        let rows = store
            .query_select(
                "SELECT ?u WHERE { ?u a <http://sdm_upc.org/ontology/User> }",
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].1, "http://sdm_upc.org/resource/user_0");
    }

    #[test]
    fn invalid_iri_is_reported() {
        let mut g = Graph::new();
        g.insert(Statement::new(
            Iri::new("not an iri"),
            Property::TeamName,
            Literal::string("x"),
        ));
        assert!(matches!(
            write_turtle(&g, Vec::new()),
            Err(GraphError::InvalidIri { .. })
        ));
    }
}
