// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # letstalk-kg
//!
//! Knowledge-graph pipeline for the LetsTalk recommender: sports, movies and
//! news from a trusted data zone become an RDF graph, are loaded into a
//! triple store, exported as a triples table and analysed through trained
//! entity embeddings.
//!
//! ## Architecture
//!
//! - **Identity** (`identity`): deterministic node identifiers from natural keys
//! - **Keywords** (`keywords`): TF-IDF keyword extraction per news collection
//! - **Assembly** (`assemble`): source rows to statements, one pure step per collection
//! - **Graph** (`graph`): statement set, vocabulary, Turtle and local SPARQL via `oxigraph`
//! - **Ontology** (`ontology`): the TBox built from the vocabulary
//! - **Store** (`store`): upload and query a remote repository over HTTP
//! - **Export** (`export`): the tab-separated triples table
//! - **Analysis** (`analysis`): user clustering over entity embeddings
//! - **Pipeline** (`pipeline`): stages spanning subsystems, returning [`error::KgResult`]
//!
//! ## Library usage
//!
//! ```no_run
//! use letstalk_kg::assemble::{assemble, AssemblyOptions};
//! use letstalk_kg::graph::sparql::write_turtle_file;
//! use letstalk_kg::source::{SourceData, SourceDir};
//! use rand::SeedableRng;
//!
//! let data = SourceData::load_all(&SourceDir::new("data/trusted")).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let out = assemble(&data, 100, &AssemblyOptions::default(), &mut rng);
//! write_turtle_file(&out.graph, std::path::Path::new("abox.ttl")).unwrap();
//! ```

pub mod analysis;
pub mod assemble;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod identity;
pub mod keywords;
pub mod ontology;
pub mod pipeline;
pub mod source;
pub mod store;
