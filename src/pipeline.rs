//! Pipeline stages that span more than one subsystem.
//!
//! Each stage crosses an error boundary (source and graph, graph and export,
//! store and export), so results are [`KgResult`]s and the diagnostic of the
//! failing subsystem passes through unchanged.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::assemble::{self, Assembly, AssemblyOptions};
use crate::error::KgResult;
use crate::export;
use crate::graph::sparql::{SparqlStore, write_turtle_file};
use crate::ontology;
use crate::source::{SourceData, SourceDir};
use crate::store::{BindingRow, TripleStoreClient};

/// Write the TBox to `out`; returns the statement count.
pub fn write_ontology(out: &Path) -> KgResult<usize> {
    let graph = ontology::build();
    write_turtle_file(&graph, out)?;
    Ok(graph.len())
}

/// Load the source collections, assemble the ABox and write it to `out`.
pub fn build_abox(
    source: &SourceDir,
    users: usize,
    options: &AssemblyOptions,
    rng: &mut impl Rng,
    out: &Path,
) -> KgResult<(SourceData, Assembly)> {
    let data = SourceData::load_all(source)?;
    let assembly = assemble::assemble(&data, users, options, rng);
    write_turtle_file(&assembly.graph, out)?;
    tracing::info!(path = %out.display(), statements = assembly.graph.len(), "wrote abox");
    Ok((data, assembly))
}

/// Load Turtle files into a fresh in-memory store.
pub fn local_store(turtle: &[PathBuf]) -> KgResult<SparqlStore> {
    let store = SparqlStore::in_memory()?;
    for path in turtle {
        store.load_turtle_file(path)?;
    }
    Ok(store)
}

/// Export the statements of local Turtle files as a triples table.
pub fn export_local(turtle: &[PathBuf], out: &Path) -> KgResult<usize> {
    let rows = local_store(turtle)?.select_all()?;
    export::write_tsv_file(&rows, out)?;
    Ok(rows.len())
}

/// Export every statement of the remote repository as a triples table.
pub fn export_remote(client: &TripleStoreClient, out: &Path) -> KgResult<usize> {
    let rows = client.select_all()?;
    export::write_tsv_file(&rows, out)?;
    Ok(rows.len())
}

/// Run a SELECT or ASK query over local Turtle files.
pub fn query_local(turtle: &[PathBuf], sparql: &str) -> KgResult<Vec<BindingRow>> {
    Ok(local_store(turtle)?.query_select(sparql)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KgError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn write_sources(dir: &Path) {
        let files = [
            ("matches.jsonl", ""),
            ("leagues.json", "[]"),
            ("teams.jsonl", ""),
            ("venues.jsonl", ""),
            (
                "movie.jsonl",
                "{\"film_id\": 550, \"title\": \"Fight Club\", \"release_date\": \"1999-10-15\"}\n",
            ),
            ("movie_genre.jsonl", ""),
            ("genre.jsonl", ""),
            ("sports.jsonl", ""),
            ("entertainment.jsonl", ""),
            ("technology.jsonl", ""),
        ];
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
    }

    #[test]
    fn build_then_query_and_export_locally() {
        let dir = tempfile::TempDir::new().unwrap();
        write_sources(dir.path());
        let abox = dir.path().join("out/abox.ttl");
        let tbox = dir.path().join("out/tbox.ttl");

        let (data, assembly) = build_abox(
            &SourceDir::new(dir.path()),
            2,
            &AssemblyOptions::default(),
            &mut StdRng::seed_from_u64(1),
            &abox,
        )
        .unwrap();
        assert_eq!(data.movies.len(), 1);
        assert!(data.news.iter().all(|c| c.rows.is_empty()));
        assert!(write_ontology(&tbox).unwrap() > 0);

        let files = vec![tbox, abox];
        let rows = query_local(
            &files,
            "SELECT ?t WHERE { <http://sdm_upc.org/resource/film_550> \
             <http://sdm_upc.org/ontology/movie_title> ?t }",
        )
        .unwrap();
        assert_eq!(rows, vec![vec![("t".to_string(), "Fight Club".to_string())]]);

        let table = dir.path().join("out/triples.tsv");
        let exported = export_local(&files, &table).unwrap();
        assert!(exported > assembly.graph.len());
        assert_eq!(export::read_tsv(&table).unwrap().len(), exported);
    }

    #[test]
    fn stage_errors_keep_their_subsystem() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = build_abox(
            &SourceDir::new(dir.path()),
            0,
            &AssemblyOptions::default(),
            &mut StdRng::seed_from_u64(1),
            &dir.path().join("abox.ttl"),
        )
        .unwrap_err();
        assert!(matches!(err, KgError::Source(_)));

        let missing = vec![dir.path().join("missing.ttl")];
        assert!(matches!(query_local(&missing, "ASK {}"), Err(KgError::Graph(_))));
    }
}
