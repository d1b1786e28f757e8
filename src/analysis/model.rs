//! Trained embedding model artifacts.
//!
//! A model directory holds:
//!
//! ```text
//! entity_embeddings.tsv.gz             one row of floats per entity id
//! training_triples/entity_to_id.tsv.gz   header, then `id<TAB>label`
//! training_triples/relation_to_id.tsv.gz header, then `id<TAB>label`
//! ```

use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::AnalysisError;

use super::AnalysisResult;

pub const EMBEDDINGS_FILE: &str = "entity_embeddings.tsv.gz";
pub const ENTITY_TO_ID_FILE: &str = "training_triples/entity_to_id.tsv.gz";
pub const RELATION_TO_ID_FILE: &str = "training_triples/relation_to_id.tsv.gz";

/// Entity embeddings plus the label tables of a trained model.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingModel {
    embeddings: Vec<Vec<f64>>,
    /// `(label, id)` in file order.
    entities: Vec<(String, usize)>,
    relations: Vec<(String, usize)>,
}

impl EmbeddingModel {
    /// Build a model from in-memory parts, validating ids against the matrix.
    pub fn new(
        embeddings: Vec<Vec<f64>>,
        entities: Vec<(String, usize)>,
        relations: Vec<(String, usize)>,
    ) -> AnalysisResult<Self> {
        validate_matrix(&embeddings, "embeddings")?;
        if let Some((label, id)) = entities.iter().find(|(_, id)| *id >= embeddings.len()) {
            return Err(AnalysisError::Malformed {
                path: "entity_to_id".into(),
                message: format!(
                    "entity {label} has id {id} but only {} embeddings exist",
                    embeddings.len()
                ),
            });
        }
        Ok(Self {
            embeddings,
            entities,
            relations,
        })
    }

    /// Load a model directory.
    pub fn load(model_dir: &Path) -> AnalysisResult<Self> {
        let embeddings_path = model_dir.join(EMBEDDINGS_FILE);
        let embeddings = read_gz_lines(&embeddings_path)?
            .into_iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| parse_row(&line, i + 1, &embeddings_path))
            .collect::<AnalysisResult<Vec<_>>>()?;
        validate_matrix(&embeddings, &embeddings_path.display().to_string())?;

        let entities = read_label_table(&model_dir.join(ENTITY_TO_ID_FILE))?;
        let relations = read_label_table(&model_dir.join(RELATION_TO_ID_FILE))?;

        let model = Self::new(embeddings, entities, relations)?;
        tracing::info!(
            dir = %model_dir.display(),
            entities = model.entities.len(),
            relations = model.relations.len(),
            dim = model.dim(),
            "loaded embedding model"
        );
        Ok(model)
    }

    /// Embedding dimension.
    pub fn dim(&self) -> usize {
        self.embeddings.first().map_or(0, Vec::len)
    }

    pub fn embedding(&self, id: usize) -> Option<&[f64]> {
        self.embeddings.get(id).map(Vec::as_slice)
    }

    /// Entity labels with their ids, in table order.
    pub fn entities(&self) -> &[(String, usize)] {
        &self.entities
    }

    pub fn relations(&self) -> &[(String, usize)] {
        &self.relations
    }
}

fn validate_matrix(rows: &[Vec<f64>], origin: &str) -> AnalysisResult<()> {
    let Some(first) = rows.first() else {
        return Err(AnalysisError::Malformed {
            path: origin.to_string(),
            message: "no embeddings".into(),
        });
    };
    if first.is_empty() {
        return Err(AnalysisError::Malformed {
            path: origin.to_string(),
            message: "zero-dimensional embeddings".into(),
        });
    }
    if let Some(i) = rows.iter().position(|r| r.len() != first.len()) {
        return Err(AnalysisError::Malformed {
            path: origin.to_string(),
            message: format!(
                "row {} has {} values, expected {}",
                i + 1,
                rows[i].len(),
                first.len()
            ),
        });
    }
    Ok(())
}

fn read_gz_lines(path: &Path) -> AnalysisResult<Vec<String>> {
    if !path.is_file() {
        return Err(AnalysisError::NotFound {
            path: path.display().to_string(),
        });
    }
    let file = std::fs::File::open(path).map_err(|e| read_error(path, e))?;
    BufReader::new(GzDecoder::new(file))
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| read_error(path, e))
}

fn read_error(path: &Path, source: std::io::Error) -> AnalysisError {
    AnalysisError::Read {
        path: path.display().to_string(),
        source,
    }
}

fn parse_row(line: &str, line_no: usize, path: &Path) -> AnalysisResult<Vec<f64>> {
    line.split('\t')
        .map(|v| {
            v.trim().parse::<f64>().map_err(|e| AnalysisError::Malformed {
                path: path.display().to_string(),
                message: format!("line {line_no}: {v:?} is not a number ({e})"),
            })
        })
        .collect()
}

/// Read a `id<TAB>label` table with a header row.
fn read_label_table(path: &Path) -> AnalysisResult<Vec<(String, usize)>> {
    let lines = read_gz_lines(path)?;
    lines
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let malformed = |message: String| AnalysisError::Malformed {
                path: path.display().to_string(),
                message: format!("line {}: {message}", i + 1),
            };
            let (id, label) = line
                .split_once('\t')
                .ok_or_else(|| malformed("expected `id<TAB>label`".into()))?;
            let id = id
                .trim()
                .parse::<usize>()
                .map_err(|e| malformed(format!("bad id {id:?} ({e})")))?;
            Ok((label.to_string(), id))
        })
        .collect()
}
