//! User clustering over trained knowledge-graph embeddings.
//!
//! Users are the subjects typed `dbo:User` in the triples table. Their
//! embeddings are scaled, reduced with PCA, clustered with DBSCAN and
//! projected to two dimensions for plotting.

pub mod cluster;
pub mod model;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::export::{self, TripleRow};
use crate::graph::vocab::{Class, RDF_TYPE};

pub use cluster::{NOISE, Pca, dbscan, standard_scale};
pub use model::EmbeddingModel;

/// Result type for analysis operations.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

/// Upper bound on the PCA width before clustering.
pub const MAX_COMPONENTS: usize = 50;

/// How users are picked when more than `max_users` are available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMethod {
    /// Uniformly without replacement.
    #[default]
    Random,
    /// The first users in entity-table order.
    First,
}

/// Parameters of one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRequest {
    #[serde(default = "default_eps")]
    pub eps: f64,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Cap on processed users; 0 processes all of them.
    #[serde(default = "default_max_users")]
    pub max_users: usize,
    #[serde(default)]
    pub sampling_method: SamplingMethod,
}

fn default_eps() -> f64 {
    4.0
}
fn default_min_samples() -> usize {
    5
}
fn default_max_users() -> usize {
    100
}

impl Default for ClusterRequest {
    fn default() -> Self {
        Self {
            eps: default_eps(),
            min_samples: default_min_samples(),
            max_users: default_max_users(),
            sampling_method: SamplingMethod::default(),
        }
    }
}

impl ClusterRequest {
    pub fn validate(&self) -> AnalysisResult<()> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(AnalysisError::InvalidParameter {
                message: format!("eps must be a positive number, got {}", self.eps),
            });
        }
        if self.min_samples == 0 {
            return Err(AnalysisError::InvalidParameter {
                message: "min_samples must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Where the analysis stage finds its inputs (`[analysis]` in the config file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default = "default_triples")]
    pub triples: PathBuf,
    /// Defaults for requests that omit parameters.
    #[serde(default)]
    pub request: ClusterRequest,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("data/kg")
}
fn default_triples() -> PathBuf {
    PathBuf::from("data/triples.tsv")
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            triples: default_triples(),
            request: ClusterRequest::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCluster {
    pub user_uri: String,
    pub cluster: i64,
}

/// Echo of the parameters a run used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub eps: f64,
    pub min_samples: usize,
    pub max_users: usize,
    pub total_users_available: usize,
    pub users_processed: usize,
    pub sampling_method: SamplingMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterData {
    /// Users per cluster label, noise included.
    pub cluster_distribution: BTreeMap<i64, usize>,
    pub user_clusters: Vec<UserCluster>,
    pub embeddings_2d: Vec<[f64; 2]>,
    pub cluster_labels: Vec<i64>,
    pub parameters: RunParameters,
}

/// Envelope returned to callers; failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ClusterResponse {
    Success { data: ClusterData },
    Error { message: String },
}

/// IRIs typed `dbo:User` in the table.
pub fn user_entities(triples: &[TripleRow]) -> HashSet<&str> {
    let user = Class::User.iri();
    triples
        .iter()
        .filter(|t| t.predicate == RDF_TYPE && t.object == user.as_str())
        .map(|t| t.subject.as_str())
        .collect()
}

/// Cluster the users of `triples` with `model`'s embeddings.
pub fn perform_clustering(
    model: &EmbeddingModel,
    triples: &[TripleRow],
    request: &ClusterRequest,
    rng: &mut impl Rng,
) -> AnalysisResult<ClusterData> {
    request.validate()?;

    let users = user_entities(triples);
    tracing::info!(total = users.len(), "found users");

    let mut selected: Vec<(&str, usize)> = model
        .entities()
        .iter()
        .filter(|(label, _)| users.contains(label.as_str()))
        .map(|(label, id)| (label.as_str(), *id))
        .collect();

    if request.max_users > 0 && selected.len() > request.max_users {
        tracing::info!(
            limit = request.max_users,
            available = selected.len(),
            method = ?request.sampling_method,
            "limiting users"
        );
        selected = match request.sampling_method {
            SamplingMethod::Random => rand::seq::index::sample(rng, selected.len(), request.max_users)
                .into_iter()
                .map(|i| selected[i])
                .collect(),
            SamplingMethod::First => {
                selected.truncate(request.max_users);
                selected
            }
        };
    }

    if selected.len() < 2 {
        return Err(AnalysisError::TooFewEntities {
            found: selected.len(),
            needed: 2,
        });
    }

    let embeddings: Vec<Vec<f64>> = selected
        .iter()
        .filter_map(|(_, id)| model.embedding(*id).map(<[f64]>::to_vec))
        .collect();
    let scaled = standard_scale(&embeddings);

    let n_components = MAX_COMPONENTS.min(selected.len() - 1).min(model.dim());
    let (_, reduced) = Pca::fit_transform(&scaled, n_components);

    tracing::info!(
        users = selected.len(),
        components = n_components,
        eps = request.eps,
        min_samples = request.min_samples,
        "running DBSCAN"
    );
    let labels = dbscan(&reduced, request.eps, request.min_samples);

    let mut cluster_distribution = BTreeMap::new();
    for &label in &labels {
        *cluster_distribution.entry(label).or_insert(0) += 1;
    }

    let (_, planar) = Pca::fit_transform(&reduced, 2);
    let embeddings_2d = planar
        .iter()
        .map(|p| [p.first().copied().unwrap_or(0.0), p.get(1).copied().unwrap_or(0.0)])
        .collect();

    Ok(ClusterData {
        cluster_distribution,
        user_clusters: selected
            .iter()
            .zip(&labels)
            .map(|((uri, _), &cluster)| UserCluster {
                user_uri: uri.to_string(),
                cluster,
            })
            .collect(),
        embeddings_2d,
        cluster_labels: labels,
        parameters: RunParameters {
            eps: request.eps,
            min_samples: request.min_samples,
            max_users: request.max_users,
            total_users_available: users.len(),
            users_processed: selected.len(),
            sampling_method: request.sampling_method,
        },
    })
}

/// Load the model and triples table, cluster, and wrap the outcome.
pub fn run_clustering(
    model_dir: &Path,
    triples_path: &Path,
    request: &ClusterRequest,
    rng: &mut impl Rng,
) -> ClusterResponse {
    let outcome = EmbeddingModel::load(model_dir).and_then(|model| {
        let triples = export::read_tsv(triples_path)?;
        perform_clustering(&model, &triples, request, rng)
    });
    match outcome {
        Ok(data) => ClusterResponse::Success { data },
        Err(e) => {
            tracing::warn!(error = %e, "clustering failed");
            ClusterResponse::Error {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const USER: &str = "http://sdm_upc.org/ontology/User";

    fn typed_user(i: usize) -> TripleRow {
        TripleRow {
            subject: format!("http://sdm_upc.org/resource/user_{i}"),
            predicate: RDF_TYPE.into(),
            object: USER.into(),
        }
    }

    /// Two tight groups of users plus one non-user entity.
    fn fixture(users: usize) -> (EmbeddingModel, Vec<TripleRow>) {
        let mut embeddings = Vec::new();
        let mut entities = Vec::new();
        for i in 0..users {
            let base = if i % 2 == 0 { 0.0 } else { 10.0 };
            let jitter = i as f64 * 0.001;
            embeddings.push(vec![base + jitter, base - jitter, base, 1.0]);
            entities.push((format!("http://sdm_upc.org/resource/user_{i}"), i));
        }
        embeddings.push(vec![5.0, 5.0, 5.0, 1.0]);
        entities.push(("http://sdm_upc.org/resource/team_7".into(), users));
        let model = EmbeddingModel::new(embeddings, entities, Vec::new()).unwrap();
        let triples = (0..users).map(typed_user).collect();
        (model, triples)
    }

    #[test]
    fn request_defaults_fill_missing_fields() {
        let req: ClusterRequest = serde_json::from_str(r#"{"eps": 2.5}"#).unwrap();
        assert_eq!(req.eps, 2.5);
        assert_eq!(req.min_samples, 5);
        assert_eq!(req.max_users, 100);
        assert_eq!(req.sampling_method, SamplingMethod::Random);
    }

    #[test]
    fn clusters_two_groups() {
        let (model, triples) = fixture(12);
        let req = ClusterRequest {
            eps: 1.0,
            min_samples: 3,
            max_users: 0,
            sampling_method: SamplingMethod::First,
        };
        let data = perform_clustering(&model, &triples, &req, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(data.parameters.users_processed, 12);
        assert_eq!(data.parameters.total_users_available, 12);
        assert_eq!(data.cluster_distribution.len(), 2);
        assert_eq!(data.cluster_distribution.values().sum::<usize>(), 12);
        assert_eq!(data.embeddings_2d.len(), 12);
        // Same group, same label.
        assert_eq!(data.cluster_labels[0], data.cluster_labels[2]);
        assert_ne!(data.cluster_labels[0], data.cluster_labels[1]);
        assert!(data.user_clusters.iter().all(|u| u.user_uri.contains("user_")));
    }

    #[test]
    fn first_sampling_keeps_table_order() {
        let (model, triples) = fixture(10);
        let req = ClusterRequest {
            max_users: 4,
            sampling_method: SamplingMethod::First,
            ..Default::default()
        };
        let data = perform_clustering(&model, &triples, &req, &mut StdRng::seed_from_u64(1)).unwrap();
        let uris: Vec<_> = data.user_clusters.iter().map(|u| u.user_uri.as_str()).collect();
        assert_eq!(
            uris,
            (0..4)
                .map(|i| format!("http://sdm_upc.org/resource/user_{i}"))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn random_sampling_is_without_replacement() {
        let (model, triples) = fixture(20);
        let req = ClusterRequest {
            max_users: 8,
            ..Default::default()
        };
        let data = perform_clustering(&model, &triples, &req, &mut StdRng::seed_from_u64(9)).unwrap();
        let unique: HashSet<_> = data.user_clusters.iter().map(|u| &u.user_uri).collect();
        assert_eq!(unique.len(), 8);
        assert_eq!(data.parameters.total_users_available, 20);
    }

    #[test]
    fn single_user_is_rejected() {
        let (model, triples) = fixture(1);
        let err = perform_clustering(&model, &triples, &ClusterRequest::default(), &mut StdRng::seed_from_u64(1));
        assert!(matches!(err, Err(AnalysisError::TooFewEntities { found: 1, .. })));
    }

    #[test]
    fn invalid_eps_is_rejected() {
        let (model, triples) = fixture(4);
        let req = ClusterRequest {
            eps: -1.0,
            ..Default::default()
        };
        let err = perform_clustering(&model, &triples, &req, &mut StdRng::seed_from_u64(1));
        assert!(matches!(err, Err(AnalysisError::InvalidParameter { .. })));
    }

    #[test]
    fn failures_become_error_envelopes() {
        let dir = tempfile::TempDir::new().unwrap();
        let response = run_clustering(
            dir.path(),
            &dir.path().join("triples.tsv"),
            &ClusterRequest::default(),
            &mut StdRng::seed_from_u64(1),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("not found"));
    }

    #[test]
    fn success_envelope_shape() {
        let (model, triples) = fixture(6);
        let req = ClusterRequest {
            min_samples: 2,
            ..Default::default()
        };
        let data = perform_clustering(&model, &triples, &req, &mut StdRng::seed_from_u64(1)).unwrap();
        let json = serde_json::to_value(ClusterResponse::Success { data }).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["parameters"]["sampling_method"], "random");
        assert!(json["data"]["cluster_distribution"].is_object());
    }
}
