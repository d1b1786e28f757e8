//! Dense numerics for user clustering: standard scaling, PCA, DBSCAN.
//!
//! Matrices are row-major `Vec<Vec<f64>>` with one row per sample. The
//! sizes involved (hundreds of users, embedding widths in the low hundreds)
//! keep everything in memory and single-pass friendly.

/// Label DBSCAN gives points that belong to no cluster.
pub const NOISE: i64 = -1;

const POWER_ITERATIONS: usize = 1000;
const TOLERANCE: f64 = 1e-12;

/// Center each column to zero mean and unit (population) variance.
///
/// Constant columns are centered but left unscaled.
pub fn standard_scale(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let Some(width) = rows.first().map(Vec::len) else {
        return Vec::new();
    };
    let n = rows.len() as f64;
    let mean = column_means(rows, width);
    let std: Vec<f64> = (0..width)
        .map(|j| {
            let var = rows.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n;
            let sd = var.sqrt();
            if sd > 0.0 { sd } else { 1.0 }
        })
        .collect();
    rows.iter()
        .map(|r| (0..width).map(|j| (r[j] - mean[j]) / std[j]).collect())
        .collect()
}

fn column_means(rows: &[Vec<f64>], width: usize) -> Vec<f64> {
    let n = rows.len() as f64;
    (0..width)
        .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
        .collect()
}

/// Principal component analysis fitted on one matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Pca {
    mean: Vec<f64>,
    /// Unit principal axes, strongest first.
    components: Vec<Vec<f64>>,
    explained_variance: Vec<f64>,
}

impl Pca {
    /// Fit up to `n_components` axes by power iteration on the covariance
    /// matrix, deflating after each axis.
    ///
    /// Each axis is signed so its largest-magnitude coordinate is positive,
    /// which makes projections reproducible.
    pub fn fit(rows: &[Vec<f64>], n_components: usize) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let mean = if rows.is_empty() {
            Vec::new()
        } else {
            column_means(rows, width)
        };
        let mut cov = covariance(rows, &mean);

        let mut pairs: Vec<(f64, Vec<f64>)> = Vec::new();
        for _ in 0..n_components.min(width) {
            let Some((value, vector)) = dominant_eigenpair(&cov) else {
                break;
            };
            for i in 0..width {
                for j in 0..width {
                    cov[i][j] -= value * vector[i] * vector[j];
                }
            }
            pairs.push((value, vector));
        }
        // Power iteration can settle on a smaller eigenvalue first.
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));
        let (explained_variance, components) = pairs.into_iter().unzip();
        Self {
            mean,
            components,
            explained_variance,
        }
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Project rows onto the fitted axes.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|r| {
                self.components
                    .iter()
                    .map(|c| {
                        c.iter()
                            .zip(r.iter().zip(&self.mean))
                            .map(|(ci, (x, m))| ci * (x - m))
                            .sum()
                    })
                    .collect()
            })
            .collect()
    }

    pub fn fit_transform(rows: &[Vec<f64>], n_components: usize) -> (Self, Vec<Vec<f64>>) {
        let pca = Self::fit(rows, n_components);
        let projected = pca.transform(rows);
        (pca, projected)
    }
}

fn covariance(rows: &[Vec<f64>], mean: &[f64]) -> Vec<Vec<f64>> {
    let width = mean.len();
    let mut cov = vec![vec![0.0; width]; width];
    if rows.len() < 2 {
        return cov;
    }
    for r in rows {
        for i in 0..width {
            let di = r[i] - mean[i];
            for j in i..width {
                cov[i][j] += di * (r[j] - mean[j]);
            }
        }
    }
    let denom = (rows.len() - 1) as f64;
    for i in 0..width {
        for j in i..width {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Largest eigenvalue and its unit eigenvector of a symmetric PSD matrix.
/// `None` once no variance is left.
fn dominant_eigenpair(matrix: &[Vec<f64>]) -> Option<(f64, Vec<f64>)> {
    let width = matrix.len();
    // Ones with an index ramp avoid the coordinate axes, which are often
    // eigenvectors themselves. The heaviest column is the fallback start.
    let ramp: Vec<f64> = (0..width).map(|i| 1.0 + (i + 1) as f64 / (width + 1) as f64).collect();
    let heaviest = matrix.iter().max_by(|a, b| norm(a).total_cmp(&norm(b)))?.clone();
    [ramp, heaviest]
        .into_iter()
        .find_map(|start| power_iteration(matrix, start))
}

fn power_iteration(matrix: &[Vec<f64>], start: Vec<f64>) -> Option<(f64, Vec<f64>)> {
    let mut v = normalized(start)?;

    let mut value = 0.0;
    for _ in 0..POWER_ITERATIONS {
        let w = mat_vec(matrix, &v);
        let next_value = dot(&v, &w);
        let Some(next) = normalized(w) else { break };
        let delta: f64 = next.iter().zip(&v).map(|(a, b)| (a - b).abs()).sum();
        v = next;
        value = next_value;
        if delta < TOLERANCE {
            break;
        }
    }
    if value <= TOLERANCE {
        return None;
    }

    let pivot = v
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        v.iter_mut().for_each(|x| *x = -*x);
    }
    Some((value, v))
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

fn normalized(v: Vec<f64>) -> Option<Vec<f64>> {
    let n = norm(&v);
    (n > TOLERANCE).then(|| v.into_iter().map(|x| x / n).collect())
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Density-based clustering with Euclidean distance.
///
/// A point is core when at least `min_samples` points (itself included) lie
/// within `eps`. Clusters are numbered from 0 in order of their first core
/// point; a border point joins the first cluster that reaches it; the rest is
/// [`NOISE`].
pub fn dbscan(points: &[Vec<f64>], eps: f64, min_samples: usize) -> Vec<i64> {
    let neighbors: Vec<Vec<usize>> = points
        .iter()
        .map(|p| {
            points
                .iter()
                .enumerate()
                .filter(|(_, q)| euclidean(p, q) <= eps)
                .map(|(j, _)| j)
                .collect()
        })
        .collect();
    let core: Vec<bool> = neighbors.iter().map(|n| n.len() >= min_samples).collect();

    let mut labels = vec![NOISE; points.len()];
    let mut next_label = 0i64;
    for i in 0..points.len() {
        if labels[i] != NOISE || !core[i] {
            continue;
        }
        labels[i] = next_label;
        let mut stack = vec![i];
        while let Some(p) = stack.pop() {
            for &q in &neighbors[p] {
                if labels[q] == NOISE {
                    labels[q] = next_label;
                    if core[q] {
                        stack.push(q);
                    }
                }
            }
        }
        next_label += 1;
    }
    labels
}
