// Isolation forest outlier model
//
// Points that random axis-aligned splits separate from the rest in fewer
// steps get scores closer to 1.
use crate::application::features::FeatureMatrix;
use crate::domain::error::DetectorError;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Fewer rows than this cannot be partitioned meaningfully
pub const MIN_TRAINING_SAMPLES: usize = 8;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Untrained model parameters. Cheap to construct; one per detection call.
#[derive(Debug, Clone, Copy)]
pub struct IsolationForest {
    n_trees: usize,
    max_samples: usize,
    seed: u64,
}

impl IsolationForest {
    pub fn new(n_trees: usize, max_samples: usize, seed: u64) -> Self {
        Self {
            n_trees,
            max_samples,
            seed,
        }
    }

    pub fn fit(&self, matrix: &FeatureMatrix) -> Result<FittedForest, DetectorError> {
        if self.n_trees == 0 {
            return Err(DetectorError::invalid_parameter("n_trees", "must be at least 1"));
        }
        if self.max_samples < 2 {
            return Err(DetectorError::invalid_parameter("max_samples", "must be at least 2"));
        }
        if matrix.len() < MIN_TRAINING_SAMPLES {
            return Err(DetectorError::InsufficientData {
                required: MIN_TRAINING_SAMPLES,
                got: matrix.len(),
            });
        }
        if matrix.width() == 0 {
            return Err(DetectorError::invalid_parameter("features", "rows have no columns"));
        }

        let sample_size = self.max_samples.min(matrix.len());
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let trees = (0..self.n_trees)
            .map(|_| {
                let sample = index::sample(&mut rng, matrix.len(), sample_size).into_vec();
                build(matrix, sample, 0, height_limit, &mut rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FittedForest { trees, sample_size })
    }
}

fn build(
    matrix: &FeatureMatrix,
    rows: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Result<Node, DetectorError> {
    if depth >= height_limit || rows.len() <= 1 {
        return Ok(Node::Leaf { size: rows.len() });
    }

    // Only columns that still vary within this node can split it
    let splittable: Vec<(usize, f64, f64)> = (0..matrix.width())
        .filter_map(|feature| {
            let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                let v = matrix.row(r)[feature];
                (lo.min(v), hi.max(v))
            });
            (max > min).then_some((feature, min, max))
        })
        .collect();

    if splittable.is_empty() {
        return Ok(Node::Leaf { size: rows.len() });
    }

    let (feature, min, max) = splittable[rng.gen_range(0..splittable.len())];
    // Uniform sampling needs the span itself to be representable
    if !(max - min).is_finite() {
        return Err(DetectorError::ModelFitFailure(format!(
            "feature {} spans [{}, {}], wider than f64 can represent",
            feature, min, max
        )));
    }
    let value = rng.gen_range(min..max);
    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&r| matrix.row(r)[feature] < value);

    Ok(Node::Split {
        feature,
        value,
        left: Box::new(build(matrix, left, depth + 1, height_limit, rng)?),
        right: Box::new(build(matrix, right, depth + 1, height_limit, rng)?),
    })
}

#[derive(Debug, Clone)]
pub struct FittedForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl FittedForest {
    /// Anomaly score in (0, 1]. Around 0.5 or below is ordinary.
    pub fn score(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| path_length(tree, row)).sum();
        let mean = total / self.trees.len() as f64;
        2f64.powf(-mean / average_path_length(self.sample_size))
    }

    pub fn score_all(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, DetectorError> {
        matrix
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let score = self.score(row);
                if score.is_finite() {
                    Ok(score)
                } else {
                    Err(DetectorError::ModelFitFailure(format!(
                        "row {} produced a non-finite score",
                        i
                    )))
                }
            })
            .collect()
    }
}

fn path_length(tree: &Node, row: &[f64]) -> f64 {
    let mut node = tree;
    let mut depth = 0.0;
    loop {
        match node {
            Node::Leaf { size } => return depth + average_path_length(*size),
            Node::Split {
                feature,
                value,
                left,
                right,
            } => {
                node = if row[*feature] < *value { left } else { right };
                depth += 1.0;
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
