//! Dataset generation collaborator.
//!
//! The admission controller asks a `DatasetSource` for fresh work whenever
//! the queue runs low. Production uses `RandomDatasets`; tests inject a
//! deterministic source.

use crate::config::GridConfig;
use crate::store::types::{Matrix, RawDataset};

use rand::Rng;

/// Anything that can hand out a raw dataset on demand.
pub trait DatasetSource: Send + Sync {
    fn next_dataset(&self, core_id: &str) -> RawDataset;
}

/// Synthesizes datasets of uniform random matrices.
///
/// A dataset of `task_amount + 1` matrices yields exactly `task_amount`
/// reduction units once planned.
pub struct RandomDatasets {
    pub matrix_count: usize,
    pub height: usize,
    pub width: usize,
}

impl RandomDatasets {
    pub fn from_config(config: &GridConfig) -> Self {
        Self {
            matrix_count: config.task_amount + 1,
            height: config.matrix_height,
            width: config.matrix_width,
        }
    }
}

impl DatasetSource for RandomDatasets {
    fn next_dataset(&self, core_id: &str) -> RawDataset {
        let mut rng = rand::thread_rng();

        let matrixes = (0..self.matrix_count)
            .map(|_| generate_matrix(&mut rng, self.height, self.width))
            .collect();

        RawDataset {
            coreid: core_id.to_string(),
            matrixes,
        }
    }
}

fn generate_matrix(rng: &mut impl Rng, height: usize, width: usize) -> Matrix {
    (0..height)
        .map(|_| (0..width).map(|_| rng.gen_range(0.0..10.0)).collect())
        .collect()
}
