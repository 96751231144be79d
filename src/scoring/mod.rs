/// Scoring layer: model artifacts and the scoring function.
///
/// ```text
///   artifacts/*.json ──► ArtifactStore::load ──► Arc<ArtifactBundle>
///                                                  │
///   RawTable ──► Transformer::transform ──► FeatureMatrix
///                                                  │
///                Classifier::predict_probability ◄─┘
///                          │
///                          ▼
///                     ResultTable
/// ```

pub mod artifacts;
pub mod classifier;
pub mod matrix;
pub mod pipeline;
pub mod scorer;

#[cfg(test)]
pub mod testing;

pub use artifacts::{ArtifactBundle, ArtifactStore};
pub use scorer::score;
