//! Small artifact set shared by the unit tests.

use std::path::Path;

use super::classifier::{GradientBoostedTrees, Node, SplitNode, Tree};
use super::pipeline::{PreprocessingPipeline, Step, Transformer, PIPELINE_VERSION};
use crate::config::ArtifactPaths;

pub const VALID_CSV: &str = "SK_ID_CURR,AMT_INCOME_TOTAL,NAME_CONTRACT_TYPE\n\
                             100,120000,Cash loans\n\
                             101,250000,Revolving loans\n";

pub fn demo_pipeline() -> PreprocessingPipeline {
    PreprocessingPipeline {
        version: PIPELINE_VERSION,
        steps: vec![
            Step::Numeric {
                column: "AMT_INCOME_TOTAL".into(),
                fill: 150_000.0,
                center: 150_000.0,
                scale: 50_000.0,
            },
            Step::Categorical {
                column: "NAME_CONTRACT_TYPE".into(),
                categories: vec!["Cash loans".into(), "Revolving loans".into()],
            },
        ],
    }
}

fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
    Tree {
        nodes: vec![
            Node::Split(SplitNode {
                feature,
                threshold,
                left: 1,
                right: 2,
                default_left: true,
            }),
            Node::Leaf(left),
            Node::Leaf(right),
        ],
    }
}

/// Low income and cash loans push the margin up.
pub fn demo_model() -> GradientBoostedTrees {
    GradientBoostedTrees {
        num_features: 3,
        init_score: -1.5,
        trees: vec![stump(0, 0.0, 0.6, -0.4), stump(1, 0.5, -0.3, 0.3)],
    }
}

/// Write the demo artifacts under `root/artifacts/` and return their paths.
pub fn write_artifacts(root: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths::under(root);
    std::fs::create_dir_all(root.join("artifacts")).unwrap();

    let pipeline = demo_pipeline();
    std::fs::write(&paths.pipeline, serde_json::to_string(&pipeline).unwrap()).unwrap();
    std::fs::write(
        &paths.feature_names,
        serde_json::to_string(&pipeline.output_names()).unwrap(),
    )
    .unwrap();
    std::fs::write(&paths.classifier, serde_json::to_string(&demo_model()).unwrap()).unwrap();
    paths
}
