//! Writes a demo artifact set (`artifacts/*.json`) and a matching
//! `sample_applicants.csv` so the viewer can be tried end to end.
//!
//! Usage: `generate_artifacts [OUTPUT_DIR]` (defaults to the current directory).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};

/// Numeric columns: (name, fill, center, scale).
const NUMERIC: &[(&str, f64, f64, f64)] = &[
    ("AMT_INCOME_TOTAL", 147_150.0, 168_797.9, 237_123.1),
    ("AMT_CREDIT", 513_531.0, 599_026.0, 402_490.8),
    ("DAYS_BIRTH", -15_750.0, -16_037.0, 4_363.9),
    ("EXT_SOURCE_2", 0.5660, 0.5144, 0.1911),
];

/// Categorical columns: (name, categories).
const CATEGORICAL: &[(&str, &[&str])] = &[
    ("NAME_CONTRACT_TYPE", &["Cash loans", "Revolving loans"]),
    ("CODE_GENDER", &["F", "M"]),
];

/// Must match `config::ArtifactPaths::under`; a config test checks it.
const ARTIFACT_DIR: &str = "artifacts";
const PIPELINE_FILE: &str = "preprocessing_pipeline_v3.json";
const FEATURE_NAMES_FILE: &str = "feature_names_v3.json";
const CLASSIFIER_FILE: &str = "lgbm_optimized_v1.json";

const EXT_SOURCE_2: usize = 3;
const N_TREES: usize = 40;
const TREE_DEPTH: usize = 3;
const N_APPLICANTS: usize = 200;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn feature_names() -> Vec<String> {
    let mut names: Vec<String> = NUMERIC.iter().map(|(n, ..)| n.to_string()).collect();
    for (column, categories) in CATEGORICAL {
        names.extend(categories.iter().map(|c| format!("{column}_{c}")));
    }
    names
}

fn pipeline() -> Value {
    let mut steps: Vec<Value> = NUMERIC
        .iter()
        .map(|&(column, fill, center, scale)| {
            json!({ "kind": "numeric", "column": column, "fill": fill, "center": center, "scale": scale })
        })
        .collect();
    steps.extend(CATEGORICAL.iter().map(|(column, categories)| {
        json!({ "kind": "categorical", "column": column, "categories": categories })
    }));
    json!({ "version": 3, "steps": steps })
}

/// Grow a random tree in pre-order so children always follow their parent.
fn grow(rng: &mut SimpleRng, depth: usize, n_features: usize, nodes: &mut Vec<Value>) -> usize {
    let idx = nodes.len();
    if depth == 0 {
        nodes.push(json!({ "leaf": rng.gauss(0.0, 0.08) }));
        return idx;
    }
    nodes.push(Value::Null);

    let feature = (rng.next_u64() % n_features as u64) as usize;
    // One-hot slots are 0/1; numeric features are standardised.
    let threshold = if feature >= NUMERIC.len() {
        0.5
    } else {
        rng.gauss(0.0, 0.8)
    };
    let left = grow(rng, depth - 1, n_features, nodes);
    let right = grow(rng, depth - 1, n_features, nodes);
    nodes[idx] = json!({
        "split": {
            "feature": feature,
            "threshold": threshold,
            "left": left,
            "right": right,
            "default_left": rng.next_f64() < 0.5,
        }
    });
    idx
}

fn model(rng: &mut SimpleRng, n_features: usize) -> Value {
    // Low external score is the dominant risk driver.
    let mut trees = vec![json!({ "nodes": [
        { "split": { "feature": EXT_SOURCE_2, "threshold": -0.5, "left": 1, "right": 2, "default_left": true } },
        { "leaf": 0.9 },
        { "leaf": -0.4 },
    ]})];
    for _ in 0..N_TREES {
        let mut nodes = Vec::new();
        grow(rng, TREE_DEPTH, n_features, &mut nodes);
        trees.push(json!({ "nodes": nodes }));
    }
    // Base rate of about 8% defaults.
    let init_score = (0.08f64 / 0.92).ln();
    json!({ "num_features": n_features, "init_score": init_score, "trees": trees })
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing artifact")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_sample_csv(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "SK_ID_CURR",
        "NAME_CONTRACT_TYPE",
        "CODE_GENDER",
        "AMT_INCOME_TOTAL",
        "AMT_CREDIT",
        "DAYS_BIRTH",
        "EXT_SOURCE_2",
    ])?;

    for i in 0..N_APPLICANTS {
        let income = rng.gauss(170_000.0, 60_000.0).max(25_000.0).round();
        let credit = (income * rng.gauss(3.5, 1.2).max(0.5)).round();
        let days_birth = -(rng.gauss(43.0, 11.0).clamp(21.0, 69.0) * 365.25).round();
        let ext_source = if rng.next_f64() < 0.05 {
            String::new()
        } else {
            format!("{:.6}", rng.gauss(0.51, 0.19).clamp(0.0, 0.85))
        };

        writer.write_record([
            (100_002 + i).to_string(),
            rng.pick(&["Cash loans", "Cash loans", "Cash loans", "Revolving loans"]).to_string(),
            rng.pick(&["F", "F", "M"]).to_string(),
            format!("{income:.1}"),
            format!("{credit:.1}"),
            days_birth.to_string(),
            ext_source,
        ])?;
    }
    writer.flush().context("flushing sample CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let dir = root.join(ARTIFACT_DIR);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let names = feature_names();

    write_json(&dir.join(PIPELINE_FILE), &pipeline())?;
    write_json(&dir.join(FEATURE_NAMES_FILE), &json!(names))?;
    write_json(&dir.join(CLASSIFIER_FILE), &model(&mut rng, names.len()))?;
    log::info!("Wrote artifacts for {} features to {}", names.len(), dir.display());

    let sample = root.join("sample_applicants.csv");
    write_sample_csv(&sample, &mut rng)?;

    println!(
        "Wrote artifacts to {} and {N_APPLICANTS} applicants to {}",
        dir.display(),
        sample.display()
    );
    Ok(())
}
