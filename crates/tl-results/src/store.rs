//! Run storage API.
//!
//! Each run lives in `<root>/<run_id>/` as `manifest.json`, `steps.jsonl`
//! (one JSON record per converged step) and `comparison.csv`.

use crate::types::{ComparisonRecord, RunManifest, StepRecord};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST: &str = "manifest.json";
const STEPS: &str = "steps.jsonl";
const COMPARISON: &str = "comparison.csv";
const COMPARISON_HEADER: &str = "stretch,fem,analytic,difference";

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST).exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, steps: &[StepRecord]) -> ResultsResult<PathBuf> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST), manifest_json)?;

        let mut steps_content = String::new();
        for record in steps {
            steps_content.push_str(&serde_json::to_string(record)?);
            steps_content.push('\n');
        }
        fs::write(run_dir.join(STEPS), steps_content)?;

        let mut csv = String::from(COMPARISON_HEADER);
        csv.push('\n');
        for row in steps.iter().map(ComparisonRecord::from) {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                row.stretch, row.fem, row.analytic, row.difference
            ));
        }
        fs::write(run_dir.join(COMPARISON), csv)?;

        Ok(run_dir)
    }

    fn existing_file(&self, run_id: &str, name: &str) -> ResultsResult<PathBuf> {
        let path = self.run_dir(run_id).join(name);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        Ok(path)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let content = fs::read_to_string(self.existing_file(run_id, MANIFEST)?)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_steps(&self, run_id: &str) -> ResultsResult<Vec<StepRecord>> {
        let content = fs::read_to_string(self.existing_file(run_id, STEPS)?)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(line)?);
            }
        }
        Ok(records)
    }

    pub fn load_comparison(&self, run_id: &str) -> ResultsResult<Vec<ComparisonRecord>> {
        let content = fs::read_to_string(self.existing_file(run_id, COMPARISON)?)?;
        let mut rows = Vec::new();
        for (index, line) in content.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let malformed = |message: String| ResultsError::Malformed {
                file: COMPARISON,
                line: index + 1,
                message,
            };
            let values = line
                .split(',')
                .map(|field| field.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| malformed(e.to_string()))?;
            let [stretch, fem, analytic, difference] = values[..] else {
                return Err(malformed(format!("expected 4 fields, found {}", values.len())));
            };
            rows.push(ComparisonRecord {
                stretch,
                fem,
                analytic,
                difference,
            });
        }
        Ok(rows)
    }

    /// Every stored run, oldest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    runs.push(manifest);
                }
            }
        }
        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
