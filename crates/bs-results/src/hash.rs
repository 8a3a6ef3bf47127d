//! Content-based hashing for run IDs.

use bs_project::Project;
use sha2::{Digest, Sha256};

/// SHA-256 of the serialized project and the solver version, hex encoded.
///
/// Identical projects run by the same solver version share a run id, which is
/// what makes cached runs reusable.
pub fn compute_run_id(project: &Project, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let project_json = serde_json::to_string(project).unwrap_or_default();
    hasher.update(project_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(rate: f64) -> Project {
        bs_project::parse_yaml(&format!(
            "version: 1\nname: decay\nproblem: {{ type: scalar_decay, rate: {rate} }}\n\
             initial: {{ type: uniform, value: 1.0 }}\nrun: {{ dt: 0.1, end: 1.0 }}\n"
        ))
        .unwrap()
    }

    #[test]
    fn hash_stability() {
        let p = project(1.0);
        let hash1 = compute_run_id(&p, "v1");
        let hash2 = compute_run_id(&p, "v1");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        assert_ne!(
            compute_run_id(&project(1.0), "v1"),
            compute_run_id(&project(2.0), "v1")
        );
        assert_ne!(
            compute_run_id(&project(1.0), "v1"),
            compute_run_id(&project(1.0), "v2")
        );
    }
}
