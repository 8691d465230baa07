//! Soft size limits on emitted artifacts.

use goban_config::{Platform, SizeBudget};

use crate::Artifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    /// Any single emitted file.
    Asset,
    /// The bundle loaded for one entry point.
    Entrypoint,
}

impl std::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetKind::Asset => write!(f, "asset"),
            BudgetKind::Entrypoint => write!(f, "entrypoint"),
        }
    }
}

/// An artifact over budget. Never fails a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBudgetWarning {
    pub platform: Platform,
    pub kind: BudgetKind,
    pub file_name: String,
    pub size: u64,
    pub limit: u64,
}

impl std::fmt::Display for SizeBudgetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} `{}` is {} bytes, over the {} byte budget",
            self.platform, self.kind, self.file_name, self.size, self.limit
        )
    }
}

/// Check `artifacts` against `budget`. `entry_files` names the artifacts that
/// are entry point bundles. Source maps are ignored.
pub fn check_budget(
    platform: Platform,
    artifacts: &[Artifact],
    entry_files: &[String],
    budget: &SizeBudget,
) -> Vec<SizeBudgetWarning> {
    let mut warnings = Vec::new();

    for artifact in artifacts.iter().filter(|a| !a.is_source_map()) {
        let size = artifact.size();
        if size > budget.max_asset_bytes {
            warnings.push(SizeBudgetWarning {
                platform,
                kind: BudgetKind::Asset,
                file_name: artifact.file_name.clone(),
                size,
                limit: budget.max_asset_bytes,
            });
        }
        if entry_files.contains(&artifact.file_name) && size > budget.max_entrypoint_bytes {
            warnings.push(SizeBudgetWarning {
                platform,
                kind: BudgetKind::Entrypoint,
                file_name: artifact.file_name.clone(),
                size,
                limit: budget.max_entrypoint_bytes,
            });
        }
    }

    for warning in &warnings {
        tracing::warn!(
            platform = %warning.platform,
            file = %warning.file_name,
            size = warning.size,
            limit = warning.limit,
            "{} exceeds size budget",
            warning.kind
        );
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(limit: u64) -> SizeBudget {
        SizeBudget {
            max_asset_bytes: limit,
            max_entrypoint_bytes: limit,
        }
    }

    #[test]
    fn test_under_budget_is_quiet() {
        let artifacts = vec![Artifact::new("goban.js", vec![b'a'; 10])];
        let warnings = check_budget(Platform::Web, &artifacts, &["goban.js".into()], &budget(10));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_over_budget_entry_flags_both_kinds() {
        let artifacts = vec![Artifact::new("goban.js", vec![b'a'; 11])];
        let warnings = check_budget(Platform::Web, &artifacts, &["goban.js".into()], &budget(10));
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].kind, BudgetKind::Asset);
        assert_eq!(warnings[1].kind, BudgetKind::Entrypoint);
        assert!(warnings[0].to_string().contains("11 bytes"));
    }

    #[test]
    fn test_source_maps_are_not_measured() {
        let artifacts = vec![Artifact::new("goban.js.map", vec![b'a'; 100])];
        let warnings = check_budget(Platform::Web, &artifacts, &[], &budget(10));
        assert!(warnings.is_empty());
    }
}
