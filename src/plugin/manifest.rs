use super::api::{PluginError, PluginResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Manifest stored as `package.toml` at the root of every plugin archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name
    pub name: String,

    /// Package version (semantic versioning)
    pub version: String,

    /// Package description
    #[serde(default)]
    pub description: String,

    /// Package author
    #[serde(default)]
    pub author: String,

    /// Package license
    #[serde(default)]
    pub license: Option<String>,

    /// Minimum host version required
    #[serde(default)]
    pub min_host_version: Option<String>,

    /// Archive entry holding the native module, if the package ships code
    #[serde(default)]
    pub library: Option<String>,

    /// Identifiers of the types this package provides, in load order
    #[serde(default)]
    pub types: Vec<String>,
}

impl PackageManifest {
    /// Parse a manifest from TOML text
    pub fn from_toml_str(contents: &str) -> PluginResult<Self> {
        toml::from_str(contents)
            .map_err(|e| PluginError::Invalid(format!("Failed to parse manifest: {}", e)))
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Package name cannot be empty".to_string());
        }

        if !is_valid_semver(&self.version) {
            return Err(format!("Invalid semantic version: {}", self.version));
        }

        if let Some(ref min_version) = self.min_host_version {
            if !is_valid_semver(min_version) {
                return Err(format!("Invalid minimum host version: {}", min_version));
            }
        }

        if let Some(ref library) = self.library {
            if library.is_empty() {
                return Err("Library entry cannot be empty".to_string());
            }
        }

        let mut seen = HashSet::new();
        for id in &self.types {
            if id.trim().is_empty() {
                return Err("Type identifier cannot be empty".to_string());
            }
            if !seen.insert(id.as_str()) {
                return Err(format!("Type '{}' is listed more than once", id));
            }
        }

        Ok(())
    }

    /// Check that `host_version` satisfies `min_host_version`
    pub fn check_host_compat(&self, host_version: &str) -> PluginResult<()> {
        let Some(ref required) = self.min_host_version else {
            return Ok(());
        };

        match (parse_semver(required), parse_semver(host_version)) {
            (Some(required_parts), Some(host_parts)) if host_parts >= required_parts => Ok(()),
            _ => Err(PluginError::VersionMismatch {
                required: required.clone(),
                found: host_version.to_string(),
            }),
        }
    }
}

fn is_valid_semver(version: &str) -> bool {
    parse_semver(version).is_some()
}

fn parse_semver(version: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let major = parts[0].parse().ok()?;
    let minor = parts[1].parse().ok()?;
    let patch = parts[2].parse().ok()?;
    Some((major, minor, patch))
}
