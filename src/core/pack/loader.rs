// ─── Loader Resolver ───
// Normalizes the loader declarations of both manifest formats into one
// `LoaderSpec`, and parses the small identifier grammars used around it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

/// Loader families the pipeline knows how to reason about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    None,
    Forge,
    Fabric,
    Quilt,
    /// Recognized but not installable (e.g. NeoForge).
    Unsupported,
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderKind::None => write!(f, "none"),
            LoaderKind::Forge => write!(f, "forge"),
            LoaderKind::Fabric => write!(f, "fabric"),
            LoaderKind::Quilt => write!(f, "quilt"),
            LoaderKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A resolved `(kind, version)` pair.
///
/// `version` is present exactly when `kind` is Forge, Fabric or Quilt; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSpec {
    kind: LoaderKind,
    version: Option<String>,
    /// Name as declared in the manifest, kept for diagnostics.
    declared: Option<String>,
}

impl LoaderSpec {
    pub fn none() -> Self {
        Self {
            kind: LoaderKind::None,
            version: None,
            declared: None,
        }
    }

    pub fn unsupported(declared: impl Into<String>) -> Self {
        Self {
            kind: LoaderKind::Unsupported,
            version: None,
            declared: Some(declared.into()),
        }
    }

    fn installable(kind: LoaderKind, version: &str, declared: &str) -> Self {
        Self {
            kind,
            version: Some(version.to_string()),
            declared: Some(declared.to_string()),
        }
    }

    pub fn kind(&self) -> LoaderKind {
        self.kind
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn declared(&self) -> Option<&str> {
        self.declared.as_deref()
    }
}

// ── Variant A: `{id, primary}` list ─────────────────

/// One entry of a project-style manifest's `modLoaders` list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeclaredLoader {
    pub id: String,
    #[serde(default)]
    pub primary: bool,
}

/// The entry flagged `primary` wins; with none flagged there is no loader.
pub fn resolve_primary(loaders: &[DeclaredLoader]) -> LauncherResult<LoaderSpec> {
    let Some(primary) = loaders.iter().find(|l| l.primary) else {
        return Ok(LoaderSpec::none());
    };

    let (name, version) = parse_loader_id(&primary.id)?;
    Ok(spec_for(name, version))
}

/// Parse `<name>-<version>` (e.g. `forge-47.2.0`).
///
/// The name is everything before the first `-`; both halves must be
/// non-empty and the name must be alphabetic.
pub fn parse_loader_id(id: &str) -> LauncherResult<(&str, &str)> {
    let invalid = || LauncherError::InvalidLoaderId(id.to_string());

    let (name, version) = id.trim().split_once('-').ok_or_else(invalid)?;
    if name.is_empty() || version.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    Ok((name, version))
}

fn spec_for(name: &str, version: &str) -> LoaderSpec {
    match name.to_ascii_lowercase().as_str() {
        "forge" => LoaderSpec::installable(LoaderKind::Forge, version, name),
        "fabric" => LoaderSpec::installable(LoaderKind::Fabric, version, name),
        "quilt" => LoaderSpec::installable(LoaderKind::Quilt, version, name),
        _ => {
            warn!("Loader '{}' is not supported", name);
            LoaderSpec::unsupported(name)
        }
    }
}

// ── Variant B: dependency map ───────────────────────

/// Dependency keys checked in priority order. Only the first present key
/// is honored.
const DEPENDENCY_PRIORITY: [(&str, LoaderKind); 3] = [
    ("forge", LoaderKind::Forge),
    ("fabric-loader", LoaderKind::Fabric),
    ("quilt-loader", LoaderKind::Quilt),
];

const UNSUPPORTED_DEPENDENCIES: [&str; 1] = ["neoforge"];

/// Resolve a flat `name -> version` dependency map.
pub fn resolve_dependencies(dependencies: &HashMap<String, String>) -> LoaderSpec {
    for (key, kind) in DEPENDENCY_PRIORITY {
        if let Some(version) = dependencies.get(key).filter(|v| !v.is_empty()) {
            return LoaderSpec::installable(kind, version, key);
        }
    }

    for key in UNSUPPORTED_DEPENDENCIES {
        if dependencies.get(key).is_some_and(|v| !v.is_empty()) {
            warn!("Loader '{}' is not supported", key);
            return LoaderSpec::unsupported(key);
        }
    }

    LoaderSpec::none()
}

// ── Version spec grammar ────────────────────────────

/// A user-facing version request, as accepted by `create_profile`.
///
/// ```text
/// 1.20.2                      plain version
/// forge*1.20.2                loader with the catalog's default build
/// fabric*1.20.2
/// quilt*1.20.2
/// 1.12.2-forge-14.23.5.2860   explicit Forge build
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    pub minecraft_version: String,
    pub loader: LoaderKind,
    pub loader_version: Option<String>,
}

impl VersionSpec {
    pub fn parse(spec: &str) -> LauncherResult<Self> {
        let invalid = || LauncherError::InvalidVersionSpec(spec.to_string());
        let spec = spec.trim();

        if let Some((loader, minecraft)) = spec.split_once('*') {
            let loader = match loader {
                "forge" => LoaderKind::Forge,
                "fabric" => LoaderKind::Fabric,
                "quilt" => LoaderKind::Quilt,
                _ => return Err(invalid()),
            };
            if !is_version_token(minecraft) {
                return Err(invalid());
            }
            return Ok(Self {
                minecraft_version: minecraft.to_string(),
                loader,
                loader_version: None,
            });
        }

        if let Some((minecraft, forge)) = spec.split_once("-forge-") {
            if !is_version_token(minecraft) || !is_version_token(forge) {
                return Err(invalid());
            }
            return Ok(Self {
                minecraft_version: minecraft.to_string(),
                loader: LoaderKind::Forge,
                loader_version: Some(forge.to_string()),
            });
        }

        if !is_version_token(spec) {
            return Err(invalid());
        }
        Ok(Self {
            minecraft_version: spec.to_string(),
            loader: LoaderKind::None,
            loader_version: None,
        })
    }
}

fn is_version_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'))
}

// ── Installed id synthesis ──────────────────────────

pub fn forge_version_id(minecraft: &str, forge: &str) -> String {
    format!("{}-forge-{}", minecraft, forge)
}

pub fn fabric_version_id(minecraft: &str, loader: &str) -> String {
    format!("fabric-loader-{}-{}", loader, minecraft)
}

pub fn quilt_version_id(minecraft: &str, loader: &str) -> String {
    format!("quilt-loader-{}-{}", loader, minecraft)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn forge_wins_over_fabric_in_any_order() {
        let a = deps(&[("minecraft", "1.20.1"), ("forge", "X"), ("fabric-loader", "0.15.0")]);
        let b = deps(&[("fabric-loader", "0.15.0"), ("forge", "X"), ("minecraft", "1.20.1")]);

        for map in [a, b] {
            let spec = resolve_dependencies(&map);
            assert_eq!(spec.kind(), LoaderKind::Forge);
            assert_eq!(spec.version(), Some("X"));
        }
    }

    #[test]
    fn fabric_then_quilt() {
        let spec = resolve_dependencies(&deps(&[("quilt-loader", "0.20.0"), ("fabric-loader", "0.15.0")]));
        assert_eq!(spec.kind(), LoaderKind::Fabric);
        assert_eq!(spec.version(), Some("0.15.0"));

        let spec = resolve_dependencies(&deps(&[("quilt-loader", "0.20.0")]));
        assert_eq!(spec.kind(), LoaderKind::Quilt);
    }

    #[test]
    fn neoforge_only_is_unsupported() {
        let spec = resolve_dependencies(&deps(&[("minecraft", "1.20.4"), ("neoforge", "20.4.80")]));
        assert_eq!(spec.kind(), LoaderKind::Unsupported);
        assert_eq!(spec.version(), None);
        assert_eq!(spec.declared(), Some("neoforge"));
    }

    #[test]
    fn empty_neoforge_value_means_no_loader() {
        let spec = resolve_dependencies(&deps(&[("minecraft", "1.20.4"), ("neoforge", "")]));
        assert_eq!(spec, LoaderSpec::none());
    }

    #[test]
    fn plain_dependencies_have_no_loader() {
        let spec = resolve_dependencies(&deps(&[("minecraft", "1.20.1")]));
        assert_eq!(spec, LoaderSpec::none());
    }

    #[test]
    fn primary_entry_wins() {
        let loaders = vec![
            DeclaredLoader {
                id: "fabric-0.14.0".into(),
                primary: false,
            },
            DeclaredLoader {
                id: "forge-47.2.0".into(),
                primary: true,
            },
        ];
        let spec = resolve_primary(&loaders).unwrap();
        assert_eq!(spec.kind(), LoaderKind::Forge);
        assert_eq!(spec.version(), Some("47.2.0"));
    }

    #[test]
    fn no_primary_means_no_loader() {
        let loaders = vec![DeclaredLoader {
            id: "forge-47.2.0".into(),
            primary: false,
        }];
        assert_eq!(resolve_primary(&loaders).unwrap().kind(), LoaderKind::None);
    }

    #[test]
    fn loader_id_grammar() {
        assert_eq!(parse_loader_id("fabric-0.15.0").unwrap(), ("fabric", "0.15.0"));
        assert_eq!(
            parse_loader_id("neoforge-20.4.80-beta").unwrap(),
            ("neoforge", "20.4.80-beta")
        );
        for bad in ["forge", "forge-", "-47.2.0", "1.20-forge", ""] {
            assert!(
                matches!(parse_loader_id(bad), Err(LauncherError::InvalidLoaderId(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn version_spec_grammar() {
        assert_eq!(
            VersionSpec::parse("1.20.2").unwrap(),
            VersionSpec {
                minecraft_version: "1.20.2".into(),
                loader: LoaderKind::None,
                loader_version: None,
            }
        );
        assert_eq!(VersionSpec::parse("fabric*1.20.2").unwrap().loader, LoaderKind::Fabric);
        assert_eq!(VersionSpec::parse("quilt*1.20.2").unwrap().loader, LoaderKind::Quilt);

        let forge = VersionSpec::parse("1.12.2-forge-14.23.5.2860").unwrap();
        assert_eq!(forge.minecraft_version, "1.12.2");
        assert_eq!(forge.loader, LoaderKind::Forge);
        assert_eq!(forge.loader_version.as_deref(), Some("14.23.5.2860"));

        // snapshot ids keep their dashes
        assert_eq!(VersionSpec::parse("1.20.5-pre1").unwrap().loader, LoaderKind::None);

        for bad in ["", "neoforge*1.20.2", "fabric*", "-forge-47.2.0", "1.20 1"] {
            assert!(VersionSpec::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn installed_ids() {
        assert_eq!(forge_version_id("1.12.2", "14.23.5.2860"), "1.12.2-forge-14.23.5.2860");
        assert_eq!(fabric_version_id("1.20.1", "0.15.0"), "fabric-loader-0.15.0-1.20.1");
        assert_eq!(quilt_version_id("1.20.1", "0.20.0"), "quilt-loader-0.20.0-1.20.1");
    }
}
