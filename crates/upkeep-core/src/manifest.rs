use crate::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Directory names never copied or hashed, at any depth.
pub const IGNORED_DIRS: &[&str] = &[".git", ".venv", "node_modules", "__pycache__", "target"];
/// File names never copied or hashed.
pub const IGNORED_FILES: &[&str] = &[".DS_Store"];

pub fn is_ignored_dir(name: &str) -> bool {
    IGNORED_DIRS.contains(&name)
}

pub fn is_ignored_file(name: &str) -> bool {
    IGNORED_FILES.contains(&name)
}

/// A path → content-hash mapping for one directory tree. BTreeMap keeps the
/// serialized report stable across runs.
pub type Manifest = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// SHA-256 over the full file bytes, lowercase hex, read in 1 MiB chunks.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 1024 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Manifest build
// ---------------------------------------------------------------------------

/// Build a manifest for the tree under `root`, keyed by forward-slash
/// relative paths. Ignored directories are pruned, not descended.
pub fn build_manifest(root: &Path) -> Result<Manifest> {
    build_manifest_pruned(root, &[])
}

/// Like `build_manifest`, but additionally prunes the given directories.
/// Used to keep a scratch area that lives inside the scanned tree out of
/// its own manifest. Prune paths are compared canonically, so relative and
/// absolute spellings of the same directory both match.
pub fn build_manifest_pruned(root: &Path, prune: &[PathBuf]) -> Result<Manifest> {
    let mut manifest = Manifest::new();
    if !root.is_dir() {
        return Ok(manifest);
    }
    let prune: Vec<PathBuf> = prune.iter().filter_map(|p| p.canonicalize().ok()).collect();
    collect(root, root, &prune, &mut manifest)?;
    Ok(manifest)
}

fn is_pruned(path: &Path, prune: &[PathBuf]) -> bool {
    if prune.is_empty() {
        return false;
    }
    match path.canonicalize() {
        Ok(canon) => prune.iter().any(|p| p == &canon),
        Err(_) => false,
    }
}

fn collect(dir: &Path, root: &Path, prune: &[PathBuf], out: &mut Manifest) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if is_ignored_dir(&name) || is_pruned(&path, prune) {
                continue;
            }
            collect(&path, root, prune, out)?;
        } else if file_type.is_file() {
            if is_ignored_file(&name) {
                continue;
            }
            let rel = path
                .strip_prefix(root)
                .expect("entry is always under root")
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.insert(rel, hash_file(&path)?);
        }
        // Symlinks and other special files are skipped.
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Four-way partition of two manifests' key union. The partitions are
/// pairwise disjoint and together cover every key in either manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestDiff {
    /// In incoming only.
    pub added: Vec<String>,
    /// In current only.
    pub removed: Vec<String>,
    /// In both, hashes differ.
    pub changed: Vec<String>,
    /// In both, hashes equal.
    pub unchanged: Vec<String>,
}

pub fn diff(current: &Manifest, incoming: &Manifest) -> ManifestDiff {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut changed = Vec::new();
    let mut unchanged = Vec::new();

    for (path, hash) in incoming {
        match current.get(path) {
            None => added.push(path.clone()),
            Some(existing) if existing != hash => changed.push(path.clone()),
            Some(_) => unchanged.push(path.clone()),
        }
    }
    for path in current.keys() {
        if !incoming.contains_key(path) {
            removed.push(path.clone());
        }
    }
    // BTreeMap iteration is already sorted; removed needs no extra sort either.
    ManifestDiff {
        added,
        removed,
        changed,
        unchanged,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn manifest(pairs: &[(&str, &str)]) -> Manifest {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn hash_file_is_stable_and_content_sensitive() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "hello").unwrap();
        std::fs::write(&b, "hello").unwrap();
        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());

        std::fs::write(&b, "hello!").unwrap();
        assert_ne!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
        assert_eq!(hash_file(&a).unwrap().len(), 64);
    }

    #[test]
    fn build_manifest_uses_relative_posix_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/deep")).unwrap();
        std::fs::write(dir.path().join("top.txt"), "1").unwrap();
        std::fs::write(dir.path().join("sub/deep/leaf.txt"), "2").unwrap();

        let manifest = build_manifest(dir.path()).unwrap();
        let keys: Vec<&String> = manifest.keys().collect();
        assert_eq!(keys, ["sub/deep/leaf.txt", "top.txt"]);
    }

    #[test]
    fn build_manifest_prunes_ignored_dirs_and_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join(".git/objects/blob"), "x").unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        std::fs::write(dir.path().join(".DS_Store"), "x").unwrap();
        std::fs::write(dir.path().join("kept.txt"), "x").unwrap();

        let manifest = build_manifest(dir.path()).unwrap();
        assert_eq!(manifest.len(), 1);
        assert!(manifest.contains_key("kept.txt"));
    }

    #[test]
    fn build_manifest_pruned_skips_given_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("scratch/copy")).unwrap();
        std::fs::write(dir.path().join("scratch/copy/f.txt"), "x").unwrap();
        std::fs::write(dir.path().join("real.txt"), "x").unwrap();

        let manifest =
            build_manifest_pruned(dir.path(), &[dir.path().join("scratch")]).unwrap();
        assert_eq!(manifest.len(), 1);
        assert!(manifest.contains_key("real.txt"));
    }

    #[test]
    fn build_manifest_missing_root_is_empty() {
        let manifest = build_manifest(Path::new("/nonexistent/tree")).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn diff_partitions_cover_union_disjointly() {
        let current = manifest(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let incoming = manifest(&[("b", "2"), ("c", "9"), ("d", "4")]);
        let d = diff(&current, &incoming);

        assert_eq!(d.added, ["d"]);
        assert_eq!(d.removed, ["a"]);
        assert_eq!(d.changed, ["c"]);
        assert_eq!(d.unchanged, ["b"]);

        // Complete, disjoint cover of the key union.
        let union: BTreeSet<&String> = current.keys().chain(incoming.keys()).collect();
        let mut partitioned: Vec<&String> = d
            .added
            .iter()
            .chain(&d.removed)
            .chain(&d.changed)
            .chain(&d.unchanged)
            .collect();
        partitioned.sort();
        let as_set: BTreeSet<&String> = partitioned.iter().copied().collect();
        assert_eq!(as_set.len(), partitioned.len(), "partitions overlap");
        assert_eq!(as_set, union, "partitions must cover the union exactly");
    }

    #[test]
    fn diff_of_identical_manifests_is_all_unchanged() {
        let m = manifest(&[("a", "1"), ("b", "2")]);
        let d = diff(&m, &m.clone());
        assert!(d.added.is_empty());
        assert!(d.removed.is_empty());
        assert!(d.changed.is_empty());
        assert_eq!(d.unchanged.len(), 2);
    }

    #[test]
    fn diff_lists_are_sorted() {
        let current = manifest(&[("z", "1"), ("m", "1"), ("a", "1")]);
        let incoming = Manifest::new();
        let d = diff(&current, &incoming);
        assert_eq!(d.removed, ["a", "m", "z"]);
    }
}
