use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Arc,
    RwLock,
};

use anyhow::anyhow;
use hashbrown::HashMap;
use log::{
    debug,
    info,
};
use once_cell::sync::OnceCell;
use serde::Serialize;

use super::gtf::load_gtf;
use super::model::GeneModelStore;
use crate::error::{
    AnnotError,
    Result,
};

type StoreSlot = Arc<OnceCell<Arc<GeneModelStore>>>;

/// Maps assembly aliases to the name the gene model is stored under.
/// Names that are not aliases are returned lowercased.
pub fn normalize_assembly(assembly: &str) -> String {
    let lower = assembly.trim().to_lowercase();
    match lower.as_str() {
        "hg19" | "grch37" => "grch37".to_string(),
        "hg38" | "grch38" => "grch38".to_string(),
        "mm10" | "grcm38" => "grcm38".to_string(),
        _ => lower,
    }
}

/// A gene model file found in the model directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub assembly: String,
    pub path:     PathBuf,
    pub loaded:   bool,
}

/// Lazily loaded gene models, one per assembly.
///
/// Models are read from `<dir>/<assembly>.gtf` or `<dir>/<assembly>.gtf.gz`
/// on first use. Concurrent first requests for the same assembly load the
/// file once; a failed load is not remembered.
#[derive(Debug)]
pub struct StoreCache {
    dir:    PathBuf,
    stores: RwLock<HashMap<String, StoreSlot>>,
}

impl StoreCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir:    dir.as_ref().to_path_buf(),
            stores: RwLock::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn poisoned() -> AnnotError {
        AnnotError::store(anyhow!("store cache lock poisoned"))
    }

    /// Path of the model file for a normalised assembly name, if any.
    fn model_path(
        &self,
        assembly: &str,
    ) -> Option<PathBuf> {
        [format!("{assembly}.gtf"), format!("{assembly}.gtf.gz")]
            .into_iter()
            .map(|name| self.dir.join(name))
            .find(|path| path.is_file())
    }

    fn slot(
        &self,
        assembly: &str,
    ) -> Result<StoreSlot> {
        if let Some(slot) = self
            .stores
            .read()
            .map_err(|_| Self::poisoned())?
            .get(assembly)
        {
            return Ok(slot.clone());
        }
        let mut stores = self
            .stores
            .write()
            .map_err(|_| Self::poisoned())?;
        Ok(stores
            .entry(assembly.to_string())
            .or_default()
            .clone())
    }

    /// Returns the store of `assembly`, loading it on first use.
    pub fn get(
        &self,
        assembly: &str,
    ) -> Result<Arc<GeneModelStore>> {
        let name = normalize_assembly(assembly);
        let slot = self.slot(&name)?;
        if let Some(store) = slot.get() {
            debug!("Gene model cache hit for {name}");
            return Ok(store.clone());
        }
        let store = slot.get_or_try_init(|| {
            let path = self
                .model_path(&name)
                .ok_or_else(|| AnnotError::UnknownAssembly(assembly.to_string()))?;
            let store = load_gtf(&path)?;
            info!("Initialised gene model for {name} from {}", path.display());
            Ok::<_, AnnotError>(Arc::new(store))
        })?;
        Ok(store.clone())
    }

    /// Registers a pre-built store, replacing any cached one.
    pub fn insert(
        &self,
        assembly: &str,
        store: GeneModelStore,
    ) -> Result<Arc<GeneModelStore>> {
        let store = Arc::new(store);
        let slot = OnceCell::with_value(store.clone());
        self.stores
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(normalize_assembly(assembly), Arc::new(slot));
        Ok(store)
    }

    /// Gene models present in the model directory, sorted by assembly.
    ///
    /// Only files named `<assembly>.gtf` or `<assembly>.gtf.gz` are listed,
    /// the same names [`get`](Self::get) resolves. When both exist the path
    /// reported is the one `get` would load.
    pub fn available(&self) -> Result<Vec<ModelInfo>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|err| {
            AnnotError::store(anyhow!("cannot list {}: {err}", self.dir.display()))
        })?;
        let mut assemblies = Vec::new();
        for entry in entries {
            let entry = entry.map_err(AnnotError::store)?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let assembly = file_name.to_str().and_then(|name| {
                name.strip_suffix(".gtf.gz")
                    .or_else(|| name.strip_suffix(".gtf"))
            });
            match assembly {
                Some(assembly) if !assembly.is_empty() => {
                    assemblies.push(assembly.to_string())
                },
                _ => {},
            }
        }
        assemblies.sort();
        assemblies.dedup();

        let loaded = self.loaded()?;
        let models = assemblies
            .into_iter()
            .filter_map(|assembly| {
                self.model_path(&assembly).map(|path| {
                    ModelInfo {
                        loaded: loaded.contains(&assembly),
                        assembly,
                        path,
                    }
                })
            })
            .collect::<Vec<_>>();
        debug!("Found {} gene models in {}", models.len(), self.dir.display());
        Ok(models)
    }

    /// Names of the assemblies loaded so far.
    pub fn loaded(&self) -> Result<Vec<String>> {
        let stores = self
            .stores
            .read()
            .map_err(|_| Self::poisoned())?;
        let mut names = stores
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(name, _)| name.clone())
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const GTF: &str = "chr1\ttest\texon\t100\t200\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n";

    #[test]
    fn test_normalize_assembly() {
        assert_eq!(normalize_assembly("hg38"), "grch38");
        assert_eq!(normalize_assembly("GRCh37"), "grch37");
        assert_eq!(normalize_assembly("mm10"), "grcm38");
        assert_eq!(normalize_assembly("dm6"), "dm6");
    }

    #[test]
    fn test_unknown_assembly_is_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StoreCache::new(dir.path());
        let err = cache.get("hg00").unwrap_err();
        assert!(matches!(err, AnnotError::UnknownAssembly(_)));
        assert!(err.is_client_error());
        assert!(cache.loaded().unwrap().is_empty());
    }

    #[test]
    fn test_failed_init_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StoreCache::new(dir.path());
        assert!(cache.get("hg38").is_err());

        fs::write(dir.path().join("grch38.gtf"), GTF).unwrap();
        let store = cache.get("hg38").unwrap();
        assert_eq!(store.n_genes(), 1);
    }

    #[test]
    fn test_aliases_share_one_store() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("grch37.gtf"), GTF).unwrap();
        let cache = StoreCache::new(dir.path());
        let a = cache.get("hg19").unwrap();
        let b = cache.get("GRCh37").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.loaded().unwrap(), vec!["grch37".to_string()]);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("grch38.gtf"), GTF).unwrap();
        let cache = StoreCache::new(dir.path());
        let stores = std::thread::scope(|s| {
            let handles = (0..8)
                .map(|_| s.spawn(|| cache.get("hg38").unwrap()))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert!(stores.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_available_lists_model_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("grch38.gtf"), GTF).unwrap();
        fs::write(dir.path().join("grch38.gtf.gz"), b"").unwrap();
        fs::write(dir.path().join("dm6.gtf.gz"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join(".gtf"), b"").unwrap();
        fs::create_dir(dir.path().join("mm39.gtf")).unwrap();
        let cache = StoreCache::new(dir.path());
        cache.get("hg38").unwrap();

        let models = cache.available().unwrap();
        let names = models
            .iter()
            .map(|m| m.assembly.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["dm6", "grch38"]);
        assert!(!models[0].loaded);
        assert!(models[1].loaded);
        assert_eq!(models[1].path, dir.path().join("grch38.gtf"));
    }

    #[test]
    fn test_available_missing_dir_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StoreCache::new(dir.path().join("absent"));
        let err = cache.available().unwrap_err();
        assert!(matches!(err, AnnotError::Store(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_insert_prebuilt_store() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StoreCache::new(dir.path());
        let store = crate::store::read_gtf(GTF.as_bytes()).unwrap();
        cache.insert("custom", store).unwrap();
        assert_eq!(cache.get("CUSTOM").unwrap().n_transcripts(), 1);
    }
}
