use super::{LoaderInfo, TypeInfo, TypeUniverse, loader_chain};
use crate::Result;
use camino::Utf8Path;
use ohno::{IntoAppError, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

const LOG_TARGET: &str = "  universe";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct UniverseFile {
    #[serde(default)]
    loaders: Vec<LoaderInfo>,

    #[serde(default)]
    types: Vec<TypeInfo>,
}

/// A fixed set of types and loaders held in memory.
#[derive(Debug, Default)]
pub struct StaticUniverse {
    loaders: HashMap<String, LoaderInfo>,
    types: Vec<Arc<TypeInfo>>,
    by_name: HashMap<String, Vec<usize>>,
}

impl StaticUniverse {
    #[must_use]
    pub fn new(loaders: Vec<LoaderInfo>, types: Vec<TypeInfo>) -> Self {
        let mut universe = Self {
            loaders: loaders.into_iter().map(|loader| (loader.name.clone(), loader)).collect(),
            ..Self::default()
        };

        for info in types {
            universe.add(info.into_arc());
        }

        universe
    }

    /// Add a type, keeping the instance so callers can hold on to the same `Arc`.
    pub fn add(&mut self, info: Arc<TypeInfo>) {
        self.by_name.entry(info.name.clone()).or_default().push(self.types.len());
        self.types.push(info);
    }

    /// Load a universe description from a `.json` or `.toml` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported extension, or does not
    /// describe a universe.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading type universe '{path}'"))?;

        let file: UniverseFile = match path.extension() {
            Some("json") => serde_json::from_str(&text).into_app_err_with(|| format!("parsing type universe '{path}'"))?,
            Some("toml") => toml::from_str(&text).into_app_err_with(|| format!("parsing type universe '{path}'"))?,
            _ => bail!("unsupported type universe format '{path}', expected a .json or .toml file"),
        };

        log::debug!(target: LOG_TARGET, "Loaded {} types and {} loaders from {path}", file.types.len(), file.loaders.len());

        Ok(Self::new(file.loaders, file.types))
    }

    /// Parse a universe description from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let file: UniverseFile = serde_json::from_str(text)?;
        Ok(Self::new(file.loaders, file.types))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeUniverse for StaticUniverse {
    fn find_type(&self, name: &str, loader: Option<&str>) -> Option<Arc<TypeInfo>> {
        let candidates = self.by_name.get(name)?;

        let Some(loader) = loader else {
            return candidates.first().map(|&index| Arc::clone(&self.types[index]));
        };

        // Parent-first delegation: the outermost loader that defines the type wins
        let chain = loader_chain(self, loader);
        core::iter::once(None)
            .chain(chain.iter().rev().map(Some))
            .find_map(|defining| {
                candidates
                    .iter()
                    .map(|&index| &self.types[index])
                    .find(|info| info.loader.as_ref() == defining)
            })
            .map(Arc::clone)
    }

    fn for_each_type(&self, visit: &mut dyn FnMut(&Arc<TypeInfo>)) {
        for info in &self.types {
            visit(info);
        }
    }

    fn has_loader(&self, loader: &str) -> bool {
        self.loaders.contains_key(loader)
    }

    fn loader_parent(&self, loader: &str) -> Option<String> {
        self.loaders.get(loader).and_then(|info| info.parent.clone())
    }
}
