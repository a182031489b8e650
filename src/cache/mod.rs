//! Signed on-disk cache of the compiled route table.
//!
//! ```text
//! SIGNATURE-HMAC-SHA256: <hex digest>\n     (only with a signature key)
//! {"routes":[...],"static":{...},"dynamic":{...},"names":{...}}
//! ```
//!
//! The file is replaced wholesale through a temp file and an atomic rename,
//! so readers see either the old artifact or the new one.

mod artifact;
mod signature;

pub use self::signature::{Signer, SIGNATURE_HEADER};

use self::artifact::Artifact;
use crate::config::{CacheConfig, RouterConfig};
use crate::error::RouterError;
use crate::router::{NamedRoutes, RouteTable};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RouteCache {
    path: PathBuf,
    enabled: bool,
    signer: Option<Signer>,
}

impl RouteCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            path: config.path.clone(),
            enabled: config.enabled,
            signer: config.signature_key.as_deref().map(Signer::new),
        }
    }

    /// Disabled in debug mode regardless of `cache.enabled`.
    pub fn from_router_config(config: &RouterConfig) -> Self {
        let mut cache = Self::new(&config.cache);
        cache.enabled = config.cache_active();
        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }

    /// Writes the table. `Uncacheable` means nothing was written and the
    /// previous artifact, if any, is untouched.
    pub fn save<B>(&self, table: &RouteTable<B>, names: &NamedRoutes) -> Result<(), RouterError> {
        if !self.enabled {
            return Ok(());
        }

        let artifact = Artifact::from_table(table, names)?;
        let payload = serde_json::to_vec(&artifact)?;
        let bytes = signature::seal(self.signer.as_ref(), payload)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            routes = table.len(),
            signed = self.signer.is_some(),
            "route cache written"
        );
        Ok(())
    }

    /// `Ok(None)` when caching is off, the file is missing or unreadable, or
    /// the payload does not describe a route table. A bad signature is an
    /// error: the content is never trusted.
    pub fn load<B>(&self) -> Result<Option<(RouteTable<B>, NamedRoutes)>, RouterError> {
        if !self.enabled {
            return Ok(None);
        }

        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "route cache not readable");
                return Ok(None);
            }
        };

        let payload = signature::open(self.signer.as_ref(), &bytes)?;

        let artifact: Artifact = match serde_json::from_slice(payload) {
            Ok(a) => a,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "route cache corrupted, ignoring");
                return Ok(None);
            }
        };

        match artifact.into_table() {
            Ok((table, names)) => {
                debug!(
                    path = %self.path.display(),
                    routes = table.len(),
                    "route cache loaded"
                );
                Ok(Some((table, names)))
            }
            Err(reason) => {
                warn!(path = %self.path.display(), %reason, "route cache inconsistent, ignoring");
                Ok(None)
            }
        }
    }

    /// Removes the artifact. Returns whether a file was there.
    pub fn clear(&self) -> Result<bool, RouterError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
