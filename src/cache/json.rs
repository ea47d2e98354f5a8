//! JSON file cache.
//!
//! The whole table lives in memory and is rewritten on every mutation:
//! serialize to `<file>.tmp`, fsync, rename over the target. An exclusive
//! `fs2` lock on `<file>.lock` keeps two processes from interleaving
//! writes. The in-memory table is only swapped after the rename succeeds,
//! so a failed write leaves both the file and the live query untouched.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::cache::table::{ArticleTable, StoredArticle};
use crate::cache::{CacheError, CacheStore, CacheSubscription};
use crate::model::Article;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    articles: Vec<StoredArticle>,
}

pub struct JsonFileCache {
    path: PathBuf,
    table: RwLock<ArticleTable>,
    live: watch::Sender<Arc<Vec<Article>>>,
}

impl JsonFileCache {
    /// Open the cache at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty cache. An unreadable or corrupt file is an
    /// error; the file is left in place.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let table = if path.exists() {
            load(&path)?
        } else {
            ArticleTable::default()
        };
        tracing::debug!(path = %path.display(), articles = table.len(), "json cache opened");

        let (live, _) = watch::channel(Arc::new(table.ordered()));
        Ok(Self {
            path,
            table: RwLock::new(table),
            live,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `next` and make it current. The write lock is held by the
    /// caller for the whole operation.
    fn commit(&self, current: &mut ArticleTable, next: ArticleTable) -> Result<(), CacheError> {
        persist(&self.path, &next)?;
        *current = next;
        self.live.send_replace(Arc::new(current.ordered()));
        Ok(())
    }
}

impl CacheStore for JsonFileCache {
    fn observe_all(&self) -> CacheSubscription {
        CacheSubscription::new(self.live.subscribe())
    }

    fn get_by_identifier(&self, url: &str) -> Result<Option<Article>, CacheError> {
        Ok(self.table.read().get(url))
    }

    fn replace_all(&self, articles: Vec<Article>) -> Result<usize, CacheError> {
        let mut table = self.table.write();
        let mut next = table.clone();
        let written = next.upsert(articles);
        if written == 0 {
            return Ok(0);
        }
        self.commit(&mut table, next)?;
        tracing::debug!(written, total = table.len(), path = %self.path.display(), "json cache updated");
        Ok(written)
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut table = self.table.write();
        self.commit(&mut table, ArticleTable::default())
    }

    fn count(&self) -> Result<usize, CacheError> {
        Ok(self.table.read().len())
    }
}

fn load(path: &Path) -> Result<ArticleTable, CacheError> {
    let content = fs::read_to_string(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: CacheFile = serde_json::from_str(&content).map_err(|source| CacheError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    if file.version != FORMAT_VERSION {
        tracing::warn!(version = file.version, "unknown cache format version, reading anyway");
    }
    Ok(ArticleTable::from_entries(file.articles))
}

fn persist(path: &Path, table: &ArticleTable) -> Result<(), CacheError> {
    let lock_path = sibling(path, "lock");
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|source| CacheError::Lock {
            path: lock_path.clone(),
            source,
        })?;
    lock.lock_exclusive().map_err(|source| CacheError::Lock {
        path: lock_path.clone(),
        source,
    })?;

    let result = write_atomic(path, table);

    if let Err(err) = FileExt::unlock(&lock) {
        tracing::warn!(error = %err, path = %lock_path.display(), "failed to release cache lock");
    }
    result
}

fn write_atomic(path: &Path, table: &ArticleTable) -> Result<(), CacheError> {
    let file = CacheFile {
        version: FORMAT_VERSION,
        articles: table.entries(),
    };
    let json = serde_json::to_vec_pretty(&file).map_err(|source| CacheError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = sibling(path, "tmp");
    let io_err = |source| CacheError::Io {
        path: tmp_path.clone(),
        source,
    };
    let mut tmp = File::create(&tmp_path).map_err(io_err)?;
    tmp.write_all(&json).map_err(io_err)?;
    tmp.sync_all().map_err(io_err)?;
    drop(tmp);

    fs::rename(&tmp_path, path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
