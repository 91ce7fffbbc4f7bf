// File: src/persistence.rs
use crate::cache::ResultCache;
use crate::core::types::{SourcePage, TaggedPage};
use crate::error::{LinkerError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// On-disk snapshot of the result cache.
#[derive(serde::Serialize, serde::Deserialize)]
struct CacheSnapshot {
    version: u32,
    cache: ResultCache,
}

const SNAPSHOT_VERSION: u32 = 1;

/// Writes `write` into a temporary file next to `path`, then renames it
/// over `path`.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<()>,
{
    if path.is_dir() {
        return Err(LinkerError::PathIsDirectory(path.to_path_buf()));
    }
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| LinkerError::Io(e.error))?;
    Ok(())
}

pub fn save_cache(cache: &ResultCache, path: &Path) -> Result<()> {
    let snapshot = CacheSnapshot {
        version: SNAPSHOT_VERSION,
        cache: cache.clone(),
    };
    write_atomically(path, |writer| {
        bincode::serialize_into(writer, &snapshot)?;
        Ok(())
    })
}

pub fn load_cache(path: &Path) -> Result<ResultCache> {
    let reader = BufReader::new(File::open(path)?);
    let snapshot: CacheSnapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(LinkerError::Config(format!(
            "cache snapshot version {} is not supported",
            snapshot.version
        )));
    }
    Ok(snapshot.cache)
}

/// Loads the cache if the file exists, otherwise starts empty.
pub fn load_cache_or_new(path: &Path) -> Result<ResultCache> {
    if path.exists() {
        load_cache(path)
    } else {
        Ok(ResultCache::new())
    }
}

/// Reads an aligned masekhet: a JSON list of pages with their sources.
pub fn read_source_pages(path: &Path) -> Result<Vec<SourcePage>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_tagged_pages(path: &Path) -> Result<Vec<TaggedPage>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_tagged_pages(pages: &[TaggedPage], path: &Path) -> Result<()> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(writer, pages)?;
        Ok(())
    })
}
