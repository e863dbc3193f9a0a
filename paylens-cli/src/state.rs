use anyhow::{Context, Result};
use paylens_core::FavoritesStore;
use std::fs;
use std::path::{Path, PathBuf};

pub fn paylens_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".paylens"))
}

pub fn ensure_paylens_home() -> Result<PathBuf> {
    let dir = paylens_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn favorites_path() -> Result<PathBuf> {
    Ok(ensure_paylens_home()?.join("favorites.json"))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(ensure_paylens_home()?.join("paylens.log"))
}

/// Missing file means no favorites yet.
pub fn read_favorites(path: &Path) -> Result<FavoritesStore> {
    if !path.exists() {
        return Ok(FavoritesStore::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_favorites(path: &Path, favorites: &FavoritesStore) -> Result<()> {
    let json = serde_json::to_string_pretty(favorites)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
