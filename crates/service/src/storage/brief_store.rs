use std::{collections::HashMap, path::PathBuf, sync::Arc};

use models::{Brief, BriefStatus};
use tokio::{fs, sync::RwLock};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::BriefFilter;

/// JSON file-backed store for briefs.
///
/// Persists a `HashMap<Uuid, Brief>` to a single JSON file and guards it with
/// a `RwLock`; each mutation holds the write lock for the whole
/// read-modify-write, which is the per-document atomicity the service layer
/// relies on. Intended for a small catalog where a database is overkill.
pub struct BriefStore {
    inner: RwLock<HashMap<Uuid, Brief>>,
    file_path: PathBuf,
}

impl BriefStore {
    /// Open the store from a path. Creates the file with an empty map if
    /// missing; an unreadable file starts empty rather than failing startup.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<Uuid, Brief> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => {
                let empty: HashMap<Uuid, Brief> = HashMap::new();
                fs::write(
                    &file_path,
                    serde_json::to_vec(&empty).map_err(|e| ServiceError::Store(e.to_string()))?,
                )
                .await
                .map_err(|e| ServiceError::Store(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    async fn save(&self) -> Result<(), ServiceError> {
        let map = self.inner.read().await;
        let data = serde_json::to_vec(&*map).map_err(|e| ServiceError::Store(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Store(e.to_string()))?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Option<Brief> {
        let map = self.inner.read().await;
        map.get(&id).cloned()
    }

    /// Insert a new brief and persist.
    pub async fn insert(&self, brief: Brief) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(brief.id, brief);
        drop(map);
        self.save().await
    }

    /// Remove a brief and persist; returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(&id).is_some();
        drop(map);
        self.save().await?;
        Ok(existed)
    }

    /// Atomic read-modify-write on one brief, persisted before the updated
    /// value is returned. Readers never observe a partially applied mutation.
    pub async fn update_with<F>(&self, id: Uuid, f: F) -> Result<Brief, ServiceError>
    where
        F: FnOnce(&mut Brief) -> Result<(), ServiceError>,
    {
        let mut map = self.inner.write().await;
        let brief = map.get_mut(&id).ok_or_else(|| ServiceError::not_found("brief"))?;
        f(brief)?;
        let updated = brief.clone();
        drop(map);
        self.save().await?;
        Ok(updated)
    }

    /// Filtered slice ordered by creation time descending, ties broken by id
    /// ascending for determinism. Returns the slice and the full count.
    pub async fn select_page(
        &self,
        filter: &BriefFilter,
        offset: u64,
        limit: u64,
    ) -> (Vec<Brief>, u64) {
        let map = self.inner.read().await;
        let mut matching: Vec<&Brief> = map.values().filter(|b| filter.matches(b)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = matching.len() as u64;
        let slice = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        (slice, total)
    }

    /// Snapshot of the whole collection, for aggregation.
    pub async fn all(&self) -> Vec<Brief> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    /// The `limit` most recently created published briefs, newest first.
    pub async fn latest_published(&self, limit: usize) -> Vec<Brief> {
        let map = self.inner.read().await;
        let mut published: Vec<&Brief> = map
            .values()
            .filter(|b| b.status == BriefStatus::Published)
            .collect();
        published.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        published.into_iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_brief, temp_store_path};

    #[tokio::test]
    async fn crud_persists_across_reload() -> Result<(), anyhow::Error> {
        let path = temp_store_path();
        let store = BriefStore::open(&path).await?;

        let brief = sample_brief("Persisted brief");
        let id = brief.id;
        store.insert(brief).await?;
        assert!(store.get(id).await.is_some());

        let updated = store
            .update_with(id, |b| {
                b.title = "Renamed".into();
                Ok(())
            })
            .await?;
        assert_eq!(updated.title, "Renamed");

        // reopen from disk
        let reloaded = BriefStore::open(&path).await?;
        assert_eq!(reloaded.get(id).await.expect("persisted").title, "Renamed");

        assert!(store.remove(id).await?);
        assert!(!store.remove(id).await?);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_with_missing_id_is_not_found() -> Result<(), anyhow::Error> {
        let path = temp_store_path();
        let store = BriefStore::open(&path).await?;
        let res = store.update_with(Uuid::new_v4(), |_| Ok(())).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn select_page_orders_newest_first() -> Result<(), anyhow::Error> {
        let path = temp_store_path();
        let store = BriefStore::open(&path).await?;
        for i in 0..5i64 {
            let mut b = sample_brief(&format!("brief {}", i));
            b.created_at = b.created_at - chrono::Duration::seconds(i);
            store.insert(b).await?;
        }
        let (slice, total) = store.select_page(&BriefFilter::default(), 0, 3).await;
        assert_eq!(total, 5);
        assert_eq!(slice.len(), 3);
        assert!(slice.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
