//! Repositorio en memoria
//!
//! Cada colección vive detrás de un `RwLock` de tokio; todas las
//! escrituras se serializan con el lock de escritura, de modo que dos
//! altas concurrentes nunca comparten id ni referencia. Si hay
//! persistencia configurada, la colección se reescribe tras cada cambio y
//! un fallo de escritura deshace el cambio en memoria.

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::Repository;
use crate::models::{sort_for_listing, Entity};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Blob JSON por colección: `<dir>/<collection>.json`
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    pub fn new(dir: &Path, collection: &str) -> Self {
        Self {
            path: dir.join(format!("{}.json", collection)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load<E: DeserializeOwned>(&self) -> AppResult<Vec<E>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Storage(format!("Corrupt collection file {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::Storage(format!(
                "Cannot read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Escribir en un fichero temporal y renombrar, para no dejar blobs a medias
    pub async fn save<E: Serialize>(&self, records: &[E]) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| AppError::Storage(format!("Cannot serialize collection: {}", e)))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Cannot write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::Storage(format!("Cannot replace {}: {}", self.path.display(), e))
        })?;
        debug!("💾 Colección guardada en {} ({} registros)", self.path.display(), records.len());
        Ok(())
    }
}

pub struct LocalRepository<E: Entity> {
    records: RwLock<Vec<E>>,
    persistence: Option<JsonPersistence>,
}

impl<E: Entity> LocalRepository<E> {
    pub fn in_memory(records: Vec<E>) -> Self {
        Self {
            records: RwLock::new(records),
            persistence: None,
        }
    }

    /// Abrir la colección desde disco; si el fichero no existe se usa `seed`
    pub async fn open(dir: &Path, seed: Vec<E>) -> AppResult<Self> {
        let persistence = JsonPersistence::new(dir, E::COLLECTION);
        let mut records: Vec<E> = persistence.load().await?;
        if records.is_empty() && !seed.is_empty() {
            records = seed;
            persistence.save(&records).await?;
        }
        info!(
            "📂 Colección '{}' cargada desde {} ({} registros)",
            E::COLLECTION,
            persistence.path().display(),
            records.len()
        );
        Ok(Self {
            records: RwLock::new(records),
            persistence: Some(persistence),
        })
    }

    /// Lock de escritura para operaciones que abarcan varias colecciones
    pub(crate) async fn lock(&self) -> RwLockWriteGuard<'_, Vec<E>> {
        self.records.write().await
    }

    pub(crate) async fn persist(&self, records: &[E]) -> AppResult<()> {
        match &self.persistence {
            Some(p) => p.save(records).await,
            None => Ok(()),
        }
    }

    /// Persistir y, si falla, restaurar `previous` en memoria
    async fn commit_or_restore(&self, guard: &mut Vec<E>, previous: Vec<E>) -> AppResult<()> {
        if let Err(e) = self.persist(guard).await {
            warn!("↩️ Revirtiendo cambio en '{}': {}", E::COLLECTION, e);
            *guard = previous;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for LocalRepository<E> {
    async fn list(&self) -> AppResult<Vec<E>> {
        let mut records = self.records.read().await.clone();
        sort_for_listing(&mut records);
        Ok(records)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<E>> {
        Ok(self.records.read().await.iter().find(|r| r.id() == id).cloned())
    }

    async fn add(&self, new: E::New) -> AppResult<E> {
        let mut guard = self.records.write().await;
        let record = E::create(new, &guard, Uuid::new_v4(), Utc::now())?;

        let previous = guard.clone();
        guard.insert(0, record.clone());
        self.commit_or_restore(&mut guard, previous).await?;

        debug!("➕ {} {} añadido", E::LABEL, record.id());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: E::Patch) -> AppResult<E> {
        let mut guard = self.records.write().await;
        let index = guard
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found_error(E::LABEL, &id.to_string()))?;

        let mut updated = guard[index].clone();
        updated.apply(patch)?;

        let previous = guard.clone();
        guard[index] = updated.clone();
        self.commit_or_restore(&mut guard, previous).await?;

        debug!("✏️ {} {} actualizado", E::LABEL, id);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::{NewVehicle, VehiclePatch};
    use crate::models::{Vehicle, VehicleStatus, VehicleType};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn van(plate: &str) -> NewVehicle {
        NewVehicle {
            name: "Ford Transit".to_string(),
            plate: plate.to_string(),
            vehicle_type: VehicleType::Van,
            capacity_kg: Decimal::from(800),
            odometer_km: None,
            roi_cost: None,
        }
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_and_creates_nothing() {
        let repo = LocalRepository::<Vehicle>::in_memory(Vec::new());
        let err = repo
            .update(Uuid::new_v4(), VehiclePatch::status(VehicleStatus::InShop))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_plate_leaves_state_untouched() {
        let repo = LocalRepository::<Vehicle>::in_memory(Vec::new());
        repo.add(van("VAN-0921")).await.unwrap();
        let err = repo.add(van("VAN-0921")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = LocalRepository::<Vehicle>::in_memory(Vec::new());
        repo.add(van("VAN-0001")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.add(van("VAN-0002")).await.unwrap();
        let plates: Vec<String> = repo.list().await.unwrap().into_iter().map(|v| v.plate).collect();
        assert_eq!(plates, vec!["VAN-0002", "VAN-0001"]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_get_distinct_ids() {
        let repo = Arc::new(LocalRepository::<Vehicle>::in_memory(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.add(van(&format!("VAN-{:04}", i))).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        let mut ids: Vec<Uuid> = repo.list().await.unwrap().iter().map(|v| v.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = LocalRepository::<Vehicle>::open(dir.path(), Vec::new()).await.unwrap();
            let v = repo.add(van("VAN-0921")).await.unwrap();
            repo.update(v.id, VehiclePatch::status(VehicleStatus::InShop)).await.unwrap();
        }
        let reopened = LocalRepository::<Vehicle>::open(dir.path(), Vec::new()).await.unwrap();
        let vehicles = reopened.list().await.unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].status, VehicleStatus::InShop);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::<Vehicle>::open(dir.path(), Vec::new()).await.unwrap();
        repo.add(van("VAN-0001")).await.unwrap();

        // Un directorio en lugar del fichero hace fallar el rename
        let path = dir.path().join("vehicles.json");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = repo.add(van("VAN-0002")).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
