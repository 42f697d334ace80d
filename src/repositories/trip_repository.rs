use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::Repository;
use crate::models::trip::{format_ref_id, NewTrip, TripPatch};
use crate::models::{Entity, Trip};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct TripRepository {
    pool: PgPool,
}

impl TripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Siguiente valor de `trip_ref_seq` (empieza en 46)
    async fn next_ref_id(&self) -> AppResult<String> {
        let (counter,): (i64,) = sqlx::query_as("SELECT nextval('trip_ref_seq')")
            .fetch_one(&self.pool)
            .await?;
        let counter = u64::try_from(counter)
            .map_err(|_| AppError::Internal(format!("Invalid trip ref counter {}", counter)))?;
        Ok(format_ref_id(counter))
    }
}

#[async_trait]
impl Repository<Trip> for TripRepository {
    async fn list(&self) -> AppResult<Vec<Trip>> {
        // Desempate por el contador numérico de `TRP-NNNN`, igual que en modo local
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT * FROM trips ORDER BY created_at DESC, CAST(substring(ref_id FROM 5) AS BIGINT) DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(trips)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(trip)
    }

    async fn add(&self, new: NewTrip) -> AppResult<Trip> {
        let ref_id = self.next_ref_id().await?;
        let trip = Trip::draft(new, Uuid::new_v4(), ref_id, Utc::now());

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (id, ref_id, vehicle_id, driver_id, origin, destination, cargo_weight_kg, estimated_fuel_cost, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(trip.id)
        .bind(&trip.ref_id)
        .bind(trip.vehicle_id)
        .bind(trip.driver_id)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(trip.cargo_weight_kg)
        .bind(trip.estimated_fuel_cost)
        .bind(trip.status)
        .bind(trip.created_at)
        .fetch_one(&self.pool)
        .await?;

        debug!("➕ Viaje {} creado en borrador", trip.ref_id);
        Ok(trip)
    }

    async fn update(&self, id: Uuid, patch: TripPatch) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        let mut trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Trip", &id.to_string()))?;

        trip.apply(patch)?;

        let trip = sqlx::query_as::<_, Trip>("UPDATE trips SET status = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(trip.status)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(trip)
    }
}
