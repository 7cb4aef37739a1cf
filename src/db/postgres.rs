use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    types::Json,
    Executor, Pool, Postgres, Row,
};
use uuid::Uuid;

use super::{BookingStore, FleetCatalog};
use crate::entities::{
    Booking, BookingFilter, BookingId, NewBooking, RawVehicleRow, ServiceClass, Status,
    VehicleOffering,
};
use crate::error::{persistence_error, Error};

type Database = Postgres;

/// Booking store and fleet catalog backed by one Postgres pool.
///
/// Bookings keep their immutable fields as a JSONB document; `status` and
/// `version` live in their own columns so status writes can be guarded.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: Pool<Database>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::connect", skip(db_uri))]
    pub async fn connect(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    pub fn from_pool(pool: Pool<Database>) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), Error> {
        // fleet catalog; seq keeps catalog order stable
        self.pool
            .execute(
                "CREATE TABLE IF NOT EXISTS vehicles (
                    seq BIGSERIAL,
                    id UUID PRIMARY KEY,
                    name VARCHAR,
                    service_type VARCHAR,
                    rate_per_km DECIMAL,
                    base_fare DECIMAL,
                    status VARCHAR
                )",
            )
            .await?;

        // booking repository
        self.pool
            .execute(
                "CREATE TABLE IF NOT EXISTS bookings (
                    booking_id BIGSERIAL PRIMARY KEY,
                    booking_ref VARCHAR NOT NULL,
                    status VARCHAR NOT NULL,
                    version INT4 NOT NULL DEFAULT 0,
                    trip_date DATE NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL,
                    data JSONB NOT NULL,
                    CONSTRAINT bookings_booking_ref_key UNIQUE (booking_ref)
                )",
            )
            .await?;

        self.pool
            .execute("CREATE INDEX IF NOT EXISTS bookings_trip_date_idx ON bookings (trip_date)")
            .await?;

        Ok(())
    }
}

fn booking_from_row(row: &PgRow) -> Result<Booking, Error> {
    let booking_id: BookingId = row.try_get("booking_id")?;
    let status: String = row.try_get("status")?;
    let version: i32 = row.try_get("version")?;
    let Json(record): Json<NewBooking> = row.try_get("data")?;

    let mut booking = record.into_booking(booking_id);
    booking.status = status
        .parse::<Status>()
        .map_err(|_| persistence_error(format!("corrupt status column: {}", status)))?;
    booking.version = version;

    Ok(booking)
}

fn vehicle_row(row: &PgRow) -> Result<RawVehicleRow, Error> {
    Ok(RawVehicleRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        service_type: row.try_get("service_type")?,
        rate_per_km: row.try_get("rate_per_km")?,
        base_fare: row.try_get("base_fare")?,
        status: row.try_get("status")?,
    })
}

/// Converts raw catalog rows, dropping the ones that fail validation.
fn valid_vehicles(rows: Vec<PgRow>) -> Result<Vec<VehicleOffering>, Error> {
    let mut vehicles = Vec::with_capacity(rows.len());

    for row in rows.iter() {
        let raw = vehicle_row(row)?;
        let id = raw.id;

        match VehicleOffering::try_from(raw) {
            Ok(vehicle) => vehicles.push(vehicle),
            Err(reason) => tracing::warn!(%id, %reason, "skipping malformed catalog row"),
        }
    }

    Ok(vehicles)
}

#[async_trait]
impl BookingStore for PgStore {
    #[tracing::instrument(skip(self, booking), fields(booking_ref = %booking.booking_ref))]
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;

        let booking_id: BookingId = conn
            .fetch_one(
                sqlx::query(
                    "INSERT INTO bookings (booking_ref, status, version, trip_date, created_at, data)
                     VALUES ($1, $2, 0, $3, $4, $5)
                     RETURNING booking_id",
                )
                .bind(&booking.booking_ref)
                .bind(Status::Pending.name())
                .bind(booking.trip_date)
                .bind(booking.created_at)
                .bind(Json(&booking)),
            )
            .await?
            .try_get("booking_id")?;

        Ok(booking.into_booking(booking_id))
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_row = conn
            .fetch_optional(
                sqlx::query(
                    "SELECT booking_id, status, version, data FROM bookings WHERE booking_id = $1",
                )
                .bind(id),
            )
            .await?;

        maybe_row.as_ref().map(booking_from_row).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query(
                    "SELECT booking_id, status, version, data
                     FROM bookings
                     WHERE ($1::VARCHAR IS NULL OR status = $1)
                       AND ($2::DATE IS NULL OR trip_date = $2)
                     ORDER BY created_at DESC, booking_id DESC",
                )
                .bind(filter.status.map(|status| status.name()))
                .bind(filter.trip_date),
            )
            .await?;

        rows.iter().map(booking_from_row).collect()
    }

    #[tracing::instrument(skip(self, booking), fields(booking_id = booking.booking_id))]
    async fn update_booking_status(
        &self,
        booking: &Booking,
        expected_version: i32,
    ) -> Result<bool, Error> {
        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(
                sqlx::query(
                    "UPDATE bookings SET status = $3, version = $4
                     WHERE booking_id = $1 AND version = $2",
                )
                .bind(booking.booking_id)
                .bind(expected_version)
                .bind(booking.status.name())
                .bind(booking.version),
            )
            .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_booking(&self, id: BookingId) -> Result<bool, Error> {
        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(sqlx::query("DELETE FROM bookings WHERE booking_id = $1").bind(id))
            .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    async fn count_bookings(&self, trip_date: Option<NaiveDate>) -> Result<i64, Error> {
        let mut conn = self.pool.acquire().await?;

        let count: i64 = conn
            .fetch_one(
                sqlx::query(
                    "SELECT COUNT(*) AS total FROM bookings WHERE ($1::DATE IS NULL OR trip_date = $1)",
                )
                .bind(trip_date),
            )
            .await?
            .try_get("total")?;

        Ok(count)
    }
}

#[async_trait]
impl FleetCatalog for PgStore {
    #[tracing::instrument(skip(self))]
    async fn list_active_vehicles(
        &self,
        class: ServiceClass,
    ) -> Result<Vec<VehicleOffering>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query(
                    "SELECT id, name, service_type, rate_per_km, base_fare, status
                     FROM vehicles
                     WHERE status = 'ACTIVE' AND service_type = $1
                     ORDER BY seq ASC",
                )
                .bind(class.name()),
            )
            .await?;

        valid_vehicles(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_vehicles(&self) -> Result<Vec<VehicleOffering>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(sqlx::query(
                "SELECT id, name, service_type, rate_per_km, base_fare, status
                 FROM vehicles ORDER BY seq ASC",
            ))
            .await?;

        valid_vehicles(rows)
    }

    #[tracing::instrument(skip(self, vehicle), fields(vehicle_id = %vehicle.id))]
    async fn insert_vehicle(&self, vehicle: &VehicleOffering) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO vehicles (id, name, service_type, rate_per_km, base_fare, status)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(vehicle.id)
            .bind(&vehicle.display_name)
            .bind(vehicle.service_class.name())
            .bind(vehicle.rate_per_distance_unit)
            .bind(vehicle.base_fare)
            .bind(vehicle.operational_state.name()),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, vehicle), fields(vehicle_id = %vehicle.id))]
    async fn update_vehicle(&self, vehicle: &VehicleOffering) -> Result<bool, Error> {
        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(
                sqlx::query(
                    "UPDATE vehicles
                     SET name = $2, service_type = $3, rate_per_km = $4, base_fare = $5, status = $6
                     WHERE id = $1",
                )
                .bind(vehicle.id)
                .bind(&vehicle.display_name)
                .bind(vehicle.service_class.name())
                .bind(vehicle.rate_per_distance_unit)
                .bind(vehicle.base_fare)
                .bind(vehicle.operational_state.name()),
            )
            .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_vehicle(&self, id: Uuid) -> Result<bool, Error> {
        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(sqlx::query("DELETE FROM vehicles WHERE id = $1").bind(id))
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
