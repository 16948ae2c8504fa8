//! National park and trail storage
//!
//! [`ParkRepository`] is the seam between the HTTP layer and persistence.
//! [`PgStore`] is the production implementation; [`MemoryStore`] keeps the
//! same contract in process for tests and local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{NationalPark, NationalParkDraft, ParkId, Trail, TrailDraft, TrailId};
use crate::Result;
use async_trait::async_trait;

/// Trait for national park and trail operations
///
/// Name uniqueness is case-insensitive and enforced by the store itself, so
/// `create_*` and `update_*` return [`crate::ParkyError::Conflict`] even when
/// a concurrent writer slipped past an earlier `*_exists` check.
#[async_trait]
pub trait ParkRepository: Send + Sync {
    /// All national parks ordered by name
    async fn list_national_parks(&self) -> Result<Vec<NationalPark>>;

    async fn get_national_park(&self, id: ParkId) -> Result<Option<NationalPark>>;

    async fn national_park_exists(&self, id: ParkId) -> Result<bool>;

    async fn national_park_name_exists(&self, name: &str) -> Result<bool>;

    async fn create_national_park(&self, draft: &NationalParkDraft) -> Result<NationalPark>;

    /// Returns `false` when no park has this id
    async fn update_national_park(&self, id: ParkId, draft: &NationalParkDraft) -> Result<bool>;

    /// Returns `false` when no park has this id. Fails with `Conflict`
    /// while trails still reference the park.
    async fn delete_national_park(&self, id: ParkId) -> Result<bool>;

    /// All trails ordered by name, each with its park loaded
    async fn list_trails(&self) -> Result<Vec<Trail>>;

    async fn get_trail(&self, id: TrailId) -> Result<Option<Trail>>;

    async fn trails_in_national_park(&self, park_id: ParkId) -> Result<Vec<Trail>>;

    async fn trail_exists(&self, id: TrailId) -> Result<bool>;

    async fn trail_name_exists(&self, name: &str) -> Result<bool>;

    /// Fails with `Validation` when the referenced park does not exist
    async fn create_trail(&self, draft: &TrailDraft) -> Result<Trail>;

    async fn update_trail(&self, id: TrailId, draft: &TrailDraft) -> Result<bool>;

    async fn delete_trail(&self, id: TrailId) -> Result<bool>;

    /// Cheap round trip used by the readiness probe
    async fn health_check(&self) -> Result<()>;
}
