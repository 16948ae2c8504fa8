//! In-process park store
//!
//! Mirrors the PostgreSQL constraints (unique names, trail → park foreign
//! key) under a single write lock.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::ParkRepository;
use crate::models::{
    name_key, NationalPark, NationalParkDraft, ParkId, Trail, TrailDraft, TrailId,
};
use crate::{ParkyError, Result};

#[derive(Default)]
struct Tables {
    parks: BTreeMap<ParkId, NationalPark>,
    trails: BTreeMap<TrailId, Trail>,
    next_park_id: ParkId,
    next_trail_id: TrailId,
}

impl Tables {
    fn park_name_taken(&self, name: &str, except: Option<ParkId>) -> bool {
        let key = name_key(name);
        self.parks
            .values()
            .any(|p| Some(p.id) != except && name_key(&p.name) == key)
    }

    fn trail_name_taken(&self, name: &str, except: Option<TrailId>) -> bool {
        let key = name_key(name);
        self.trails
            .values()
            .any(|t| Some(t.id) != except && name_key(&t.name) == key)
    }

    fn hydrate(&self, trail: &Trail) -> Trail {
        let mut trail = trail.clone();
        trail.national_park = self.parks.get(&trail.national_park_id).cloned();
        trail
    }

    fn sorted_trails<'a>(&self, trails: impl Iterator<Item = &'a Trail>) -> Vec<Trail> {
        let mut trails: Vec<Trail> = trails.map(|t| self.hydrate(t)).collect();
        trails.sort_by(|a, b| a.name.cmp(&b.name));
        trails
    }
}

/// In-memory implementation of [`ParkRepository`]
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParkRepository for MemoryStore {
    async fn list_national_parks(&self) -> Result<Vec<NationalPark>> {
        let tables = self.tables.read().await;
        let mut parks: Vec<NationalPark> = tables.parks.values().cloned().collect();
        parks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parks)
    }

    async fn get_national_park(&self, id: ParkId) -> Result<Option<NationalPark>> {
        Ok(self.tables.read().await.parks.get(&id).cloned())
    }

    async fn national_park_exists(&self, id: ParkId) -> Result<bool> {
        Ok(self.tables.read().await.parks.contains_key(&id))
    }

    async fn national_park_name_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tables.read().await.park_name_taken(name, None))
    }

    async fn create_national_park(&self, draft: &NationalParkDraft) -> Result<NationalPark> {
        let mut tables = self.tables.write().await;
        if tables.park_name_taken(&draft.name, None) {
            return Err(ParkyError::Conflict("National Park Exists!".to_string()));
        }

        tables.next_park_id += 1;
        let park = NationalPark {
            id: tables.next_park_id,
            name: draft.name.clone(),
            state: draft.state.clone(),
            created: Utc::now(),
            established: draft.established,
        };
        tables.parks.insert(park.id, park.clone());
        Ok(park)
    }

    async fn update_national_park(&self, id: ParkId, draft: &NationalParkDraft) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.parks.contains_key(&id) {
            return Ok(false);
        }
        if tables.park_name_taken(&draft.name, Some(id)) {
            return Err(ParkyError::Conflict("National Park Exists!".to_string()));
        }

        if let Some(park) = tables.parks.get_mut(&id) {
            park.name = draft.name.clone();
            park.state = draft.state.clone();
            park.established = draft.established;
        }
        Ok(true)
    }

    async fn delete_national_park(&self, id: ParkId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.parks.contains_key(&id) {
            return Ok(false);
        }
        if tables.trails.values().any(|t| t.national_park_id == id) {
            return Err(ParkyError::Conflict(format!(
                "National park {id} still has trails"
            )));
        }
        tables.parks.remove(&id);
        Ok(true)
    }

    async fn list_trails(&self) -> Result<Vec<Trail>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_trails(tables.trails.values()))
    }

    async fn get_trail(&self, id: TrailId) -> Result<Option<Trail>> {
        let tables = self.tables.read().await;
        Ok(tables.trails.get(&id).map(|t| tables.hydrate(t)))
    }

    async fn trails_in_national_park(&self, park_id: ParkId) -> Result<Vec<Trail>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_trails(
            tables
                .trails
                .values()
                .filter(|t| t.national_park_id == park_id),
        ))
    }

    async fn trail_exists(&self, id: TrailId) -> Result<bool> {
        Ok(self.tables.read().await.trails.contains_key(&id))
    }

    async fn trail_name_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tables.read().await.trail_name_taken(name, None))
    }

    async fn create_trail(&self, draft: &TrailDraft) -> Result<Trail> {
        let mut tables = self.tables.write().await;
        if tables.trail_name_taken(&draft.name, None) {
            return Err(ParkyError::Conflict("Trail Exists!".to_string()));
        }
        if !tables.parks.contains_key(&draft.national_park_id) {
            return Err(ParkyError::Validation(format!(
                "National park {} does not exist",
                draft.national_park_id
            )));
        }

        tables.next_trail_id += 1;
        let trail = Trail {
            id: tables.next_trail_id,
            name: draft.name.clone(),
            distance: draft.distance,
            elevation: draft.elevation,
            difficulty: draft.difficulty,
            national_park_id: draft.national_park_id,
            date_created: Utc::now(),
            national_park: None,
        };
        tables.trails.insert(trail.id, trail.clone());
        Ok(tables.hydrate(&trail))
    }

    async fn update_trail(&self, id: TrailId, draft: &TrailDraft) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.trails.contains_key(&id) {
            return Ok(false);
        }
        if tables.trail_name_taken(&draft.name, Some(id)) {
            return Err(ParkyError::Conflict("Trail Exists!".to_string()));
        }
        if !tables.parks.contains_key(&draft.national_park_id) {
            return Err(ParkyError::Validation(format!(
                "National park {} does not exist",
                draft.national_park_id
            )));
        }

        if let Some(trail) = tables.trails.get_mut(&id) {
            trail.name = draft.name.clone();
            trail.distance = draft.distance;
            trail.elevation = draft.elevation;
            trail.difficulty = draft.difficulty;
            trail.national_park_id = draft.national_park_id;
        }
        Ok(true)
    }

    async fn delete_trail(&self, id: TrailId) -> Result<bool> {
        Ok(self.tables.write().await.trails.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
