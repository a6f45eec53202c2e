//! Read-through cache over `hotels.json`.

use moka::future::Cache;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use super::model::{HotelProfile, UpdateHotelRequest};
use crate::storage::{read_json_array, write_json_atomically, StoreError};

pub const HOTELS_FILE: &str = "hotels.json";
const HOTELS_CACHE_KEY: &str = "hotels";

#[derive(Debug, Error)]
pub enum HotelError {
    #[error("hotel '{0}' not found")]
    NotFound(String),
    #[error("failed to load hotel profiles: {0}")]
    Store(#[from] StoreError),
}

pub struct HotelDirectory {
    path: PathBuf,
    cache: Cache<String, Arc<Vec<HotelProfile>>>,
    write_lock: Mutex<()>,
}

impl HotelDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(10 * 60))
            .max_capacity(10)
            .build();

        Self {
            path: path.into(),
            cache,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(HOTELS_FILE))
    }

    /// All hotel profiles, served from cache when fresh.
    pub async fn all(&self) -> Result<Arc<Vec<HotelProfile>>, HotelError> {
        if let Some(hotels) = self.cache.get(HOTELS_CACHE_KEY).await {
            return Ok(hotels);
        }

        let hotels: Vec<HotelProfile> = read_json_array(&self.path).await?;
        log::info!("Loaded {} hotel profiles from {}", hotels.len(), self.path.display());
        let hotels = Arc::new(hotels);
        self.cache
            .insert(HOTELS_CACHE_KEY.to_string(), hotels.clone())
            .await;
        Ok(hotels)
    }

    /// Look up a profile by slug or id.
    pub async fn find(&self, key: &str) -> Result<Option<HotelProfile>, HotelError> {
        let hotels = self.all().await?;
        Ok(hotels.iter().find(|h| h.matches(key)).cloned())
    }

    /// Merge `request` into the profile it names and write the file back.
    pub async fn update(&self, request: &UpdateHotelRequest) -> Result<HotelProfile, HotelError> {
        let _guard = self.write_lock.lock().await;

        let mut hotels: Vec<HotelProfile> = read_json_array(&self.path).await?;
        let position = hotels.iter().position(|h| {
            h.slug == request.slug || request.id.as_deref().is_some_and(|id| h.id == id)
        });
        let Some(index) = position else {
            return Err(HotelError::NotFound(request.slug.clone()));
        };

        request.apply_to(&mut hotels[index]);
        let updated = hotels[index].clone();
        write_json_atomically(&self.path, &hotels).await?;

        self.cache.invalidate(HOTELS_CACHE_KEY).await;
        log::info!("Hotel profile '{}' updated", updated.slug);
        Ok(updated)
    }
}
