//! Experience and restaurant lookup on top of a [`PlacesClient`].

use std::sync::Arc;

use crate::conversation::Archetype;
use crate::error::ServiceError;
use crate::services::ExternalResult;
use crate::services::places::{LatLng, Place, PlacesClient};

/// Search radius for experiences, in meters.
pub const EXPERIENCE_RADIUS_M: u32 = 5000;
/// Search radius for restaurants, in meters.
pub const RESTAURANT_RADIUS_M: u32 = 8000;
/// Only the top results are considered for restaurants.
pub const RESTAURANT_CANDIDATES: usize = 3;
/// Minimum rating a restaurant needs to be suggested.
pub const MIN_RESTAURANT_RATING: f64 = 4.0;

pub const INVALID_LOCATION_MESSAGE: &str = "Invalid location provided. Please try again.";
pub const NO_ADDRESS_AVAILABLE: &str = "No address available.";
pub const NO_EXPERIENCES_FOUND: &str = "No experiences found.";
pub const UNKNOWN_LOCATION: &str = "Unknown location";
pub const NO_RESTAURANTS_FOUND: &str = "No restaurants found nearby.";
/// Shown instead of provider error text, which stays in the logs.
pub const EXPERIENCE_LOOKUP_FAILED: &str =
    "Sorry, I couldn't search for experiences right now. Please try again.";
pub const RESTAURANT_LOOKUP_FAILED: &str =
    "Sorry, I couldn't search for restaurants right now. Please try again.";

const EXPERIENCE_CATEGORIES: [(Archetype, &str); 5] = [
    (Archetype::ThrillSeeking, "amusement park"),
    (Archetype::CreativeArtsy, "art gallery"),
    (Archetype::SuperChillLeisurely, "spa"),
    (Archetype::Foodie, "restaurant"),
    (Archetype::LiveEntertainment, "live music"),
];

const RESTAURANT_CATEGORIES: [(Archetype, &str); 5] = [
    (Archetype::ThrillSeeking, "fast food"),
    (Archetype::CreativeArtsy, "cafe"),
    (Archetype::SuperChillLeisurely, "fine dining"),
    (Archetype::Foodie, "restaurant"),
    (Archetype::LiveEntertainment, "pub"),
];

fn lookup(table: &[(Archetype, &'static str)], archetype: Archetype) -> Option<&'static str> {
    table
        .iter()
        .find(|(a, _)| *a == archetype)
        .map(|(_, category)| *category)
}

/// Place category searched for an archetype's experience.
pub fn experience_category(archetype: Archetype) -> &'static str {
    lookup(&EXPERIENCE_CATEGORIES, archetype).unwrap_or("")
}

/// Place category searched for an archetype's restaurants.
pub fn restaurant_category(archetype: Archetype) -> &'static str {
    lookup(&RESTAURANT_CATEGORIES, archetype).unwrap_or("restaurant")
}

/// A recommended experience.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Experience {
    pub name: String,
    pub address: String,
}

impl Experience {
    /// The (name, address) pair to show for any lookup outcome.
    pub fn display_pair(result: &ExternalResult<Experience>) -> (String, String) {
        match result {
            ExternalResult::Success(exp) => (exp.name.clone(), exp.address.clone()),
            ExternalResult::NotFound => {
                (NO_EXPERIENCES_FOUND.to_string(), UNKNOWN_LOCATION.to_string())
            }
            ExternalResult::InvalidInput(_) => (
                INVALID_LOCATION_MESSAGE.to_string(),
                NO_ADDRESS_AVAILABLE.to_string(),
            ),
            ExternalResult::ProviderError(_) => (
                EXPERIENCE_LOOKUP_FAILED.to_string(),
                NO_ADDRESS_AVAILABLE.to_string(),
            ),
        }
    }
}

/// A restaurant that passed the rating filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub name: String,
    pub address: String,
    pub rating: f64,
}

impl Restaurant {
    /// Keep a place only when it carries a rating of at least [`MIN_RESTAURANT_RATING`].
    fn qualify(place: &Place) -> Option<Self> {
        let rating = place.rating.filter(|r| *r >= MIN_RESTAURANT_RATING)?;
        Some(Self {
            name: place
                .name
                .clone()
                .unwrap_or_else(|| "No name found.".to_string()),
            address: place
                .formatted_address
                .clone()
                .unwrap_or_else(|| "No address found.".to_string()),
            rating,
        })
    }

    pub fn display_line(&self) -> String {
        format!(
            "- {} - Rating: {:.1}\n  Location: {}",
            self.name, self.rating, self.address
        )
    }

    /// Transcript lines for any lookup outcome. Never empty.
    pub fn display_lines(result: &ExternalResult<Vec<Restaurant>>) -> Vec<String> {
        match result {
            ExternalResult::Success(list) if !list.is_empty() => {
                list.iter().map(Restaurant::display_line).collect()
            }
            ExternalResult::Success(_) | ExternalResult::NotFound => {
                vec![NO_RESTAURANTS_FOUND.to_string()]
            }
            ExternalResult::InvalidInput(_) => vec![INVALID_LOCATION_MESSAGE.to_string()],
            ExternalResult::ProviderError(_) => vec![RESTAURANT_LOOKUP_FAILED.to_string()],
        }
    }
}

/// Runs the experience and restaurant lookups.
#[derive(Clone)]
pub struct Recommender {
    places: Arc<dyn PlacesClient>,
}

impl Recommender {
    pub fn new(places: Arc<dyn PlacesClient>) -> Self {
        Self { places }
    }

    async fn locate(&self, location: &str) -> Result<LatLng, Unlocated> {
        let location = location.trim();
        if location.is_empty() {
            return Err(Unlocated::Invalid);
        }
        match self.places.geocode(location).await {
            Ok(Some(point)) => Ok(point),
            Ok(None) => {
                tracing::warn!(location, "Geocoding returned no candidates");
                Err(Unlocated::Invalid)
            }
            Err(e) => {
                tracing::error!(location, "Geocoding failed: {}", e);
                Err(Unlocated::Failed(e))
            }
        }
    }

    /// Find one experience matching `archetype` near `location`.
    pub async fn fetch_experience(
        &self,
        location: &str,
        archetype: Archetype,
    ) -> ExternalResult<Experience> {
        let center = match self.locate(location).await {
            Ok(point) => point,
            Err(failure) => return failure.into_result(),
        };

        let query = experience_category(archetype);
        match self.places.search(query, center, EXPERIENCE_RADIUS_M).await {
            Ok(places) => match places.into_iter().next() {
                Some(first) => ExternalResult::Success(Experience {
                    name: first
                        .name
                        .unwrap_or_else(|| "No experience found.".to_string()),
                    address: first
                        .formatted_address
                        .unwrap_or_else(|| "No address found.".to_string()),
                }),
                None => ExternalResult::NotFound,
            },
            Err(e) => {
                tracing::error!(query, "Experience search failed: {}", e);
                e.into()
            }
        }
    }

    /// Find up to three well-rated restaurants for `archetype` near `location`.
    pub async fn fetch_restaurants(
        &self,
        location: &str,
        archetype: Archetype,
    ) -> ExternalResult<Vec<Restaurant>> {
        let center = match self.locate(location).await {
            Ok(point) => point,
            Err(failure) => return failure.into_result(),
        };

        let query = restaurant_category(archetype);
        match self.places.search(query, center, RESTAURANT_RADIUS_M).await {
            Ok(places) => {
                let picked: Vec<Restaurant> = places
                    .iter()
                    .take(RESTAURANT_CANDIDATES)
                    .filter_map(Restaurant::qualify)
                    .collect();
                if picked.is_empty() {
                    ExternalResult::NotFound
                } else {
                    ExternalResult::Success(picked)
                }
            }
            Err(e) => {
                tracing::error!(query, "Restaurant search failed: {}", e);
                e.into()
            }
        }
    }
}

/// Why a location could not be turned into a search center.
enum Unlocated {
    Invalid,
    Failed(ServiceError),
}

impl Unlocated {
    fn into_result<T>(self) -> ExternalResult<T> {
        match self {
            Self::Invalid => ExternalResult::InvalidInput(INVALID_LOCATION_MESSAGE.to_string()),
            Self::Failed(e) => e.into(),
        }
    }
}
