//! Facility directory endpoints: filtered search, lookup, nearby.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use santemap_directory::filter::{
    active_filter_count, apply_filters, FilterState, LanguageFilters, ServiceFilters,
    SpecialtyFilters, TypeFilters,
};
use santemap_directory::geo;
use santemap_schema::{Coordinate, Facility};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FacilityQuery {
    /// Free-text search over name, type field, and service tags.
    #[serde(default)]
    pub q: Option<String>,
    /// CSV flag lists per category. Absent means unconstrained; an empty
    /// string means every flag off.
    #[serde(default)]
    pub types: Option<String>,
    #[serde(default)]
    pub specialties: Option<String>,
    #[serde(default)]
    pub services: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FacilitySearchResponse {
    pub facilities: Vec<Facility>,
    pub total: usize,
    pub active_filters: usize,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_nearby_limit")]
    pub limit: usize,
}

fn default_nearby_limit() -> usize {
    5
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_facilities))
        .route("/nearby", get(nearby_facilities))
        .route("/{id}", get(get_facility))
}

/// Build one category from a CSV of flag names. Absent means "no
/// constraint" (all flags true); present means only the named flags on.
fn category_from_csv<C, F>(raw: Option<&str>, all: C, none: C, mut set: F) -> C
where
    F: FnMut(&mut C, &str) -> bool,
{
    let Some(raw) = raw else {
        return all;
    };
    let mut flags = none;
    for token in raw.split(',') {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            continue;
        }
        if !set(&mut flags, &token) {
            tracing::debug!("ignoring unknown filter flag: {token}");
        }
    }
    flags
}

fn filters_from_query(query: &FacilityQuery) -> FilterState {
    FilterState {
        types: category_from_csv(
            query.types.as_deref(),
            TypeFilters::all(),
            TypeFilters::none(),
            |flags, name| flags.set(name, true),
        ),
        specialties: category_from_csv(
            query.specialties.as_deref(),
            SpecialtyFilters::all(),
            SpecialtyFilters::none(),
            |flags, name| flags.set(name, true),
        ),
        services: category_from_csv(
            query.services.as_deref(),
            ServiceFilters::all(),
            ServiceFilters::none(),
            |flags, name| flags.set(name, true),
        ),
        languages: category_from_csv(
            query.languages.as_deref(),
            LanguageFilters::all(),
            LanguageFilters::none(),
            |flags, name| flags.set(name, true),
        ),
    }
}

async fn search_facilities(
    State(state): State<AppState>,
    Query(query): Query<FacilityQuery>,
) -> Json<FacilitySearchResponse> {
    let filters = filters_from_query(&query);
    let term = query.q.as_deref().unwrap_or("");
    let facilities = apply_filters(state.catalog.facilities(), term, &filters);

    Json(FacilitySearchResponse {
        total: facilities.len(),
        active_filters: active_filter_count(&filters),
        facilities,
    })
}

async fn get_facility(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Facility>, StatusCode> {
    state
        .catalog
        .get(id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn nearby_facilities(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Json<Vec<Facility>> {
    let origin = Coordinate {
        longitude: query.lon,
        latitude: query.lat,
    };
    let ranked = geo::nearest(state.catalog.facilities(), origin, query.limit)
        .into_iter()
        .cloned()
        .collect();
    Json(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            catalog: Arc::new(santemap_directory::FacilityCatalog::builtin().unwrap()),
            store: santemap_records::RecordStore::open_in_memory().unwrap(),
            assistant: Arc::new(santemap_assistant::AssistantGateway::new(
                "http://127.0.0.1:9",
                None,
            )),
        }
    }

    async fn get_json(uri: &str) -> serde_json::Value {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success(), "GET {uri} failed");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn search_without_params_returns_whole_catalog() {
        let body = get_json("/api/facilities").await;
        let total = body["total"].as_u64().unwrap();
        assert!(total >= 10);
        // All four categories unconstrained collapse to one each.
        assert_eq!(body["active_filters"], 4);
    }

    #[tokio::test]
    async fn search_by_text_and_type_flags() {
        let body = get_json("/api/facilities?q=donka").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["facilities"][0]["name"], "Hôpital National Donka");

        let body = get_json("/api/facilities?types=clinique").await;
        for facility in body["facilities"].as_array().unwrap() {
            let t = facility["facility_type"].as_str().unwrap().to_lowercase();
            assert!(t.contains("clinique"));
        }
    }

    #[tokio::test]
    async fn empty_types_param_excludes_everything() {
        let body = get_json("/api/facilities?types=").await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn service_flags_filter_on_booleans() {
        let body = get_json("/api/facilities?services=banque_de_sang").await;
        for facility in body["facilities"].as_array().unwrap() {
            assert_eq!(facility["has_blood_bank"], true);
        }
        assert!(body["total"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn get_by_id_and_not_found() {
        let body = get_json("/api/facilities/1").await;
        assert_eq!(body["id"], 1);

        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/facilities/9999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn nearby_orders_by_distance() {
        // Origin in Kaloum: Ignace Deen should come before up-country
        // hospitals.
        let body = get_json("/api/facilities/nearby?lat=9.509&lon=-13.712&limit=3").await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names[0].contains("Ignace Deen"));
    }

    #[tokio::test]
    async fn health_endpoint() {
        let body = get_json("/api/health").await;
        assert_eq!(body["status"], "ok");
    }
}
