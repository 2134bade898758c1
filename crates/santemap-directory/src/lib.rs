pub mod catalog;
pub mod filter;
pub mod geo;

pub use catalog::FacilityCatalog;
pub use filter::{
    active_filter_count, apply_filters, FilterState, LanguageFilters, ServiceFilters,
    SpecialtyFilters, TypeFilters,
};
pub use geo::{distance_km, nearest, FixedLocationProvider, LocationError, LocationProvider};
