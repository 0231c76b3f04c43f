//! Endpoint and configuration constants shared by the CLI, the API client and
//! the normalizer.

// Backend collections (relative to the API base URL)
pub const WATER_BODIES_ENDPOINT: &str = "/map/waterbodies";
pub const FACILITIES_ENDPOINT: &str = "/map/facilities";
pub const CRITICAL_ZONES_ENDPOINT: &str = "/map/critical-zones";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5252/api";
pub const API_TOKEN_ENV: &str = "GTS_API_TOKEN";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_DATASET_PATH: &str = "data/map_objects.json";

// Dataset file keys, matching the backend's camelCase payloads
pub const WATER_BODIES_KEY: &str = "waterBodies";
pub const FACILITIES_KEY: &str = "facilities";
pub const CRITICAL_ZONES_KEY: &str = "criticalZones";

/// Filter value that disables a region/condition/priority filter
pub const FILTER_ALL: &str = "all";

/// Label used when grouping objects that carry no region
pub const UNKNOWN_REGION: &str = "Неизвестный регион";

/// Administrative regions of Kazakhstan as used by the backend
pub const REGIONS: [&str; 17] = [
    "Акмолинская область",
    "Актюбинская область",
    "Алматинская область",
    "Атырауская область",
    "Восточно-Казахстанская область",
    "Жамбылская область",
    "Западно-Казахстанская область",
    "Карагандинская область",
    "Костанайская область",
    "Кызылординская область",
    "Мангистауская область",
    "Павлодарская область",
    "Северо-Казахстанская область",
    "Туркестанская область",
    "Алматы",
    "Астана",
    "Шымкент",
];

/// Whether `region` is one of the known administrative regions
pub fn is_known_region(region: &str) -> bool {
    REGIONS.contains(&region)
}
