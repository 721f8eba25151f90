//! Catalog defaults. Every value here can be overridden through `Config`.

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_LOCALE: &str = "fr";
pub const DEFAULT_OUTPUT_PATH: &str = "public/pokemon-fr.json";
pub const DEFAULT_CONFIG_FILE: &str = "dex_locale.toml";

// Large enough to return a whole category in one page.
pub const DEFAULT_LIST_LIMIT: u32 = 100_000;

pub const DEFAULT_CONCURRENCY: usize = 40;
pub const DEFAULT_MAX_CONNECTIONS: usize = 40;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// Listing endpoints (used as `<base>/<endpoint>?limit=N`)
pub const SPECIES_ENDPOINT: &str = "pokemon-species";
pub const FORM_ENDPOINT: &str = "pokemon-form";

/// Display names for identifiers the catalog spells differently from the
/// downstream app. Applied only when the key was not fetched.
pub const STATIC_OVERRIDES: &[(&str, &str)] = &[
    ("mr-mime", "M. Mime"),
    ("mime-jr", "Mime Jr."),
    ("type-null", "Type:0"),
];

/// Canonical key for a catalog item name: trimmed and lower-cased.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}
