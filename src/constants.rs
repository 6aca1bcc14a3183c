//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and resolution/dedup defaults so a rename or retune only requires
//! changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "revanchor";

/// Local config filename (e.g. `.revanchor.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".revanchor.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "revanchor";

// ── Resolution defaults ─────────────────────────────────────────────

/// Maximum distance, in lines, that line correction will search from a
/// rejected line number. The search never leaves the enclosing hunk.
pub const DEFAULT_MAX_SEARCH_DISTANCE: u32 = 3;

/// Minimum fraction of snippet tokens that must appear in a line for
/// the token-overlap fallback to count as a match.
pub const TOKEN_OVERLAP_FLOOR: f64 = 0.6;

/// Tokens shorter than this are ignored during token-overlap matching.
pub const MIN_TOKEN_LEN: usize = 3;

// ── Deduplication defaults ──────────────────────────────────────────

/// Characters of the normalized message that form the exact-match
/// dedup signature.
pub const DEFAULT_SIGNATURE_PREFIX_LEN: usize = 100;

/// Cosine similarity at or above which two comments are duplicates.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.90;

// ── Environment variable names ──────────────────────────────────────

pub const ENV_EMBEDDING_URL: &str = "REVANCHOR_EMBEDDING_URL";
pub const ENV_EMBEDDING_MODEL: &str = "REVANCHOR_EMBEDDING_MODEL";
pub const ENV_EMBEDDING_API_KEY: &str = "REVANCHOR_EMBEDDING_API_KEY";
pub const ENV_SIMILARITY_THRESHOLD: &str = "REVANCHOR_SIMILARITY_THRESHOLD";
pub const ENV_MAX_SEARCH_DISTANCE: &str = "REVANCHOR_MAX_SEARCH_DISTANCE";
