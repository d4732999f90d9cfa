//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization. The path
//! defaults mirror the conventional project layout:
//!
//! ```text
//! src/templates/pages/        # rendered page templates
//! src/templates/components/   # shared layouts and fragments
//! src/css/, src/img/          # static assets
//! dist/                       # output root
//! ```

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn pages() -> Vec<PathBuf> {
        vec!["src/templates/pages".into()]
    }

    pub fn templates() -> Vec<PathBuf> {
        vec!["src/templates/components".into()]
    }

    pub fn statics() -> Vec<PathBuf> {
        vec!["src/css".into(), "src/img".into()]
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }
}

// ============================================================================
// [context] Section Defaults
// ============================================================================

pub mod context {
    use crate::config::Timezone;

    pub fn timezone() -> Timezone {
        Timezone::default()
    }

    pub fn date_format() -> String {
        "%Y-%m-%dT%H:%M:%S".into()
    }
}
