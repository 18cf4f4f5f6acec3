//! Create/skip/overwrite decision for one (entity, target language) pair.

use crate::database::models::TranslationRecord;

/// What to do for a target language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No record exists; translate and insert
    Create,
    /// A record exists and no force flag was given; do nothing
    Skip,
    /// A record exists and force was requested; translate and overwrite
    Overwrite,
}

impl Decision {
    /// Whether the provider has to be called
    pub fn requires_translation(&self) -> bool {
        !matches!(self, Decision::Skip)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Create => write!(f, "create"),
            Decision::Skip => write!(f, "skip"),
            Decision::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// Decide based on the stored record and the force flag
pub fn decide(existing: Option<&TranslationRecord>, force: bool) -> Decision {
    match (existing, force) {
        (None, _) => Decision::Create,
        (Some(_), false) => Decision::Skip,
        (Some(_), true) => Decision::Overwrite,
    }
}
