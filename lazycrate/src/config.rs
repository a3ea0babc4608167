//! Per-resource grammar configuration.
//!
//! Nothing in the validator or compiler reads global state: every resource
//! hands its own [`LazyLoadConfig`] to [`validate`](crate::filtering::validate),
//! usually through [`LazyResource::lazy_load_config`](crate::LazyResource::lazy_load_config).
//! This lets resources with narrower grammars coexist with permissive ones.
//!
//! ```rust,ignore
//! fn lazy_load_config() -> LazyLoadConfig {
//!     LazyLoadConfig::default()
//!         .with_morph_types(["post", "video"])
//!         .without_match_modes([MatchMode::NotIn])
//! }
//! ```

use std::collections::BTreeSet;

use crate::filtering::{MatchMode, ValueType};

/// Resolves the value types a match mode accepts.
pub type ValueTypeResolver = fn(MatchMode) -> &'static [ValueType];

const DEFAULT_MAX_FIELD_LENGTH: usize = 255;

#[derive(Debug, Clone)]
pub struct LazyLoadConfig {
    /// Match modes a descriptor may use.
    pub match_modes: BTreeSet<MatchMode>,
    /// Allowed `morphType` tags for `inMorphMany` / `notInMorphMany`.
    pub morph_types: BTreeSet<String>,
    /// Allowed value types per match mode.
    pub value_types: ValueTypeResolver,
    /// Maximum length of sort and global filter field names.
    pub max_field_length: usize,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            match_modes: MatchMode::ALL.into_iter().collect(),
            morph_types: BTreeSet::new(),
            value_types: MatchMode::allowed_types,
            max_field_length: DEFAULT_MAX_FIELD_LENGTH,
        }
    }
}

impl LazyLoadConfig {
    #[must_use]
    pub fn with_morph_types<I, S>(mut self, morph_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.morph_types = morph_types.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the grammar to exactly these modes.
    #[must_use]
    pub fn with_match_modes(mut self, modes: impl IntoIterator<Item = MatchMode>) -> Self {
        self.match_modes = modes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn without_match_modes(mut self, modes: impl IntoIterator<Item = MatchMode>) -> Self {
        for mode in modes {
            self.match_modes.remove(&mode);
        }
        self
    }

    #[must_use]
    pub fn with_value_types(mut self, resolver: ValueTypeResolver) -> Self {
        self.value_types = resolver;
        self
    }

    #[must_use]
    pub fn with_max_field_length(mut self, max_field_length: usize) -> Self {
        self.max_field_length = max_field_length;
        self
    }

    #[must_use]
    pub fn allows_mode(&self, mode: MatchMode) -> bool {
        self.match_modes.contains(&mode)
    }

    #[must_use]
    pub fn allows_morph_type(&self, morph_type: &str) -> bool {
        self.morph_types.contains(morph_type)
    }
}
