//! Include/exclude rules deciding which upstream entities get cached.
//!
//! An entity is eligible iff its id matches at least one include pattern and
//! no exclude pattern. Patterns are regular expressions searched anywhere in
//! the id; anchor them (`^sensor\.`) to match a prefix. An empty include
//! list makes nothing eligible, an empty exclude list excludes nothing.
//!
//! # Examples
//!
//! ```
//! use roomtemp::filter::EntityFilter;
//!
//! let filter = EntityFilter::compile(
//!     &["^sensor\\..*_temperature$".to_string()],
//!     &["garage".to_string()],
//! )
//! .unwrap();
//!
//! assert!(filter.is_eligible("sensor.kitchen_temperature"));
//! assert!(!filter.is_eligible("sensor.garage_temperature"));
//! assert!(!filter.is_eligible("light.kitchen"));
//! ```

use crate::entity::Entity;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Filter configuration errors
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid entity pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Raw include/exclude pattern lists as configured
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRules {
    #[serde(default)]
    pub include_entities: Vec<String>,
    #[serde(default)]
    pub exclude_entities: Vec<String>,
}

impl FilterRules {
    pub fn compile(&self) -> Result<EntityFilter, FilterError> {
        EntityFilter::compile(&self.include_entities, &self.exclude_entities)
    }
}

/// Compiled include/exclude rules
#[derive(Debug, Clone)]
pub struct EntityFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl EntityFilter {
    /// Compile every pattern up front. The first malformed pattern fails the
    /// whole rule set.
    pub fn compile(includes: &[String], excludes: &[String]) -> Result<Self, FilterError> {
        Ok(Self {
            includes: compile_patterns(includes)?,
            excludes: compile_patterns(excludes)?,
        })
    }

    /// True when `id` matches some include and no exclude
    pub fn is_eligible(&self, id: &str) -> bool {
        let included = self.includes.iter().any(|re| re.is_match(id));
        if !included {
            return false;
        }
        !self.excludes.iter().any(|re| re.is_match(id))
    }

    /// Keep eligible entities, preserving input order
    pub fn apply(&self, entities: Vec<Entity>) -> Vec<Entity> {
        entities
            .into_iter()
            .filter(|entity| self.is_eligible(&entity.id))
            .collect()
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, FilterError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Filter `entities` by the given include/exclude patterns.
///
/// Returns an error without partial results if any pattern fails to compile.
pub fn filter_entities(
    entities: Vec<Entity>,
    includes: &[String],
    excludes: &[String],
) -> Result<Vec<Entity>, FilterError> {
    let filter = EntityFilter::compile(includes, excludes)?;
    Ok(filter.apply(entities))
}
