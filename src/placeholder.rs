//! Deterministic placeholder allocation.
//!
//! Maps each distinct original entity text to a stable, human-readable
//! placeholder (`A某`, `B某`, ... `Z某`, `AA某`, ...) for the lifetime of a
//! run. The mapping is append-only: an assignment is never overwritten or
//! removed, so a recurring name receives the identical placeholder in every
//! unit of the document.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::{Error, Result};

/// Default cap on collision-skip attempts per allocation.
///
/// The code generator is unbounded and collision-free on its own, so this
/// only fires when the used set was seeded with a pathological number of
/// colliding placeholders.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Bijective base-26 code for an allocation index.
///
/// `0` → `A`, `25` → `Z`, `26` → `AA`, `27` → `AB`, ... The sequence is
/// unbounded, so the generator itself never repeats or exhausts.
#[must_use]
pub fn letter_code(index: usize) -> String {
    let mut n = index + 1; // bijective numeration is 1-based
    let mut code = Vec::new();
    while n > 0 {
        n -= 1;
        code.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    code.reverse();
    // Only ASCII uppercase bytes are pushed.
    String::from_utf8(code).unwrap_or_default()
}

/// Which entity types are pseudonymized, and with what suffix marker.
///
/// Types absent from the table pass through substitution untouched. The
/// reference behavior activates only `Person` with the generic marker `某`
/// ("a certain ..."); other types such as `Organization` (`组织`) are an
/// explicit extensibility point enabled by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderPolicy {
    markers: Vec<(EntityType, String)>,
    /// Cap on candidates tried per allocation before failing explicitly.
    pub max_attempts: usize,
}

impl Default for PlaceholderPolicy {
    fn default() -> Self {
        Self {
            markers: vec![(EntityType::Person, "某".to_string())],
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PlaceholderPolicy {
    /// Policy with no active types (nothing is pseudonymized).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            markers: Vec::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Activate an entity type with the given suffix marker.
    #[must_use]
    pub fn with_marker(mut self, entity_type: EntityType, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if let Some((_, m)) = self.markers.iter_mut().find(|(t, _)| *t == entity_type) {
            *m = marker;
        } else {
            self.markers.push((entity_type, marker));
        }
        self
    }

    /// Suffix marker for a type, or `None` if the type is not pseudonymized.
    #[must_use]
    pub fn marker_for(&self, entity_type: &EntityType) -> Option<&str> {
        self.markers
            .iter()
            .find(|(t, _)| t == entity_type)
            .map(|(_, m)| m.as_str())
    }

    /// Check whether a type is in the allow-list.
    #[must_use]
    pub fn is_active(&self, entity_type: &EntityType) -> bool {
        self.marker_for(entity_type).is_some()
    }
}

/// Serialized form of [`PlaceholderAllocator`]; the lookup index and used
/// set are derived state and rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AllocatorSnapshot {
    policy: PlaceholderPolicy,
    entries: Vec<(String, String)>,
    next_index: usize,
}

/// Process-wide mapping from original entity text to assigned placeholder.
///
/// Grows monotonically; `allocate_or_get` is idempotent per original text.
/// Serializable so a host can persist the mapping and seed a later run for
/// cross-run continuity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "AllocatorSnapshot", into = "AllocatorSnapshot")]
pub struct PlaceholderAllocator {
    policy: PlaceholderPolicy,
    /// (original, placeholder) pairs in allocation order.
    entries: Vec<(String, String)>,
    next_index: usize,
    lookup: HashMap<String, usize>,
    used: HashSet<String>,
}

impl Default for PlaceholderAllocator {
    fn default() -> Self {
        Self::new(PlaceholderPolicy::default())
    }
}

impl From<AllocatorSnapshot> for PlaceholderAllocator {
    fn from(snapshot: AllocatorSnapshot) -> Self {
        let lookup = snapshot
            .entries
            .iter()
            .enumerate()
            .map(|(i, (original, _))| (original.clone(), i))
            .collect();
        let used = snapshot
            .entries
            .iter()
            .map(|(_, placeholder)| placeholder.clone())
            .collect();
        Self {
            policy: snapshot.policy,
            entries: snapshot.entries,
            next_index: snapshot.next_index,
            lookup,
            used,
        }
    }
}

impl From<PlaceholderAllocator> for AllocatorSnapshot {
    fn from(allocator: PlaceholderAllocator) -> Self {
        Self {
            policy: allocator.policy,
            entries: allocator.entries,
            next_index: allocator.next_index,
        }
    }
}

impl PlaceholderAllocator {
    /// Create an empty allocator with the given policy.
    #[must_use]
    pub fn new(policy: PlaceholderPolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
            next_index: 0,
            lookup: HashMap::new(),
            used: HashSet::new(),
        }
    }

    /// Return the placeholder for `original`, allocating one on first sight.
    ///
    /// Returns `Ok(None)` when `entity_type` is not in the policy's
    /// allow-list (the text passes through unmodified). Idempotent: the same
    /// original text always yields the same placeholder within a run, even
    /// when later mentions carry an inactive type.
    pub fn allocate_or_get(
        &mut self,
        original: &str,
        entity_type: &EntityType,
    ) -> Result<Option<String>> {
        if let Some(&idx) = self.lookup.get(original) {
            return Ok(Some(self.entries[idx].1.clone()));
        }
        let Some(marker) = self.policy.marker_for(entity_type) else {
            return Ok(None);
        };

        let mut attempts = 0;
        let placeholder = loop {
            attempts += 1;
            if attempts > self.policy.max_attempts {
                return Err(Error::AllocationExhausted { attempts });
            }
            let candidate = format!("{}{}", letter_code(self.next_index), marker);
            // The index advances on every attempt, collision or not.
            self.next_index += 1;
            if self.used.contains(&candidate) {
                log::debug!("placeholder candidate '{candidate}' already used, skipping");
                continue;
            }
            break candidate;
        };

        log::debug!("assigned placeholder '{placeholder}' to '{original}'");
        self.used.insert(placeholder.clone());
        self.lookup
            .insert(original.to_string(), self.entries.len());
        self.entries.push((original.to_string(), placeholder.clone()));
        Ok(Some(placeholder))
    }

    /// Placeholder previously assigned to `original`, if any.
    #[must_use]
    pub fn get(&self, original: &str) -> Option<&str> {
        self.lookup
            .get(original)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    /// (original, placeholder) pairs in allocation order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(o, p)| (o.as_str(), p.as_str()))
    }

    /// Owned copy of the mapping, in allocation order.
    #[must_use]
    pub fn mapping(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }

    /// Number of allocated placeholders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no placeholders were allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured policy.
    #[must_use]
    pub fn policy(&self) -> &PlaceholderPolicy {
        &self.policy
    }
}
