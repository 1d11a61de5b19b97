//! Unit registry
//!
//! The fixed, ordered list of unit names taking part in a round trip, together with the two
//! names derived from each unit:
//!
//! - the *anchor* (`introduction.md` → `introduction-md`), attached to the unit boundary marker
//!   and used for bare same-unit links;
//! - the *encoded name* (`introduction.md` → `introduction_md`), used as the prefix of
//!   cross-unit anchors in the linear document.
//!
//! The registry is an immutable value built once and passed to both directions. All collision
//! checks happen in [`UnitRegistry::new`], so lookups never have to worry about ambiguity.

use crate::error::RegistryError;

/// Separator between an encoded unit name and the original anchor in cross-unit links.
pub const ANCHOR_SEPARATOR: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq)]
struct UnitEntry {
    name: String,
    anchor: String,
    encoded: String,
}

/// Registry of the units in a document set
///
/// # Examples
///
/// ```ignore
/// let registry = UnitRegistry::new(["intro.md", "guide.md"])?;
/// assert_eq!(registry.anchor("intro.md"), Some("intro-md"));
/// assert_eq!(registry.resolve_encoded("guide_md__setup"), Some(("guide.md", Some("setup"))));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRegistry {
    units: Vec<UnitEntry>,
}

impl UnitRegistry {
    /// Build a registry, validating names and rejecting ambiguous configurations.
    pub fn new<I, S>(names: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut units: Vec<UnitEntry> = Vec::new();
        for name in names {
            let name = name.into();
            if !is_marker_safe(&name) {
                return Err(RegistryError::InvalidName(name));
            }
            if units.iter().any(|u| u.name == name) {
                return Err(RegistryError::DuplicateName(name));
            }
            let entry = UnitEntry {
                anchor: derive_anchor(&name),
                encoded: encode_name(&name),
                name,
            };
            for existing in &units {
                if existing.anchor == entry.anchor {
                    return Err(RegistryError::AnchorCollision {
                        first: existing.name.clone(),
                        second: entry.name.clone(),
                    });
                }
                if encoded_names_collide(&existing.encoded, &entry.encoded) {
                    return Err(RegistryError::EncodedCollision {
                        first: existing.name.clone(),
                        second: entry.name.clone(),
                    });
                }
            }
            units.push(entry);
        }
        if units.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(UnitRegistry { units })
    }

    /// Unit names in registry order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|u| u.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Check if a unit is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Derived anchor of a registered unit
    pub fn anchor(&self, name: &str) -> Option<&str> {
        self.entry(name).map(|u| u.anchor.as_str())
    }

    /// Encoded (anchor-safe) name of a registered unit
    pub fn encoded(&self, name: &str) -> Option<&str> {
        self.entry(name).map(|u| u.encoded.as_str())
    }

    /// Resolve an encoded anchor back to `(unit name, original anchor)`.
    ///
    /// An exact match on an encoded name wins; otherwise the longest encoded name followed by
    /// [`ANCHOR_SEPARATOR`] is used. An empty remainder counts as "no anchor". Returns `None`
    /// when nothing matches, which means the anchor was never unit-encoded.
    pub fn resolve_encoded<'a>(&'a self, anchor: &'a str) -> Option<(&'a str, Option<&'a str>)> {
        if let Some(unit) = self.units.iter().find(|u| u.encoded == anchor) {
            return Some((unit.name.as_str(), None));
        }

        self.units
            .iter()
            .filter_map(|u| {
                anchor
                    .strip_prefix(u.encoded.as_str())
                    .and_then(|rest| rest.strip_prefix(ANCHOR_SEPARATOR))
                    .map(|rest| (u, rest))
            })
            .max_by_key(|(u, _)| u.encoded.len())
            .map(|(u, rest)| {
                let rest = if rest.is_empty() { None } else { Some(rest) };
                (u.name.as_str(), rest)
            })
    }

    fn entry(&self, name: &str) -> Option<&UnitEntry> {
        self.units.iter().find(|u| u.name == name)
    }
}

/// `guide/Intro.md` → `guide-intro-md`
pub fn derive_anchor(name: &str) -> String {
    name.chars()
        .map(|c| if is_name_separator(c) { '-' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// `guide/intro.md` → `guide_intro_md`
pub fn encode_name(name: &str) -> String {
    name.chars()
        .map(|c| if is_name_separator(c) { '_' } else { c })
        .collect()
}

fn is_name_separator(c: char) -> bool {
    c == '.' || c == '/'
}

fn is_marker_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/'))
}

fn encoded_names_collide(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
    long.strip_prefix(short)
        .is_some_and(|rest| rest.starts_with(ANCHOR_SEPARATOR))
}
