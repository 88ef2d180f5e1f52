use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FieldRestrictionMap, FieldVisibility};

/// Placeholder written in place of masked values.
pub const MASKED_VALUE_PLACEHOLDER: &str = "***";

/// Merged per-field visibility for one resource.
///
/// Fields absent from the map take the fallback level: `visible` for a
/// settled role set, `hidden` while authority is pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRestrictions {
    levels: BTreeMap<String, FieldVisibility>,
    fallback: FieldVisibility,
}

impl Default for FieldRestrictions {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl FieldRestrictions {
    /// No restrictions: every field is visible.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            levels: BTreeMap::new(),
            fallback: FieldVisibility::Visible,
        }
    }

    /// Fail-closed view: every field is hidden.
    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            levels: BTreeMap::new(),
            fallback: FieldVisibility::Hidden,
        }
    }

    /// Merges restriction maps in contribution order.
    ///
    /// A field resolves to `visible` when any contribution marks it visible.
    /// Otherwise the first contribution defining the field decides, and later
    /// non-visible definitions are ignored.
    #[must_use]
    pub fn merge<'a>(contributions: impl IntoIterator<Item = &'a FieldRestrictionMap>) -> Self {
        let mut levels = BTreeMap::new();
        for restrictions in contributions {
            for (field, level) in restrictions {
                match levels.get(field) {
                    None => {
                        levels.insert(field.clone(), *level);
                    }
                    Some(FieldVisibility::Visible) => {}
                    Some(_) if *level == FieldVisibility::Visible => {
                        levels.insert(field.clone(), FieldVisibility::Visible);
                    }
                    Some(_) => {}
                }
            }
        }

        Self {
            levels,
            fallback: FieldVisibility::Visible,
        }
    }

    /// Returns the explicit level map.
    #[must_use]
    pub fn levels(&self) -> &BTreeMap<String, FieldVisibility> {
        &self.levels
    }

    /// Returns the level applied to fields absent from the map.
    #[must_use]
    pub fn fallback(&self) -> FieldVisibility {
        self.fallback
    }

    /// Returns the effective level of one field.
    #[must_use]
    pub fn level(&self, field: &str) -> FieldVisibility {
        self.levels.get(field).copied().unwrap_or(self.fallback)
    }

    /// Returns whether the field is shown as stored.
    #[must_use]
    pub fn is_visible(&self, field: &str) -> bool {
        self.level(field) == FieldVisibility::Visible
    }

    /// Returns whether the field is masked.
    #[must_use]
    pub fn is_masked(&self, field: &str) -> bool {
        self.level(field) == FieldVisibility::Masked
    }

    /// Returns whether the field is hidden.
    #[must_use]
    pub fn is_hidden(&self, field: &str) -> bool {
        self.level(field) == FieldVisibility::Hidden
    }

    /// Applies the restrictions to one JSON record.
    #[must_use]
    pub fn redact(&self, record: Map<String, Value>) -> Map<String, Value> {
        record
            .into_iter()
            .filter_map(|(field, value)| match self.level(field.as_str()) {
                FieldVisibility::Visible => Some((field, value)),
                FieldVisibility::Masked if value.is_null() => Some((field, value)),
                FieldVisibility::Masked => {
                    Some((field, Value::String(MASKED_VALUE_PLACEHOLDER.to_owned())))
                }
                FieldVisibility::Hidden => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    use super::FieldRestrictions;
    use crate::{FieldRestrictionMap, FieldVisibility};

    fn restrictions(entries: &[(&str, FieldVisibility)]) -> FieldRestrictionMap {
        entries
            .iter()
            .map(|(field, level)| ((*field).to_owned(), *level))
            .collect()
    }

    fn as_object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn later_visible_overrides_earlier_masked() {
        let first = restrictions(&[("cnp", FieldVisibility::Masked)]);
        let second = restrictions(&[("cnp", FieldVisibility::Visible)]);

        let merged = FieldRestrictions::merge([&first, &second]);
        assert_eq!(merged.level("cnp"), FieldVisibility::Visible);
    }

    #[test]
    fn first_non_visible_definition_wins() {
        let first = restrictions(&[("cnp", FieldVisibility::Masked)]);
        let second = restrictions(&[("cnp", FieldVisibility::Hidden)]);

        let merged = FieldRestrictions::merge([&first, &second]);
        assert!(merged.is_masked("cnp"));

        let reversed = FieldRestrictions::merge([&second, &first]);
        assert!(reversed.is_hidden("cnp"));
    }

    #[test]
    fn absent_fields_follow_fallback() {
        let merged = FieldRestrictions::merge([&restrictions(&[(
            "diagnosis",
            FieldVisibility::Hidden,
        )])]);
        assert!(merged.is_visible("name"));
        assert!(merged.is_hidden("diagnosis"));

        let denied = FieldRestrictions::deny_all();
        assert!(denied.is_hidden("name"));
        assert!(!denied.is_visible("name"));
    }

    #[test]
    fn redact_masks_and_drops_fields() {
        let merged = FieldRestrictions::merge([&restrictions(&[
            ("cnp", FieldVisibility::Masked),
            ("diagnosis", FieldVisibility::Hidden),
            ("phone", FieldVisibility::Masked),
        ])]);

        let record = as_object(json!({
            "name": "Ana Pop",
            "cnp": "2900101123456",
            "diagnosis": "n/a",
            "phone": null
        }));

        let redacted = Value::Object(merged.redact(record));
        assert_eq!(
            redacted,
            json!({ "name": "Ana Pop", "cnp": "***", "phone": null })
        );
    }

    #[test]
    fn deny_all_redacts_everything() {
        let record = as_object(json!({ "name": "Ana Pop", "cnp": "2900101123456" }));
        assert!(FieldRestrictions::deny_all().redact(record).is_empty());
    }

    fn visibility() -> impl Strategy<Value = FieldVisibility> {
        prop_oneof![
            Just(FieldVisibility::Visible),
            Just(FieldVisibility::Masked),
            Just(FieldVisibility::Hidden),
        ]
    }

    proptest! {
        #[test]
        fn merge_is_visible_if_any_else_first_writer(
            levels in proptest::collection::vec(visibility(), 1..6)
        ) {
            let maps: Vec<FieldRestrictionMap> = levels
                .iter()
                .map(|level| restrictions(&[("field", *level)]))
                .collect();
            let merged = FieldRestrictions::merge(maps.iter());

            let expected = if levels.contains(&FieldVisibility::Visible) {
                FieldVisibility::Visible
            } else {
                levels[0]
            };
            prop_assert_eq!(merged.level("field"), expected);
        }
    }
}
