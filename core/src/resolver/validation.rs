#![deny(missing_docs)]

//! # Validation Metadata
//!
//! Extracts the constraint keywords of a schema into [`Validation`], reconciling the
//! OAS 3.0 boolean and 3.1 numeric forms of `exclusiveMinimum` / `exclusiveMaximum`.

use crate::oas::schema::{ExclusiveBound, Schema};
use crate::resolver::types::{Bound, Validation};
use serde_json::Number;
use std::cmp::Ordering;

/// Reads every validation keyword declared directly on `schema`.
pub fn extract_validation(schema: &Schema) -> Validation {
    Validation {
        min_length: schema.min_length,
        max_length: schema.max_length,
        pattern: schema.pattern.clone(),
        minimum: lower_bound(schema.minimum.as_ref(), schema.exclusive_minimum.as_ref()),
        maximum: upper_bound(schema.maximum.as_ref(), schema.exclusive_maximum.as_ref()),
        multiple_of: schema.multiple_of.clone(),
        min_items: schema.min_items,
        max_items: schema.max_items,
        unique_items: schema.unique_items.unwrap_or(false),
        min_properties: schema.min_properties,
        max_properties: schema.max_properties,
        format: schema.format.clone(),
        const_value: schema.const_value.clone(),
    }
}

fn lower_bound(inclusive: Option<&Number>, exclusive: Option<&ExclusiveBound>) -> Option<Bound> {
    combine(inclusive, exclusive, Ordering::Greater)
}

fn upper_bound(inclusive: Option<&Number>, exclusive: Option<&ExclusiveBound>) -> Option<Bound> {
    combine(inclusive, exclusive, Ordering::Less)
}

/// `stricter` is the ordering an exclusive bound must have against the inclusive one to
/// replace it (`Greater` for minimums, `Less` for maximums). A tie is exclusive.
fn combine(
    inclusive: Option<&Number>,
    exclusive: Option<&ExclusiveBound>,
    stricter: Ordering,
) -> Option<Bound> {
    match (inclusive, exclusive) {
        (Some(value), Some(ExclusiveBound::Flag(flag))) => Some(Bound {
            value: value.clone(),
            exclusive: *flag,
        }),
        (Some(value), None) => Some(Bound {
            value: value.clone(),
            exclusive: false,
        }),
        (None, Some(ExclusiveBound::Value(value))) => Some(Bound {
            value: value.clone(),
            exclusive: true,
        }),
        (Some(incl), Some(ExclusiveBound::Value(excl))) => {
            let order = compare(excl, incl);
            if order == stricter || order == Ordering::Equal {
                Some(Bound {
                    value: excl.clone(),
                    exclusive: true,
                })
            } else {
                Some(Bound {
                    value: incl.clone(),
                    exclusive: false,
                })
            }
        }
        (None, Some(ExclusiveBound::Flag(_))) | (None, None) => None,
    }
}

fn compare(a: &Number, b: &Number) -> Ordering {
    let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema(yaml: &str) -> Schema {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn bound(value: i64, exclusive: bool) -> Option<Bound> {
        Some(Bound {
            value: Number::from(value),
            exclusive,
        })
    }

    #[test]
    fn test_string_constraints() {
        let v = extract_validation(&schema(
            "type: string\nminLength: 2\nmaxLength: 8\npattern: '^[a-z]+$'\nformat: email",
        ));
        assert_eq!(v.min_length, Some(2));
        assert_eq!(v.max_length, Some(8));
        assert_eq!(v.pattern.as_deref(), Some("^[a-z]+$"));
        assert_eq!(v.format.as_deref(), Some("email"));
    }

    #[test]
    fn test_exclusive_flag_30() {
        let v = extract_validation(&schema(
            "type: integer\nminimum: 0\nexclusiveMinimum: true\nmaximum: 10",
        ));
        assert_eq!(v.minimum, bound(0, true));
        assert_eq!(v.maximum, bound(10, false));
    }

    #[test]
    fn test_exclusive_value_31() {
        let v = extract_validation(&schema("type: integer\nexclusiveMaximum: 100"));
        assert_eq!(v.maximum, bound(100, true));
        assert_eq!(v.minimum, None);
    }

    #[test]
    fn test_stricter_bound_wins() {
        let looser_exclusive =
            extract_validation(&schema("type: integer\nminimum: 5\nexclusiveMinimum: 1"));
        assert_eq!(looser_exclusive.minimum, bound(5, false));

        let stricter_exclusive =
            extract_validation(&schema("type: integer\nminimum: 5\nexclusiveMinimum: 7"));
        assert_eq!(stricter_exclusive.minimum, bound(7, true));

        let tie = extract_validation(&schema("type: integer\nmaximum: 9\nexclusiveMaximum: 9"));
        assert_eq!(tie.maximum, bound(9, true));
    }

    #[test]
    fn test_flag_without_bound_is_ignored() {
        let v = extract_validation(&schema("type: integer\nexclusiveMinimum: true"));
        assert_eq!(v.minimum, None);
    }

    #[test]
    fn test_array_constraints() {
        let v = extract_validation(&schema(
            "type: array\nitems: {type: string}\nminItems: 1\nmaxItems: 3\nuniqueItems: true",
        ));
        assert_eq!(v.min_items, Some(1));
        assert_eq!(v.max_items, Some(3));
        assert!(v.unique_items);
    }
}
