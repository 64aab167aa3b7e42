//! Cypher fragment synthesis.
//!
//! Values always travel as bound parameters (`$bind_…`), never interpolated
//! into query text. Label and type names cannot be parameterized in Cypher,
//! so they are interpolated as backtick-quoted identifiers with embedded
//! backticks doubled. Bind keys are salted with the bind table's current
//! size, so binding several property maps into one query (relationship
//! creation binds three) can never collide.

use indexmap::IndexMap;
use rand::Rng;

use crate::model::Scalar;

/// Named query parameters, insertion-ordered for deterministic logging.
pub type BindTable = IndexMap<String, Scalar>;

/// Ordered property name → values map, the synthesis input shape.
pub type PropertyData = IndexMap<String, Vec<Scalar>>;

/// Backtick-quoted identifier with embedded backticks doubled.
fn quoted(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// One `:`Label`` fragment per non-empty label, in input order.
pub fn labels_string<I, S>(labels: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = String::new();

    for label in labels {
        let label = label.as_ref();
        if label.is_empty() {
            continue;
        }
        result.push(':');
        result.push_str(&quoted(label));
    }

    result
}

/// The comma-joined interior of a `{ … }` creation literal.
///
/// Zero-valued properties are omitted entirely. Single values bind one
/// placeholder; multi-valued properties become a list literal with one fresh
/// placeholder per element. `bind` is mutated in place.
pub fn properties_string(properties: &PropertyData, bind: &mut BindTable) -> String {
    let mut fragments = Vec::new();

    for (name, values) in properties {
        match values.as_slice() {
            [] => {}
            [value] => {
                let key = format!("bind_{}", bind.len());
                fragments.push(format!("{}: ${}", quoted(name), key));
                bind.insert(key, value.clone());
            }
            values => {
                fragments.push(format!("{}: {}", quoted(name), list_literal(values, bind)));
            }
        }
    }

    fragments.join(", ")
}

/// REMOVE/SET clauses for a property diff (empty values mean removal).
///
/// Returns `""` when the diff is empty; otherwise the output starts with a
/// space so it concatenates directly after a `MATCH` clause, REMOVE always
/// before SET.
pub fn properties_update_string(alias: &str, diff: &PropertyData, bind: &mut BindTable) -> String {
    let mut removes = Vec::new();
    let mut sets = Vec::new();

    for (name, values) in diff {
        match values.as_slice() {
            [] => removes.push(format!("{alias}.{}", quoted(name))),
            [value] => {
                let key = format!("bind_{}", bind.len());
                sets.push(format!("{alias}.{} = ${}", quoted(name), key));
                bind.insert(key, value.clone());
            }
            values => {
                sets.push(format!("{alias}.{} = {}", quoted(name), list_literal(values, bind)));
            }
        }
    }

    let mut result = String::new();

    if !removes.is_empty() {
        result.push_str(&format!(" REMOVE {}", removes.join(", ")));
    }

    if !sets.is_empty() {
        result.push_str(&format!(" SET {}", sets.join(", ")));
    }

    result
}

/// `[ $bind_0_N, $bind_1_N, … ]` with every element registered in `bind`.
fn list_literal(values: &[Scalar], bind: &mut BindTable) -> String {
    let mut parts = Vec::new();

    for (i, value) in values.iter().enumerate() {
        let key = format!("bind_{}_{}", i, bind.len());
        parts.push(format!("${key}"));
        bind.insert(key, value.clone());
    }

    format!("[ {} ]", parts.join(", "))
}

/// Random UUID v4 string.
pub fn generate_uuid() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);

    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex = |range: std::ops::Range<usize>| -> String {
        bytes[range].iter().map(|b| format!("{b:02x}")).collect()
    };

    format!(
        "{}-{}-{}-{}-{}",
        hex(0..4),
        hex(4..6),
        hex(6..8),
        hex(8..10),
        hex(10..16)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn property_data(entries: &[(&str, &[Scalar])]) -> PropertyData {
        entries
            .iter()
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .collect()
    }

    #[test]
    fn test_labels_string_quotes_and_skips_empty() {
        assert_eq!(labels_string(["Person", "", "Admin"]), ":`Person`:`Admin`");
        assert_eq!(labels_string(Vec::<String>::new()), "");
    }

    #[test]
    fn test_labels_string_escapes_backticks() {
        assert_eq!(labels_string(["we`ird"]), ":`we``ird`");
    }

    #[test]
    fn test_properties_string_single_value() {
        let data = property_data(&[("name", &[Scalar::String("Ada".into())])]);
        let mut bind = BindTable::new();
        let fragment = properties_string(&data, &mut bind);
        assert_eq!(fragment, "`name`: $bind_0");
        assert_eq!(bind.get("bind_0"), Some(&Scalar::String("Ada".into())));
    }

    #[test]
    fn test_properties_string_multi_value_list() {
        let data = property_data(&[(
            "tags",
            &[Scalar::String("x".into()), Scalar::String("y".into())],
        )]);
        let mut bind = BindTable::new();
        let fragment = properties_string(&data, &mut bind);
        assert_eq!(fragment, "`tags`: [ $bind_0_0, $bind_1_1 ]");
        assert_eq!(bind.len(), 2);
    }

    #[test]
    fn test_properties_string_skips_empty() {
        let data = property_data(&[
            ("gone", &[]),
            ("kept", &[Scalar::Integer(1)]),
        ]);
        let mut bind = BindTable::new();
        let fragment = properties_string(&data, &mut bind);
        assert_eq!(fragment, "`kept`: $bind_0");
        assert_eq!(bind.len(), 1);
    }

    #[test]
    fn test_bind_keys_never_collide_across_maps() {
        // Relationship creation binds three property maps with identical
        // names into one table.
        let data = property_data(&[
            ("uuid", &[Scalar::String("a".into())]),
            ("tags", &[Scalar::String("x".into()), Scalar::String("y".into())]),
        ]);
        let mut bind = BindTable::new();
        let first = properties_string(&data, &mut bind);
        let second = properties_string(&data, &mut bind);
        let third = properties_string(&data, &mut bind);

        assert_eq!(bind.len(), 9);
        assert_ne!(first, second);
        assert_ne!(second, third);
    }

    #[test]
    fn test_update_string_remove_before_set() {
        let data = property_data(&[
            ("name", &[Scalar::String("Ada".into())]),
            ("obsolete", &[]),
        ]);
        let mut bind = BindTable::new();
        let fragment = properties_update_string("node", &data, &mut bind);
        assert_eq!(fragment, " REMOVE node.`obsolete` SET node.`name` = $bind_0");
    }

    #[test]
    fn test_update_string_empty_diff() {
        let mut bind = BindTable::new();
        assert_eq!(properties_update_string("node", &PropertyData::new(), &mut bind), "");
        assert!(bind.is_empty());
    }

    #[test]
    fn test_update_string_removal_only() {
        let data = property_data(&[("a", &[])]);
        let mut bind = BindTable::new();
        let fragment = properties_update_string("node", &data, &mut bind);
        assert_eq!(fragment, " REMOVE node.`a`");
        assert!(bind.is_empty());
    }

    #[test]
    fn test_generate_uuid_shape() {
        let uuid = generate_uuid();
        assert_eq!(uuid.len(), 36);
        assert_eq!(uuid.as_bytes()[14], b'4');
        assert!(uuid.chars().all(|c| c.is_ascii_hexdigit() || c == '-'));
    }
}
