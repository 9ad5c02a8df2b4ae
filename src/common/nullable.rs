//! Null-tolerant decoding
//!
//! Most Redfish properties are typed `["<type>", "null"]`. Fields kept as
//! plain values rather than `Option` decode a `null` as their default, so one
//! null property never fails the whole resource.

use serde::{Deserialize, Deserializer};

/// `deserialize_with` helper: `null` becomes `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Block {
        #[serde(default)]
        verb: String,
    }

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "or_default")]
        flag: bool,
        #[serde(default, deserialize_with = "or_default")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "or_default")]
        block: Block,
    }

    #[test]
    fn test_null_becomes_default() {
        let s: Sample =
            serde_json::from_value(json!({"flag": null, "names": null, "block": null})).unwrap();
        assert!(!s.flag);
        assert!(s.names.is_empty());
        assert!(s.block.verb.is_empty());
    }

    #[test]
    fn test_values_pass_through() {
        let s: Sample = serde_json::from_value(
            json!({"flag": true, "names": ["a", "b"], "block": {"verb": "Reset"}}),
        )
        .unwrap();
        assert!(s.flag);
        assert_eq!(s.names, vec!["a", "b"]);
        assert_eq!(s.block.verb, "Reset");
    }

    #[test]
    fn test_wrong_type_still_fails() {
        assert!(serde_json::from_value::<Sample>(json!({"flag": "yes"})).is_err());
    }
}
