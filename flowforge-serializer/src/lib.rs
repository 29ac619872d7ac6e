//! ABOUTME: The Serializer — canonical JSON encoding of a validated WorkflowSpec (§4.4)
//! ABOUTME: Relies on serde_json's default (non-`preserve_order`) map, which sorts keys lexically

use flowforge_core::{FlowForgeError, WorkflowSpec};

/// Serialize `spec` to its canonical JSON form and verify it round-trips
/// byte-for-byte back to a structurally identical `WorkflowSpec`.
///
/// Canonical here means: object keys sorted lexically at every level (the
/// default behavior of `serde_json::Map` without the `preserve_order`
/// feature), arrays in insertion order, compact output with no incidental
/// whitespace, and the shortest round-tripping number representation
/// (`serde_json`'s default float/int formatting).
pub fn serialize_canonical(spec: &WorkflowSpec) -> Result<String, FlowForgeError> {
    let value = serde_json::to_value(spec).map_err(|e| FlowForgeError::Serialization {
        message: format!("failed to convert WorkflowSpec to JSON: {e}"),
    })?;

    let canonical = serde_json::to_string(&value).map_err(|e| FlowForgeError::Serialization {
        message: format!("failed to encode canonical JSON: {e}"),
    })?;

    let roundtrip: WorkflowSpec = serde_json::from_str(&canonical).map_err(|e| {
        FlowForgeError::Serialization {
            message: format!("canonical JSON failed to re-parse: {e}"),
        }
    })?;

    if &roundtrip != spec {
        tracing::error!(workflow = %spec.name, "canonical serialization did not round-trip");
        return Err(FlowForgeError::Serialization {
            message: "serialized JSON does not round-trip to an identical WorkflowSpec".to_string(),
        });
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowforge_core::ir::{Node, Parameter, ParameterType};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn sample_spec() -> WorkflowSpec {
        WorkflowSpec {
            name: "data_processing_pipeline".to_string(),
            description: "desc".to_string(),
            version: "1.0.0".to_string(),
            inputs: vec![Parameter::new("customer_id", ParameterType::String, "d")],
            outputs: vec![Parameter::new("result", ParameterType::String, "d")],
            workflow: Node::ToolCall {
                tool_name: "fetch".to_string(),
                parameters: BTreeMap::new(),
                assigns_to: None,
            },
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn round_trips_a_simple_spec() {
        let json = serialize_canonical(&sample_spec()).unwrap();
        let parsed: WorkflowSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample_spec());
    }

    #[test]
    fn object_keys_are_sorted_lexically() {
        let json = serialize_canonical(&sample_spec()).unwrap();
        let description_pos = json.find("\"description\"").unwrap();
        let name_pos = json.find("\"name\"").unwrap();
        // "description" < "name" lexically, and must appear first in the object.
        assert!(description_pos < name_pos);
    }

    #[test]
    fn output_has_no_incidental_whitespace() {
        let json = serialize_canonical(&sample_spec()).unwrap();
        assert!(!json.contains('\n'));
        assert!(!json.ends_with(' '));
    }

    #[test]
    fn nested_parameters_map_is_also_sorted() {
        let mut spec = sample_spec();
        let mut parameters = BTreeMap::new();
        parameters.insert("zeta".to_string(), serde_json::json!(1));
        parameters.insert("alpha".to_string(), serde_json::json!(2));
        spec.workflow = Node::ToolCall {
            tool_name: "fetch".to_string(),
            parameters,
            assigns_to: None,
        };
        let json = serialize_canonical(&spec).unwrap();
        assert!(json.find("\"alpha\"").unwrap() < json.find("\"zeta\"").unwrap());
    }

    proptest::proptest! {
        /// Whatever order `metadata` keys are inserted in, the canonical
        /// output always lists them lexically sorted (P3).
        #[test]
        fn metadata_keys_always_serialize_in_lexical_order(
            mut keys in proptest::collection::vec("[a-z][a-z0-9_]{0,8}", 1..6),
        ) {
            keys.sort();
            keys.dedup();
            prop_assume!(keys.len() > 1);

            let mut spec = sample_spec();
            // Insert in reverse order so a passing test can't be an accident
            // of BTreeMap already matching insertion order.
            for key in keys.iter().rev() {
                spec.metadata.insert(key.clone(), serde_json::json!(1));
            }

            let json = serialize_canonical(&spec).unwrap();
            let positions: Vec<usize> = keys
                .iter()
                .map(|k| json.find(&format!("\"{k}\"")).unwrap())
                .collect();
            let mut sorted_positions = positions.clone();
            sorted_positions.sort();
            prop_assert_eq!(positions, sorted_positions);
        }

        /// Serialization is a pure function of the spec: identical input always
        /// produces byte-identical canonical output (grounds P4 at the IR layer).
        #[test]
        fn serialization_is_deterministic(
            keys in proptest::collection::vec("[a-z][a-z0-9_]{0,8}", 0..4),
        ) {
            let mut spec = sample_spec();
            for key in &keys {
                spec.metadata.insert(key.clone(), serde_json::json!(1));
            }
            let a = serialize_canonical(&spec).unwrap();
            let b = serialize_canonical(&spec).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
