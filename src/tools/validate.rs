//! Argument validation against a tool's declared parameters
//!
//! Permissive on extra fields, strict on required, typed and enumerated ones.

use crate::tools::registry::ToolDefinition;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Check decoded arguments against a tool's contract.
///
/// Absent or null arguments are treated as an empty object.
pub fn validate(tool: &ToolDefinition, arguments: &Value) -> ValidationResult {
    let empty = serde_json::Map::new();
    let args = match arguments {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return ValidationResult::Invalid(format!(
                "Arguments for {} must be an object, got {}",
                tool.name,
                json_type_name(other)
            ));
        }
    };

    for param in tool.params {
        let value = match args.get(param.name) {
            Some(value) => value,
            None if param.required => {
                return ValidationResult::Invalid(format!(
                    "Missing required parameter: {}",
                    param.name
                ));
            }
            None => continue,
        };

        if !param.param_type.matches(value) {
            return ValidationResult::Invalid(format!(
                "Parameter {} must be of type {}, got {}",
                param.name,
                param.param_type.as_str(),
                json_type_name(value)
            ));
        }

        if !param.allowed.is_empty() {
            let allowed = value.as_str().is_some_and(|v| param.allowed.contains(&v));
            if !allowed {
                return ValidationResult::Invalid(format!(
                    "Parameter {} must be one of [{}], got {}",
                    param.name,
                    param.allowed.join(", "),
                    value
                ));
            }
        }
    }

    ValidationResult::Valid
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::{find_tool, list_tools};
    use serde_json::json;

    fn check(tool: &str, args: Value) -> ValidationResult {
        validate(find_tool(tool).unwrap(), &args)
    }

    fn optimization_args() -> Value {
        json!({
            "symbol": "EURUSD",
            "ea": "MovingAverage",
            "period": "H1",
            "date_from": "2024-01-01",
            "date_to": "2024-06-30",
            "deposit": 10000,
            "params": {"TakeProfit": {"min": 10, "max": 50, "step": 10}}
        })
    }

    #[test]
    fn test_valid_create_order() {
        let result = check("create_order", json!({"symbol": "EURUSD", "type": "BUY", "volume": 0.1}));
        assert_eq!(result, ValidationResult::Valid);
    }

    #[test]
    fn test_extra_fields_tolerated() {
        let result = check("get_open_positions", json!({"verbose": true, "page": 2}));
        assert!(result.is_valid());
    }

    #[test]
    fn test_null_arguments_as_empty() {
        assert!(check("get_pending_orders", Value::Null).is_valid());
        assert!(!check("close_position", Value::Null).is_valid());
    }

    #[test]
    fn test_non_object_arguments() {
        let result = check("get_open_positions", json!([1, 2]));
        assert_eq!(
            result,
            ValidationResult::Invalid(
                "Arguments for get_open_positions must be an object, got array".to_string()
            )
        );
    }

    #[test]
    fn test_missing_required_for_every_tool() {
        for tool in list_tools() {
            let full = full_arguments(tool);
            assert!(validate(tool, &full).is_valid(), "{} full args", tool.name);

            for spec in tool.required_params() {
                let mut args = full.clone();
                args.as_object_mut().unwrap().remove(spec.name);
                assert_eq!(
                    validate(tool, &args),
                    ValidationResult::Invalid(format!("Missing required parameter: {}", spec.name)),
                    "{} without {}",
                    tool.name,
                    spec.name
                );
            }
        }
    }

    #[test]
    fn test_type_mismatch() {
        let cases = [
            ("create_order", json!({"symbol": "EURUSD", "type": "BUY", "volume": "0.1"}), "volume"),
            ("create_order", json!({"symbol": 5, "type": "BUY", "volume": 0.1}), "symbol"),
            ("modify_order", json!({"ticket": "123"}), "ticket"),
            ("modify_order", json!({"ticket": 123, "sl": null}), "sl"),
            ("get_account_info", json!({"account": "42"}), "account"),
            ("get_symbol_price", json!({"symbol": ["EURUSD"]}), "symbol"),
        ];

        for (tool, args, param) in cases {
            match check(tool, args) {
                ValidationResult::Invalid(reason) => {
                    assert!(reason.starts_with(&format!("Parameter {} must be of type", param)), "{}", reason)
                }
                ValidationResult::Valid => panic!("{} accepted bad {}", tool, param),
            }
        }
    }

    #[test]
    fn test_object_param_type() {
        let mut args = optimization_args();
        args["params"] = json!("TakeProfit=10");
        assert!(!check("run_optimization", args).is_valid());
    }

    #[test]
    fn test_optimization_mode_enum() {
        for mode in ["genetic", "all_possible"] {
            let mut args = optimization_args();
            args["optimization_mode"] = json!(mode);
            assert!(check("run_optimization", args).is_valid(), "{}", mode);
        }

        for mode in [json!("fast"), json!("GENETIC"), json!("")] {
            let mut args = optimization_args();
            args["optimization_mode"] = mode.clone();
            assert!(!check("run_optimization", args).is_valid(), "{}", mode);
        }
    }

    #[test]
    fn test_save_format_enum() {
        assert!(check("save_optimization_results", json!({"optimization_id": "abc", "format": "csv"})).is_valid());
        assert!(!check("save_optimization_results", json!({"optimization_id": "abc", "format": "xlsx"})).is_valid());
    }

    fn full_arguments(tool: &ToolDefinition) -> Value {
        let mut args = serde_json::Map::new();
        for spec in tool.params {
            let value = match (spec.allowed.first(), spec.param_type) {
                (Some(first), _) => json!(first),
                (None, crate::tools::registry::ParamType::Number) => json!(1),
                (None, crate::tools::registry::ParamType::String) => json!("x"),
                (None, crate::tools::registry::ParamType::Object) => json!({}),
                (None, crate::tools::registry::ParamType::Any) => Value::Null,
            };
            args.insert(spec.name.to_string(), value);
        }
        Value::Object(args)
    }
}
