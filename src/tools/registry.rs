//! Static tool catalog
//!
//! Each tool declares its parameters once; the published JSON schema and
//! the runtime validator are both derived from these declarations.

use crate::config::Backend;
use serde_json::{json, Map, Value};

/// Declared run-time type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Number,
    String,
    Object,
    Any,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Object => "object",
            ParamType::Any => "any",
        }
    }

    /// Whether a decoded JSON value has this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::Number => value.is_number(),
            ParamType::String => value.is_string(),
            ParamType::Object => value.is_object(),
            ParamType::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub required: bool,
    pub description: &'static str,
    /// Allowed values for string parameters; empty means unconstrained
    pub allowed: &'static [&'static str],
    pub default: Option<&'static str>,
}

impl ParamSpec {
    const fn required(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            required: true,
            description,
            allowed: &[],
            default: None,
        }
    }

    const fn optional(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            required: false,
            description,
            allowed: &[],
            default: None,
        }
    }

    const fn one_of(self, allowed: &'static [&'static str]) -> Self {
        Self { allowed, ..self }
    }

    const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        if self.param_type != ParamType::Any {
            schema.insert("type".to_string(), json!(self.param_type.as_str()));
        }
        schema.insert("description".to_string(), json!(self.description));
        if !self.allowed.is_empty() {
            schema.insert("enum".to_string(), json!(self.allowed));
        }
        if let Some(default) = self.default {
            schema.insert("default".to_string(), json!(default));
        }
        Value::Object(schema)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub backend: Backend,
    pub params: &'static [ParamSpec],
}

impl ToolDefinition {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }

    /// JSON schema published through `tools/list`
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self.required_params().map(|p| p.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

use ParamType::{Number, Object, String as Str};

static TOOLS: &[ToolDefinition] = &[
    ToolDefinition {
        name: "get_account_info",
        description: "Get trading account information (balance, equity, margin, leverage). Optionally select an account by number.",
        backend: Backend::Account,
        params: &[ParamSpec::optional("account", Number, "Account number (defaults to the logged-in account)")],
    },
    ToolDefinition {
        name: "get_symbol_price",
        description: "Get the current bid/ask price for a trading symbol.",
        backend: Backend::Account,
        params: &[ParamSpec::required("symbol", Str, "Symbol name, e.g. EURUSD")],
    },
    ToolDefinition {
        name: "get_open_positions",
        description: "List all open positions on the account.",
        backend: Backend::Account,
        params: &[],
    },
    ToolDefinition {
        name: "get_pending_orders",
        description: "List all pending orders on the account.",
        backend: Backend::Account,
        params: &[],
    },
    ToolDefinition {
        name: "create_order",
        description: "Place a market or pending order.",
        backend: Backend::Account,
        params: &[
            ParamSpec::required("symbol", Str, "Symbol name, e.g. EURUSD"),
            ParamSpec::required("type", Str, "Order type, e.g. BUY, SELL, BUY_LIMIT, SELL_STOP"),
            ParamSpec::required("volume", Number, "Volume in lots"),
            ParamSpec::optional("price", Number, "Price for pending orders"),
            ParamSpec::optional("sl", Number, "Stop loss price"),
            ParamSpec::optional("tp", Number, "Take profit price"),
            ParamSpec::optional("comment", Str, "Order comment"),
        ],
    },
    ToolDefinition {
        name: "modify_order",
        description: "Modify stop loss and/or take profit of an order or position.",
        backend: Backend::Account,
        params: &[
            ParamSpec::required("ticket", Number, "Order or position ticket"),
            ParamSpec::optional("sl", Number, "New stop loss price"),
            ParamSpec::optional("tp", Number, "New take profit price"),
        ],
    },
    ToolDefinition {
        name: "close_position",
        description: "Close an open position.",
        backend: Backend::Account,
        params: &[ParamSpec::required("ticket", Number, "Position ticket")],
    },
    ToolDefinition {
        name: "delete_order",
        description: "Delete a pending order.",
        backend: Backend::Account,
        params: &[ParamSpec::required("ticket", Number, "Order ticket")],
    },
    ToolDefinition {
        name: "run_optimization",
        description: "Start a strategy tester optimization for an Expert Advisor. Returns an optimization id to poll.",
        backend: Backend::Optimization,
        params: &[
            ParamSpec::required("symbol", Str, "Symbol to optimize on"),
            ParamSpec::required("ea", Str, "Expert Advisor name"),
            ParamSpec::required("period", Str, "Chart timeframe, e.g. H1"),
            ParamSpec::required("date_from", Str, "Start date (YYYY-MM-DD)"),
            ParamSpec::required("date_to", Str, "End date (YYYY-MM-DD)"),
            ParamSpec::required("deposit", Number, "Initial deposit"),
            ParamSpec::required("params", Object, "Parameter ranges keyed by input name, each with min, max and step"),
            ParamSpec::optional("optimization_mode", Str, "Optimization algorithm")
                .one_of(&["genetic", "all_possible"])
                .with_default("genetic"),
            ParamSpec::optional("other_options", Object, "Additional strategy tester options"),
        ],
    },
    ToolDefinition {
        name: "get_optimization_status",
        description: "Get the status of a running optimization.",
        backend: Backend::Optimization,
        params: &[ParamSpec::required("optimization_id", Str, "Optimization id returned by run_optimization")],
    },
    ToolDefinition {
        name: "get_optimization_results",
        description: "Get the results and best parameter set of a completed optimization.",
        backend: Backend::Optimization,
        params: &[ParamSpec::required("optimization_id", Str, "Optimization id returned by run_optimization")],
    },
    ToolDefinition {
        name: "save_optimization_results",
        description: "Save the results of a completed optimization as a report on the optimization server.",
        backend: Backend::Optimization,
        params: &[
            ParamSpec::required("optimization_id", Str, "Optimization id returned by run_optimization"),
            ParamSpec::optional("format", Str, "Additional export format").one_of(&["csv", "json"]),
            ParamSpec::optional("path", Str, "Output path on the optimization server"),
            ParamSpec::optional("ea_name", Str, "Expert Advisor name used in report file names"),
        ],
    },
];

/// All tools in stable catalog order
pub fn list_tools() -> &'static [ToolDefinition] {
    TOOLS
}

pub fn find_tool(name: &str) -> Option<&'static ToolDefinition> {
    TOOLS.iter().find(|t| t.name == name)
}
