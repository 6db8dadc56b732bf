//! Typed per-tool requests
//!
//! Untyped arguments stop here: a call is validated against its tool
//! definition and then decoded into one of these structures.

use crate::tools::registry::ToolDefinition;
use crate::tools::validate::{validate, ValidationResult};
use crate::types::{GatewayError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountInfoArgs {
    pub account: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SymbolArgs {
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderArgs {
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub volume: Number,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModifyOrderArgs {
    pub ticket: Number,
    pub sl: Option<Number>,
    pub tp: Option<Number>,
}

/// Body of `PUT /order/{ticket}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopLevels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp: Option<Number>,
}

impl ModifyOrderArgs {
    pub fn stop_levels(&self) -> StopLevels {
        StopLevels {
            sl: self.sl.clone(),
            tp: self.tp.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TicketArgs {
    pub ticket: Number,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    #[default]
    Genetic,
    AllPossible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptimizationArgs {
    pub symbol: String,
    pub ea: String,
    pub period: String,
    pub date_from: String,
    pub date_to: String,
    pub deposit: Number,
    pub params: Map<String, Value>,
    #[serde(default)]
    pub optimization_mode: OptimizationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_options: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptimizationIdArgs {
    pub optimization_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResultsArgs {
    pub optimization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ResultFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ea_name: Option<String>,
}

/// A validated tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    GetAccountInfo(AccountInfoArgs),
    GetSymbolPrice(SymbolArgs),
    GetOpenPositions,
    GetPendingOrders,
    CreateOrder(CreateOrderArgs),
    ModifyOrder(ModifyOrderArgs),
    ClosePosition(TicketArgs),
    DeleteOrder(TicketArgs),
    RunOptimization(RunOptimizationArgs),
    GetOptimizationStatus(OptimizationIdArgs),
    GetOptimizationResults(OptimizationIdArgs),
    SaveOptimizationResults(SaveResultsArgs),
}

impl ToolRequest {
    /// Validate arguments for `tool` and decode them into a typed request
    pub fn parse(tool: &ToolDefinition, arguments: &Value) -> Result<Self> {
        if let ValidationResult::Invalid(reason) = validate(tool, arguments) {
            return Err(GatewayError::InvalidParams(reason));
        }

        let request = match tool.name {
            "get_account_info" => ToolRequest::GetAccountInfo(decode(arguments)?),
            "get_symbol_price" => ToolRequest::GetSymbolPrice(decode(arguments)?),
            "get_open_positions" => ToolRequest::GetOpenPositions,
            "get_pending_orders" => ToolRequest::GetPendingOrders,
            "create_order" => ToolRequest::CreateOrder(decode(arguments)?),
            "modify_order" => ToolRequest::ModifyOrder(decode(arguments)?),
            "close_position" => ToolRequest::ClosePosition(decode(arguments)?),
            "delete_order" => ToolRequest::DeleteOrder(decode(arguments)?),
            "run_optimization" => ToolRequest::RunOptimization(decode(arguments)?),
            "get_optimization_status" => ToolRequest::GetOptimizationStatus(decode(arguments)?),
            "get_optimization_results" => ToolRequest::GetOptimizationResults(decode(arguments)?),
            "save_optimization_results" => ToolRequest::SaveOptimizationResults(decode(arguments)?),
            other => return Err(GatewayError::UnknownTool(other.to_string())),
        };

        Ok(request)
    }
}

fn decode<T: DeserializeOwned>(arguments: &Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(arguments).map_err(|e| GatewayError::InvalidParams(e.to_string()))
}
