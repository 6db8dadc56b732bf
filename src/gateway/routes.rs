//! Tool → backend endpoint mapping
//!
//! Ticket, symbol and id arguments are substituted into the path as-is.

use crate::config::Backend;
use crate::gateway::client::{BackendRequest, HttpMethod};
use crate::tools::ToolRequest;
use crate::types::Result;

pub fn route(request: &ToolRequest) -> Result<BackendRequest> {
    use Backend::{Account, Optimization};
    use HttpMethod::{Delete, Get, Post, Put};

    let routed = match request {
        ToolRequest::GetAccountInfo(args) => match &args.account {
            Some(account) => BackendRequest::new(Account, Get, format!("/account/{}", account)),
            None => BackendRequest::new(Account, Get, "/account"),
        },
        ToolRequest::GetSymbolPrice(args) => {
            BackendRequest::new(Account, Get, format!("/symbol/{}", args.symbol))
        }
        ToolRequest::GetOpenPositions => BackendRequest::new(Account, Get, "/positions"),
        ToolRequest::GetPendingOrders => BackendRequest::new(Account, Get, "/orders"),
        ToolRequest::CreateOrder(args) => {
            BackendRequest::new(Account, Post, "/order").with_body(serde_json::to_value(args)?)
        }
        ToolRequest::ModifyOrder(args) => {
            BackendRequest::new(Account, Put, format!("/order/{}", args.ticket))
                .with_body(serde_json::to_value(args.stop_levels())?)
        }
        ToolRequest::ClosePosition(args) => {
            BackendRequest::new(Account, Delete, format!("/position/{}", args.ticket))
        }
        ToolRequest::DeleteOrder(args) => {
            BackendRequest::new(Account, Delete, format!("/order/{}", args.ticket))
        }
        ToolRequest::RunOptimization(args) => {
            BackendRequest::new(Optimization, Post, "/optimize").with_body(serde_json::to_value(args)?)
        }
        ToolRequest::GetOptimizationStatus(args) => BackendRequest::new(
            Optimization,
            Get,
            format!("/optimization_status/{}", args.optimization_id),
        ),
        ToolRequest::GetOptimizationResults(args) => BackendRequest::new(
            Optimization,
            Get,
            format!("/optimization_results/{}", args.optimization_id),
        ),
        ToolRequest::SaveOptimizationResults(args) => {
            BackendRequest::new(Optimization, Post, "/save_results").with_body(serde_json::to_value(args)?)
        }
    };

    Ok(routed)
}
