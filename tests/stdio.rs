//! Drive the mt5-mcp binary over framed stdio

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

fn frame(value: Value) -> Vec<u8> {
    let body = serde_json::to_vec(&value).unwrap();
    let mut out = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
    out.extend_from_slice(&body);
    out
}

fn read_frames(mut bytes: &[u8]) -> Vec<Value> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        let split = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("frame header terminator");
        let header = std::str::from_utf8(&bytes[..split]).unwrap();
        let len: usize = header
            .trim()
            .strip_prefix("Content-Length:")
            .expect("Content-Length header")
            .trim()
            .parse()
            .unwrap();
        let start = split + 4;
        frames.push(serde_json::from_slice(&bytes[start..start + len]).unwrap());
        bytes = &bytes[start + len..];
    }
    frames
}

/// Binary with isolated configuration and unreachable backends
fn mt5_mcp(config: &NamedTempFile) -> Command {
    mt5_mcp_with_account(config, "http://127.0.0.1:1")
}

fn mt5_mcp_with_account(config: &NamedTempFile, account_endpoint: &str) -> Command {
    let mut cmd = Command::cargo_bin("mt5-mcp").unwrap();
    cmd.env_remove("MT5_API_ENDPOINT")
        .env_remove("MT5_API_KEY")
        .env_remove("MT5_FLASK_API")
        .env_remove("MT5_FLASK_API_KEY")
        .env_remove("MT5_MCP_CONFIG")
        .env("RUST_LOG", "off")
        .arg("--config")
        .arg(config.path())
        .arg("--account-endpoint")
        .arg(account_endpoint)
        .arg("--optimization-endpoint")
        .arg("http://127.0.0.1:1");
    cmd
}

#[test]
fn test_help() {
    Command::cargo_bin("mt5-mcp")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--account-endpoint"))
        .stdout(predicate::str::contains("--once"));
}

#[test]
fn test_session_over_stdio() {
    let config = NamedTempFile::new().unwrap();

    let mut input = Vec::new();
    input.extend(frame(json!({
        "jsonrpc": "2.0", "id": 1, "method": "initialize",
        "params": {"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "test", "version": "0"}}
    })));
    input.extend(frame(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})));
    input.extend(frame(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})));
    input.extend(frame(json!({
        "jsonrpc": "2.0", "id": 3, "method": "tools/call",
        "params": {"name": "launch_rocket", "arguments": {}}
    })));
    input.extend(frame(json!({
        "jsonrpc": "2.0", "id": 4, "method": "tools/call",
        "params": {"name": "get_symbol_price", "arguments": {}}
    })));
    input.extend(frame(json!({
        "jsonrpc": "2.0", "id": 5, "method": "tools/call",
        "params": {"name": "get_open_positions", "arguments": {}}
    })));

    let output = mt5_mcp(&config).write_stdin(input).assert().success();
    let frames = read_frames(&output.get_output().stdout);

    assert_eq!(frames.len(), 5);
    let ids: Vec<_> = frames.iter().map(|f| f["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);

    assert_eq!(frames[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(frames[0]["result"]["serverInfo"]["name"], "mt5-mcp");

    let tools = frames[1]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 12);
    assert_eq!(tools[0]["name"], "get_account_info");

    assert_eq!(frames[2]["error"]["code"], -32601);
    assert_eq!(frames[2]["error"]["message"], "Unknown tool: launch_rocket");

    assert_eq!(frames[3]["error"]["code"], -32602);
    assert!(frames[3]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Missing required parameter: symbol"));

    let result = &frames[4]["result"];
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("MetaTrader 5 API error: "));
}

#[test]
fn test_once_answers_single_request() {
    let config = NamedTempFile::new().unwrap();

    let mut input = frame(json!({"jsonrpc": "2.0", "id": "a", "method": "ping"}));
    input.extend(frame(json!({"jsonrpc": "2.0", "id": "b", "method": "ping"})));

    let output = mt5_mcp(&config)
        .arg("--once")
        .write_stdin(input)
        .assert()
        .success();
    let frames = read_frames(&output.get_output().stdout);

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["id"], "a");
    assert_eq!(frames[0]["result"], json!({}));
}

#[test]
fn test_bad_config_file_fails() {
    let mut config = NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut config, b"[account\nendpoint = ").unwrap();

    mt5_mcp(&config)
        .write_stdin(Vec::new())
        .assert()
        .failure();
}

#[test]
fn test_schemeless_endpoint_fails_at_startup() {
    let config = NamedTempFile::new().unwrap();

    mt5_mcp_with_account(&config, "localhost:5555")
        .write_stdin(Vec::new())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid base address for account"));
}
