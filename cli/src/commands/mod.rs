// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the LLM gateway CLI

pub mod config;
pub mod embed;
pub mod generate;
pub mod inspect;

pub use self::config::ConfigCommand;
pub use self::embed::EmbedArgs;
pub use self::generate::GenerateArgs;

use gateway_sdk::GatewayClient;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Base URL of the gateway targeted by client commands
pub fn base_url(host: Option<&str>, port: Option<u16>) -> String {
    let host = match host.map(str::trim) {
        // A wildcard bind address is not dialable
        Some("0.0.0.0") | Some("") | None => DEFAULT_HOST,
        Some(host) => host,
    };
    let port = port.unwrap_or(DEFAULT_PORT);

    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}:{}", host.trim_end_matches('/'), port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

pub fn client(host: Option<&str>, port: Option<u16>, api_key: Option<&str>) -> GatewayClient {
    let client = GatewayClient::new(base_url(host, port));
    match api_key {
        Some(key) if !key.is_empty() => client.with_api_key(key),
        _ => client,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url(None, None), "http://127.0.0.1:8000");
        assert_eq!(base_url(Some("0.0.0.0"), Some(9000)), "http://127.0.0.1:9000");
        assert_eq!(base_url(Some("gateway.internal"), None), "http://gateway.internal:8000");
        assert_eq!(base_url(Some("https://gw.example.com"), Some(443)), "https://gw.example.com:443");
    }
}
