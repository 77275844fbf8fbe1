// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Vendor error translation shared by the adapters.
//
// Both Gemini and OpenAI report failures as `{"error": {"message": ...}}`;
// everything else about the body is vendor-specific and only inspected here.

use crate::domain::llm::{LLMError, ProviderKind};
use reqwest::StatusCode;
use serde::Deserialize;

const MAX_MESSAGE_LEN: usize = 500;

#[derive(Deserialize)]
struct VendorErrorBody {
    error: VendorErrorDetail,
}

#[derive(Deserialize)]
struct VendorErrorDetail {
    #[serde(default)]
    message: String,
    /// Gemini: "INVALID_ARGUMENT", "RESOURCE_EXHAUSTED", ...
    #[serde(default)]
    status: Option<String>,
}

/// Map a transport-level failure (no HTTP status) onto the taxonomy
pub(crate) fn from_transport(provider: ProviderKind, err: reqwest::Error) -> LLMError {
    if err.is_timeout() {
        LLMError::ProviderTimeout {
            provider,
            message: err.to_string(),
        }
    } else {
        LLMError::ProviderUnknown {
            provider,
            message: format!("Network error: {}", err),
        }
    }
}

/// Map a non-success HTTP response onto the taxonomy
pub(crate) fn from_status(provider: ProviderKind, status: StatusCode, body: &str) -> LLMError {
    let parsed = serde_json::from_str::<VendorErrorBody>(body).ok();
    let vendor_status = parsed.as_ref().and_then(|b| b.error.status.clone());
    let message = match parsed {
        Some(b) if !b.error.message.is_empty() => b.error.message,
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => format!("HTTP {}: {}", status, body.trim()),
    };
    let message = truncate(message);

    // Gemini rejects bad keys with 400 INVALID_ARGUMENT + reason API_KEY_INVALID
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("API_KEY_INVALID")
    {
        return LLMError::ProviderAuth { provider, message };
    }

    if status == StatusCode::TOO_MANY_REQUESTS
        || vendor_status.as_deref() == Some("RESOURCE_EXHAUSTED")
    {
        return LLMError::ProviderRateLimit { provider, message };
    }

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            LLMError::ProviderTimeout { provider, message }
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            LLMError::ProviderInvalidRequest { provider, message }
        }
        _ => LLMError::ProviderUnknown { provider, message },
    }
}

/// Failure while reading or decoding a success body; the request deadline can expire here too
pub(crate) fn from_body(provider: ProviderKind, err: reqwest::Error) -> LLMError {
    if err.is_timeout() {
        from_transport(provider, err)
    } else {
        malformed(provider, err)
    }
}

/// Response body could not be decoded into the expected vendor shape
pub(crate) fn malformed(provider: ProviderKind, err: impl std::fmt::Display) -> LLMError {
    LLMError::ProviderUnknown {
        provider,
        message: format!("Failed to parse response: {}", err),
    }
}

fn truncate(mut message: String) -> String {
    if message.len() > MAX_MESSAGE_LEN {
        let mut cut = MAX_MESSAGE_LEN;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
        message.push_str("...");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_invalid_key_is_auth_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        let err = from_status(ProviderKind::Google, StatusCode::BAD_REQUEST, body);
        assert_eq!(err.code(), "PROVIDER_AUTH_ERROR");
        assert_eq!(err.message(), "API key not valid. Please pass a valid API key.");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StatusCode::UNAUTHORIZED, "PROVIDER_AUTH_ERROR"),
            (StatusCode::FORBIDDEN, "PROVIDER_AUTH_ERROR"),
            (StatusCode::TOO_MANY_REQUESTS, "PROVIDER_RATE_LIMITED"),
            (StatusCode::GATEWAY_TIMEOUT, "PROVIDER_TIMEOUT"),
            (StatusCode::BAD_REQUEST, "PROVIDER_INVALID_REQUEST"),
            (StatusCode::NOT_FOUND, "PROVIDER_INVALID_REQUEST"),
            (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_ERROR"),
            (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_ERROR"),
        ];
        for (status, code) in cases {
            let err = from_status(ProviderKind::OpenAI, status, "");
            assert_eq!(err.code(), code, "status {}", status);
            assert_eq!(err.provider(), Some(ProviderKind::OpenAI));
        }
    }

    #[test]
    fn test_quota_exhausted_is_rate_limit() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = from_status(ProviderKind::Google, StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(err.code(), "PROVIDER_RATE_LIMITED");
        assert_eq!(err.message(), "Quota exceeded");
    }

    #[test]
    fn test_plain_text_body_is_kept() {
        let err = from_status(ProviderKind::OpenAI, StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.message(), "HTTP 502 Bad Gateway: upstream down");
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let body = "x".repeat(2_000);
        let err = from_status(ProviderKind::OpenAI, StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.message().len() <= MAX_MESSAGE_LEN + 3);
        assert!(err.message().ends_with("..."));
    }
}
