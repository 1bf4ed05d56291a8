//! Fire-and-forget log shipping to the backend `/api/logs` sink.

#[cfg(target_arch = "wasm32")]
use gloo::net::http::Request;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

use shared::ClientLogRequest;

use crate::services::api::DEFAULT_BASE_URL;

/// Log sink endpoint, derived from the same origin the API client talks to.
fn logs_url() -> String {
    format!("{}/api/logs", DEFAULT_BASE_URL)
}

pub struct Logger;

impl Logger {
    pub fn debug_with_component(component: &str, message: &str) {
        Self::log("debug", message, Some(component.to_string()));
    }

    pub fn info_with_component(component: &str, message: &str) {
        Self::log("info", message, Some(component.to_string()));
    }

    pub fn warn_with_component(component: &str, message: &str) {
        Self::log("warn", message, Some(component.to_string()));
    }

    pub fn error_with_component(component: &str, message: &str) {
        Self::log("error", message, Some(component.to_string()));
    }

    fn log(level: &str, message: &str, component: Option<String>) {
        let request = ClientLogRequest {
            level: level.to_string(),
            message: message.to_string(),
            component,
        };

        // Never block rendering on a log write; a lost record is fine.
        #[cfg(target_arch = "wasm32")]
        spawn_local(async move {
            if let Ok(builder) = Request::post(&logs_url()).json(&request) {
                let _ = builder.send().await;
            }
        });
        #[cfg(not(target_arch = "wasm32"))]
        let _ = request;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sink_shares_the_api_origin() {
        assert_eq!(logs_url(), format!("{}/api/logs", DEFAULT_BASE_URL));
        assert!(logs_url().starts_with(DEFAULT_BASE_URL));
    }
}

