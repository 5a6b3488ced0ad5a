//! HTTP surface of the daemon.
//!
//! Two routes, as small as the device itself:
//! - `GET /light` returns the serialized state (`{"status": <bool>}`).
//! - `PUT /light` either starts a background blink (`{"blink": "500ms"}`)
//!   or stops all blinking and sets the state (`{"on": true}`).
//!
//! The request body is decoded by hand rather than through the `Json`
//! extractor: malformed input must come back as a 500 with the decoder
//! message in the body, not as the framework's default rejection.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use log::{info, warn};
use serde::{Deserialize, Deserializer};

use crate::devices::Light;
use crate::errors::Error;
use crate::utils::BlinkToken;

/// Builds the router serving the given light under `/light`.
pub fn router(light: Light) -> Router {
    Router::new()
        .route("/light", get(get_light).put(update_light))
        .with_state(light)
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    /// Blink interval: a string with unit (`"500ms"`, `"2s"`, `"1m"`) or a
    /// bare number of milliseconds.
    #[serde(default, deserialize_with = "deserialize_interval")]
    blink: Option<Duration>,
    /// Requested on/off state.
    on: Option<bool>,
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Millis(ms)) => Ok(Some(Duration::from_millis(ms))),
        Some(Raw::Text(text)) => parse_interval(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Parses `"500ms"`, `"2s"` or `"1.5m"` style interval strings.
fn parse_interval(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let unit_start = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .ok_or_else(|| format!("missing unit in interval '{text}'"))?;
    let (value, unit) = text.split_at(unit_start);
    let value: f64 = value
        .parse()
        .map_err(|_| format!("invalid interval '{text}'"))?;
    let millis = match unit.trim() {
        "ms" => value,
        "s" => value * 1_000.0,
        "m" => value * 60_000.0,
        unit => return Err(format!("unknown interval unit '{unit}'")),
    };
    if millis < 1.0 {
        return Err(format!("interval '{text}' is too short"));
    }
    Ok(Duration::from_millis(millis as u64))
}

/// `GET /light`
async fn get_light(State(light): State<Light>) -> (StatusCode, Vec<u8>) {
    match light.to_json() {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            err.to_string().into_bytes(),
        ),
    }
}

/// `PUT /light`
async fn update_light(State(light): State<Light>, body: Bytes) -> (StatusCode, String) {
    let request: UpdateRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            let err = Error::InvalidRequest {
                info: err.to_string(),
            };
            warn!("rejecting malformed update: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
        }
    };

    if let Some(interval) = request.blink {
        let token = BlinkToken::new();
        let blinker = light.clone();
        tokio::spawn(async move { blinker.blink(interval, token).await });
        info!("blinking every {interval:?}");
        return (StatusCode::OK, format!("blinking on {interval:?} duration"));
    }

    if let Some(on) = request.on {
        light.stop_blink();
        info!("turning light {on}");
        match on {
            true => light.turn_on(),
            false => light.turn_off(),
        }
        return (StatusCode::OK, format!("turning light {on}"));
    }

    // Neither field given: nothing to do.
    (StatusCode::OK, String::new())
}
