// ~/mylivewallpaper/widget-center/src/api_connector.rs

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde_json::Value;

use crate::{
    data_loaders::config::ApiSettings,
    error::StoreError,
    info, warn,
    layout::{AspectRatio, Discovery, WidgetMeta, WidgetPlacement},
    store::{ConfigStore, ScreenInfo, ScreenInfoProvider},
    DEBUG_NAME,
};

pub const CONFIG_PATH: &str = "widgets/config";
pub const DISCOVERY_PATH: &str = "widgets/available";
pub const SCREEN_PATH: &str = "screen";

/// Config store and screen provider backed by the local wallpaper backend.
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpConfigStore {
    client: Client,
    base_url: String,
}

impl HttpConfigStore {
    pub fn new(settings: &ApiSettings) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json(&self, path: &str) -> Result<Value, StoreError> {
        let url = self.url(path);
        info!("[{}][API] GET {}", DEBUG_NAME, url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let body = map_response(response, &url)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Status handling shared by every endpoint: 2xx yields the body.
fn map_response(response: Response, url: &str) -> Result<String, StoreError> {
    let status = response.status().as_u16();

    match status {
        200..=299 => response
            .text()
            .map_err(|e| StoreError::Network(e.to_string())),
        404 => Err(StoreError::NotFound(url.to_string())),
        500..=599 => Err(StoreError::Server(status)),
        _ => Err(StoreError::Unexpected(status)),
    }
}

/// `{"widgets": [...]}`, or a bare array.
pub fn decode_placements(body: Value) -> Result<Vec<WidgetPlacement>, StoreError> {
    let list = match body {
        Value::Object(mut map) => map
            .remove("widgets")
            .ok_or_else(|| StoreError::Decode("missing \"widgets\" field".to_string()))?,
        list @ Value::Array(_) => list,
        other => {
            return Err(StoreError::Decode(format!(
                "expected widget list, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(serde_json::from_value(list)?)
}

/// `{ id: { "aspect_ratio": number|"flex", ... } }` in wire order. A bad
/// aspect ratio only drops the metadata, not the widget.
pub fn decode_discovery(body: Value) -> Result<Discovery, StoreError> {
    let Value::Object(map) = body else {
        return Err(StoreError::Decode(format!(
            "expected widget mapping, got {}",
            json_kind(&body)
        )));
    };

    let discovery = map
        .into_iter()
        .map(|(id, meta)| {
            let raw = meta.get("aspect_ratio").or_else(|| meta.get("aspectRatio"));
            let aspect_ratio = raw.and_then(|v| serde_json::from_value::<AspectRatio>(v.clone()).ok());

            if let (None, Some(v)) = (aspect_ratio, raw) {
                warn!("[{}][API] Ignoring unreadable aspect ratio {} for widget {}", DEBUG_NAME, v, id);
            }

            (id, WidgetMeta { aspect_ratio })
        })
        .collect();

    Ok(discovery)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ConfigStore for HttpConfigStore {
    fn load_placements(&self) -> Result<Vec<WidgetPlacement>, StoreError> {
        decode_placements(self.get_json(CONFIG_PATH)?)
    }

    fn discover(&self) -> Result<Discovery, StoreError> {
        decode_discovery(self.get_json(DISCOVERY_PATH)?)
    }

    fn save_placements(&self, placements: &[WidgetPlacement]) -> Result<(), StoreError> {
        let url = self.url(CONFIG_PATH);
        info!(
            "[{}][API] POST {} ({} widget(s))",
            DEBUG_NAME,
            url,
            placements.len()
        );

        let response = self
            .client
            .post(&url)
            .json(placements)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        map_response(response, &url).map(|_| ())
    }
}

impl ScreenInfoProvider for HttpConfigStore {
    fn screen_info(&self) -> Result<ScreenInfo, StoreError> {
        Ok(serde_json::from_value(self.get_json(SCREEN_PATH)?)?)
    }
}
