use serde::{Deserialize, Serialize};

/// Resize policy of a widget.
///
/// On the wire this is either a positive number (width ÷ height) or the
/// string `"flex"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAspectRatio", into = "RawAspectRatio")]
pub enum AspectRatio {
    Fixed(f64),
    Flex,
}

impl AspectRatio {
    pub const DEFAULT_RATIO: f64 = 2.0;

    /// `None` unless `ratio` is finite and positive.
    pub fn fixed(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self::Fixed(ratio))
    }

    pub fn ratio(&self) -> Option<f64> {
        match self {
            Self::Fixed(r) => Some(*r),
            Self::Flex => None,
        }
    }

    pub fn is_flex(&self) -> bool {
        matches!(self, Self::Flex)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::Fixed(Self::DEFAULT_RATIO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAspectRatio {
    Number(f64),
    Text(String),
}

impl TryFrom<RawAspectRatio> for AspectRatio {
    type Error = String;

    fn try_from(raw: RawAspectRatio) -> Result<Self, Self::Error> {
        match raw {
            RawAspectRatio::Number(n) => {
                AspectRatio::fixed(n).ok_or_else(|| format!("aspect ratio must be positive, got {n}"))
            }
            RawAspectRatio::Text(s) if s.trim().eq_ignore_ascii_case("flex") => Ok(AspectRatio::Flex),
            RawAspectRatio::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(AspectRatio::fixed)
                .ok_or_else(|| format!("unknown aspect ratio {s:?}")),
        }
    }
}

impl From<AspectRatio> for RawAspectRatio {
    fn from(value: AspectRatio) -> Self {
        match value {
            AspectRatio::Fixed(r) => RawAspectRatio::Number(r),
            AspectRatio::Flex => RawAspectRatio::Text("flex".to_string()),
        }
    }
}

/// One widget's place on the real screen. Coordinates are unscaled logical
/// pixels; the preview scale never ends up in here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetPlacement {
    pub id: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, alias = "aspectRatio")]
    pub aspect_ratio: AspectRatio,
}

impl WidgetPlacement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: false,
            x: 0,
            y: 0,
            width: None,
            height: None,
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Id with its first character upper-cased, as shown in the widget list.
    pub fn display_name(&self) -> String {
        let mut chars = self.id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// What discovery knows about a widget that may not be configured yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetMeta {
    pub aspect_ratio: Option<AspectRatio>,
}

/// Discovered widgets in discovery order.
pub type Discovery = Vec<(String, WidgetMeta)>;
