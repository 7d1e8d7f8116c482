use serde::{Deserialize, Serialize};

/// Output layer produced by an encoding preset
///
/// Width and height are absolute pixels (`"1280"`) or relative to the
/// source (`"50%"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    /// Used to name the output file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Layer {
    /// Layer of the given dimensions
    pub fn new(width: impl Into<String>, height: impl Into<String>) -> Self {
        Layer {
            width: Some(width.into()),
            height: Some(height.into()),
            label: None,
        }
    }
}

/// Encoding layer, discriminated on the wire by `@odata.type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum VideoLayer {
    /// PNG thumbnail layer
    #[serde(rename = "#Microsoft.Media.PngLayer")]
    Png(Layer),
}

impl VideoLayer {
    /// Dimensions and label shared by every layer kind
    pub fn layer(&self) -> &Layer {
        match self {
            VideoLayer::Png(layer) => layer,
        }
    }
}
