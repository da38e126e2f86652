//! Navigator configuration.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Tunables for line navigation.
///
/// Deserializes from a partial object; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigatorConfig {
    /// Tag name (lowercase) of the block elements navigated between.
    pub paragraph_tag: SmolStr,
    /// `display` value the event target must have for navigation to engage.
    pub flex_display: SmolStr,
    /// Maximum difference in `top`, in pixels, for two boxes to share a row.
    pub row_tolerance_px: f64,
    /// Class put on temporary per-character marker spans.
    pub marker_class: SmolStr,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            paragraph_tag: SmolStr::new_static("p"),
            flex_display: SmolStr::new_static("flex"),
            row_tolerance_px: 1.0,
            marker_class: SmolStr::new_static("quire-caret-marker"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: NavigatorConfig =
            serde_json::from_str(r#"{ "paragraphTag": "div", "rowTolerancePx": 2.5 }"#).unwrap();
        assert_eq!(config.paragraph_tag, "div");
        assert_eq!(config.row_tolerance_px, 2.5);
        assert_eq!(config.flex_display, "flex");
        assert_eq!(config.marker_class, "quire-caret-marker");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: NavigatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, NavigatorConfig::default());
    }
}
