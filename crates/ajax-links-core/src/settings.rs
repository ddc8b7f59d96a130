//! Configuration resolver
//!
//! One immutable [`Settings`] record is resolved per engine instance by laying
//! caller overrides over the defaults. The overrides record deserializes from
//! the same camelCase JSON shape the plugin options have always used, so a
//! root element can carry its options in a `data-*` attribute.

use crate::errors::Result;
use crate::params::ParamMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Attribute marking a root element as an ajax-links region
pub const ROOT_MARKER_ATTRIBUTE: &str = "data-bsp-ajax-links";

/// Attribute holding a root element's JSON options
pub const ROOT_OPTIONS_ATTRIBUTE: &str = "data-bsp-ajax-links-options";

/// Strategy used to merge a fetched fragment into its target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadType {
    /// Replace the target's contents
    #[default]
    Replace,
    /// Append to the target's contents
    Append,
    /// Append, dropping the stale "load more" affordance first
    LoadMore,
}

impl std::fmt::Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                LoadType::Replace => "replace",
                LoadType::Append => "append",
                LoadType::LoadMore => "loadMore",
            }
        )
    }
}

/// Resolved settings for one engine instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Notification emitted on the root when a fetch starts
    pub loading_event_name: String,
    /// Notification emitted on the root after a subtree is scanned
    pub loaded_event_name: String,
    /// Attribute marking navigable elements and naming their target selector
    pub target_attribute_name: String,
    /// Class identifying "load more" affordances
    pub load_more_marker_class: String,
    /// Class applied to a target while its fetch is outstanding
    pub loading_class: String,
    /// Route navigations through browser history
    pub history_replace: bool,
    /// Merge strategy
    pub load_type: LoadType,
    /// Responses are full documents that need fragment extraction
    pub full_page_ajax: bool,
    /// Query parameters appended to every fetch
    pub extra_params: ParamMap,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            loading_event_name: "bsp-ajax-links:loading".to_string(),
            loaded_event_name: "bsp-ajax-links:loaded".to_string(),
            target_attribute_name: "data-ajax-link-target".to_string(),
            load_more_marker_class: "load-more".to_string(),
            loading_class: "bsp-loading-ajax".to_string(),
            history_replace: false,
            load_type: LoadType::Replace,
            full_page_ajax: true,
            extra_params: ParamMap::new(),
        }
    }
}

impl Settings {
    /// Shallow-merge `overrides` onto the defaults.
    pub fn resolve(overrides: SettingsOverrides) -> Self {
        let defaults = Self::default();
        Self {
            loading_event_name: overrides
                .loading_event_name
                .unwrap_or(defaults.loading_event_name),
            loaded_event_name: overrides
                .loaded_event_name
                .unwrap_or(defaults.loaded_event_name),
            target_attribute_name: overrides
                .target_attribute_name
                .unwrap_or(defaults.target_attribute_name),
            load_more_marker_class: overrides
                .load_more_marker_class
                .unwrap_or(defaults.load_more_marker_class),
            loading_class: overrides.loading_class.unwrap_or(defaults.loading_class),
            history_replace: overrides
                .history_replace
                .unwrap_or(defaults.history_replace),
            load_type: overrides.load_type.unwrap_or(defaults.load_type),
            full_page_ajax: overrides.full_page_ajax.unwrap_or(defaults.full_page_ajax),
            extra_params: overrides.extra_params.unwrap_or(defaults.extra_params),
        }
    }

    /// Selector matching every navigable element.
    pub fn target_attribute_selector(&self) -> String {
        format!("[{}]", self.target_attribute_name)
    }

    /// Selector matching every "load more" affordance.
    pub fn load_more_selector(&self) -> String {
        format!(".{}", self.load_more_marker_class)
    }
}

/// Caller-supplied options; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsOverrides {
    /// Overrides [`Settings::loading_event_name`]
    #[serde(alias = "loadingEvent")]
    pub loading_event_name: Option<String>,
    /// Overrides [`Settings::loaded_event_name`]
    #[serde(alias = "loadedEvent")]
    pub loaded_event_name: Option<String>,
    /// Overrides [`Settings::target_attribute_name`]
    #[serde(alias = "dataName")]
    pub target_attribute_name: Option<String>,
    /// Overrides [`Settings::load_more_marker_class`]
    #[serde(alias = "ajaxLinksClass")]
    pub load_more_marker_class: Option<String>,
    /// Overrides [`Settings::loading_class`]
    pub loading_class: Option<String>,
    /// Overrides [`Settings::history_replace`]
    pub history_replace: Option<bool>,
    /// Overrides [`Settings::load_type`]
    pub load_type: Option<LoadType>,
    /// Overrides [`Settings::full_page_ajax`]
    pub full_page_ajax: Option<bool>,
    /// Overrides [`Settings::extra_params`]
    #[serde(deserialize_with = "scalar_params")]
    pub extra_params: Option<ParamMap>,
}

impl SettingsOverrides {
    /// Decode overrides from a JSON options string.
    ///
    /// A blank string decodes to no overrides.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Set the merge strategy.
    pub fn with_load_type(mut self, load_type: LoadType) -> Self {
        self.load_type = Some(load_type);
        self
    }

    /// Enable or disable history synchronization.
    pub fn with_history_replace(mut self, enabled: bool) -> Self {
        self.history_replace = Some(enabled);
        self
    }

    /// Declare whether responses are full documents.
    pub fn with_full_page_ajax(mut self, enabled: bool) -> Self {
        self.full_page_ajax = Some(enabled);
        self
    }

    /// Add one extra fetch parameter.
    pub fn with_extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params
            .get_or_insert_with(ParamMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Use a different navigable-element attribute.
    pub fn with_target_attribute(mut self, name: impl Into<String>) -> Self {
        self.target_attribute_name = Some(name.into());
        self
    }
}

/// `extraParams` arrives from JS, where numbers and booleans are common.
fn scalar_params<'de, D>(deserializer: D) -> std::result::Result<Option<ParamMap>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<indexmap::IndexMap<String, serde_json::Value>> =
        Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut params = ParamMap::with_capacity(raw.len());
    for (key, value) in raw {
        let value = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => String::new(),
            other => {
                return Err(D::Error::custom(format!(
                    "extraParams.{key} must be a scalar, got {other}"
                )))
            }
        };
        params.insert(key, value);
    }
    Ok(Some(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_overrides_resolve_to_defaults() {
        let settings = Settings::resolve(SettingsOverrides::default());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.target_attribute_name, "data-ajax-link-target");
        assert_eq!(settings.load_type, LoadType::Replace);
        assert!(settings.full_page_ajax);
        assert!(!settings.history_replace);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let settings = Settings::resolve(
            SettingsOverrides::default()
                .with_load_type(LoadType::LoadMore)
                .with_history_replace(true),
        );
        assert_eq!(settings.load_type, LoadType::LoadMore);
        assert!(settings.history_replace);
        assert_eq!(settings.loading_event_name, "bsp-ajax-links:loading");
        assert_eq!(settings.load_more_marker_class, "load-more");
    }

    #[test]
    fn json_options_use_plugin_names() {
        let overrides = SettingsOverrides::from_json(
            r#"{"loadType":"loadMore","fullPageAjax":false,"dataName":"data-x",
                "extraParams":{"_context":"partial","page":2,"debug":true}}"#,
        )
        .unwrap();
        let settings = Settings::resolve(overrides);

        assert_eq!(settings.load_type, LoadType::LoadMore);
        assert!(!settings.full_page_ajax);
        assert_eq!(settings.target_attribute_name, "data-x");
        let extra: Vec<_> = settings
            .extra_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            extra,
            vec![("_context", "partial"), ("page", "2"), ("debug", "true")]
        );
    }

    #[test]
    fn blank_json_is_no_overrides() {
        assert_eq!(
            SettingsOverrides::from_json("  ").unwrap(),
            SettingsOverrides::default()
        );
    }

    #[test]
    fn nested_extra_param_is_rejected() {
        let err = SettingsOverrides::from_json(r#"{"extraParams":{"a":{"b":1}}}"#).unwrap_err();
        assert_matches!(err, crate::AjaxLinksError::Options { .. });
    }

    #[test]
    fn unknown_load_type_is_rejected() {
        assert!(SettingsOverrides::from_json(r#"{"loadType":"prepend"}"#).is_err());
    }

    #[test]
    fn selectors_follow_settings() {
        let settings = Settings::default();
        assert_eq!(settings.target_attribute_selector(), "[data-ajax-link-target]");
        assert_eq!(settings.load_more_selector(), ".load-more");
    }
}
