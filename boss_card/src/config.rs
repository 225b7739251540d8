use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::assets::{AssetKind, DirectoryStore};

pub const DEFAULT_AVATAR_DIR: &str = "user_profile";
pub const DEFAULT_AVATAR_EXTENSION: &str = "jpg";
pub const DEFAULT_ICON_DIR: &str = "boss_icon";
pub const DEFAULT_ICON_EXTENSION: &str = "webp";
pub const DEFAULT_TAG_TEMPLATE: &str = "{cycle} phase, {round} round";
pub const DEFAULT_EMPTY_TEMPLATE: &str = "no {category} yet";

/// Render preset; every field may be omitted.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct RenderConfig {
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub avatar_dir: Option<PathBuf>,
    #[serde(default)]
    pub avatar_extension: Option<String>,
    #[serde(default)]
    pub icon_dir: Option<PathBuf>,
    #[serde(default)]
    pub icon_extension: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub tag_template: Option<String>,
    #[serde(default)]
    pub empty_template: Option<String>,
}

impl RenderConfig {
    pub fn avatar_store(&self) -> DirectoryStore {
        DirectoryStore::new(
            AssetKind::Avatar,
            self.avatar_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_AVATAR_DIR)),
            self.avatar_extension
                .as_deref()
                .unwrap_or(DEFAULT_AVATAR_EXTENSION),
        )
    }

    pub fn icon_store(&self) -> DirectoryStore {
        DirectoryStore::new(
            AssetKind::Icon,
            self.icon_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ICON_DIR)),
            self.icon_extension
                .as_deref()
                .unwrap_or(DEFAULT_ICON_EXTENSION),
        )
    }

    pub fn tag_template(&self) -> &str {
        self.tag_template.as_deref().unwrap_or(DEFAULT_TAG_TEMPLATE)
    }

    pub fn empty_template(&self) -> &str {
        self.empty_template
            .as_deref()
            .unwrap_or(DEFAULT_EMPTY_TEMPLATE)
    }
}

pub fn load_render_config(path: &Path) -> Result<RenderConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading render preset {}", path.display()))?;
    let config: RenderConfig = serde_json::from_str(&data)
        .with_context(|| format!("parsing render preset {}", path.display()))?;
    Ok(config)
}

pub fn fill_tag_template(template: &str, cycle: i64, round: i64) -> String {
    template
        .replace("{cycle}", &cycle.to_string())
        .replace("{round}", &round.to_string())
}

pub fn fill_empty_template(template: &str, category: &str) -> String {
    template.replace("{category}", category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config: RenderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(
            config.avatar_store().path_for("1001"),
            PathBuf::from("user_profile/1001.jpg")
        );
        assert_eq!(
            config.icon_store().path_for("301300"),
            PathBuf::from("boss_icon/301300.webp")
        );
        assert_eq!(config.tag_template(), DEFAULT_TAG_TEMPLATE);
        assert_eq!(config.empty_template(), DEFAULT_EMPTY_TEMPLATE);
    }

    #[test]
    fn preset_file_overrides_defaults() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("preset.json");
        fs::write(
            &path,
            r#"{"icon_dir": "icons", "icon_extension": "png", "seed": 7,
                "tag_template": "R{round}/C{cycle}"}"#,
        )
        .expect("write preset");

        let config = load_render_config(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.icon_store().path_for("1"),
            PathBuf::from("icons/1.png")
        );
        assert_eq!(fill_tag_template(config.tag_template(), 3, 12), "R12/C3");
    }

    #[test]
    fn broken_preset_names_the_file() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write preset");
        let err = load_render_config(&path).unwrap_err();
        assert!(format!("{err}").contains("broken.json"));
    }

    #[test]
    fn templates_substitute_placeholders() {
        assert_eq!(
            fill_tag_template(DEFAULT_TAG_TEMPLATE, 3, 12),
            "3 phase, 12 round"
        );
        assert_eq!(
            fill_empty_template(DEFAULT_EMPTY_TEMPLATE, "reserved"),
            "no reserved yet"
        );
    }
}
