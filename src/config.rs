use std::{env, path::Path, path::PathBuf};

use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::table::{DerivedColumns, PageSize, TableOptions};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub upload_path: String,
    pub ask_path: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            upload_path: "/upload_csv/".to_string(),
            ask_path: "/ask/".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub page_size: PageSize,
    pub long_text_threshold: usize,
    pub quantity_fields: Vec<String>,
    pub cost_fields: Vec<String>,
    pub inventory_value_field: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        let derived = DerivedColumns::default();
        Self {
            page_size: PageSize::default(),
            long_text_threshold: 100,
            quantity_fields: derived.quantity_fields,
            cost_fields: derived.cost_fields,
            inventory_value_field: derived.output_field,
        }
    }
}

impl TableConfig {
    pub fn derived(&self) -> DerivedColumns {
        DerivedColumns {
            quantity_fields: self.quantity_fields.clone(),
            cost_fields: self.cost_fields.clone(),
            output_field: self.inventory_value_field.clone(),
        }
    }

    /// Options for answer tables.
    pub fn options(&self) -> TableOptions {
        TableOptions {
            page_size: self.page_size,
            long_text_threshold: self.long_text_threshold,
            derived: None,
        }
    }

    /// Options for drill-down tables, which carry the computed inventory value.
    pub fn detail_options(&self) -> TableOptions {
        TableOptions {
            derived: Some(self.derived()),
            ..self.options()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub theme: ThemeName,
    /// Optional JSON keybinding file
    #[serde(default)]
    pub keybindings: Option<PathBuf>,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// The built-in defaults only.
    pub fn embedded() -> Result<Self, config::ConfigError> {
        json5::from_str(CONFIG).map_err(|e| config::ConfigError::Message(e.to_string()))
    }

    /// Layer the built-in defaults, a user file and `OPTIX__SECTION__KEY`
    /// environment variables. An explicit path must exist; the default user
    /// file is optional.
    pub fn from_path(config_path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            CONFIG,
            config::FileFormat::Json5,
        ));

        builder = match config_path {
            Some(path) => builder.add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Json5)
                    .required(true),
            ),
            None => builder.add_source(
                config::File::from(get_config_dir().join("config.json5"))
                    .format(config::FileFormat::Json5)
                    .required(false),
            ),
        };

        builder = builder.add_source(
            config::Environment::with_prefix(&PROJECT_NAME)
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = ProjectDirs::from("", "", env!("CARGO_PKG_NAME")) {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults() {
        let cfg = Config::embedded().unwrap();
        assert_eq!(cfg.backend, BackendConfig::default());
        assert_eq!(cfg.table, TableConfig::default());
        assert_eq!(cfg.theme, ThemeName::Dark);
        assert_eq!(cfg.keybindings, None);
    }

    #[test]
    fn test_user_file_overrides() {
        let mut file = tempfile::Builder::new().suffix(".json5").tempfile().unwrap();
        writeln!(
            file,
            "{{ backend: {{ base_url: 'http://analysis:9000' }}, table: {{ page_size: 50 }}, theme: 'light' }}"
        )
        .unwrap();

        let cfg = Config::from_path(Some(file.path())).unwrap();
        assert_eq!(cfg.backend.base_url, "http://analysis:9000");
        assert_eq!(cfg.backend.ask_path, "/ask/");
        assert_eq!(cfg.table.page_size, PageSize::Fifty);
        assert_eq!(cfg.table.quantity_fields.last().map(String::as_str), Some("Qty"));
        assert_eq!(cfg.theme, ThemeName::Light);
    }

    #[test]
    fn test_invalid_page_size_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json5").tempfile().unwrap();
        writeln!(file, "{{ table: {{ page_size: 30 }} }}").unwrap();
        assert!(Config::from_path(Some(file.path())).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::from_path(Some(&dir.path().join("nope.json5"))).is_err());
    }

    #[test]
    fn test_detail_options_carry_derived_columns() {
        let table = TableConfig::default();
        assert!(table.options().derived.is_none());
        assert_eq!(
            table.detail_options().derived.unwrap().output_field,
            "Inventory_Value"
        );
    }
}
