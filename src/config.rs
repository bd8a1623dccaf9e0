//! Dashboard configuration.
//!
//! Loaded from a YAML file; every section falls back to built-in defaults so a
//! partial file (or none at all) is valid. API credentials can also come from
//! `SHEET_DASH_APP_ID` / `SHEET_DASH_ACCESS_KEY`.

use std::{env, fs::File, io::Read, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    chart::DEFAULT_CHART_DAYS,
    mapping::MappingRules,
    timekeeping::{DEFAULT_TOP_EMPLOYEES, FULL_TIME_HOURS},
    view::DEFAULT_PAGE_SIZE,
};

pub const APP_ID_ENV: &str = "SHEET_DASH_APP_ID";
pub const ACCESS_KEY_ENV: &str = "SHEET_DASH_ACCESS_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub app_id: Option<String>,
    pub access_key: Option<String>,
    pub locale: String,
    pub timezone: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.appsheet.com/api/v2".to_string(),
            app_id: None,
            access_key: None,
            locale: "vi-VN".to_string(),
            timezone: "Asia/Ho_Chi_Minh".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub sales: String,
    pub customers: String,
    pub timekeeping: String,
    pub personnel: String,
    pub revenue_expense: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            sales: "Bán hàng".to_string(),
            customers: "Danh sách KH".to_string(),
            timekeeping: "Chấm công".to_string(),
            personnel: "Nhân sự".to_string(),
            revenue_expense: "Thu chi".to_string(),
        }
    }
}

impl TableNames {
    /// Maps a well-known alias (`sales`, `timekeeping`, ...) to the configured table
    /// name; anything else is taken as a literal table name.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        match name.trim().to_ascii_lowercase().as_str() {
            "sales" => self.sales.as_str(),
            "customers" => self.customers.as_str(),
            "timekeeping" => self.timekeeping.as_str(),
            "personnel" => self.personnel.as_str(),
            "revenue-expense" | "revenue_expense" => self.revenue_expense.as_str(),
            _ => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub page_size: usize,
    pub chart_days: usize,
    pub top_employees: usize,
    pub full_time_hours: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            chart_days: DEFAULT_CHART_DAYS,
            top_employees: DEFAULT_TOP_EMPLOYEES,
            full_time_hours: FULL_TIME_HOURS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub tables: TableNames,
    pub mapping: MappingRules,
    pub display: DisplayConfig,
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let mut file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .with_context(|| format!("Reading config file {path:?}"))?;
        Self::from_yaml_str(&contents).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Loads `path` when given, otherwise defaults; environment credentials are
    /// applied last and win over the file.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_id) = lookup(APP_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.app_id = Some(app_id);
        }
        if let Some(key) = lookup(ACCESS_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.access_key = Some(key);
        }
    }

    /// YAML dump with the access key masked.
    pub fn to_redacted_yaml(&self) -> Result<String> {
        let mut redacted = self.clone();
        if redacted.api.access_key.is_some() {
            redacted.api.access_key = Some("********".to_string());
        }
        Ok(serde_yaml::to_string(&redacted)?)
    }
}
