use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_URL: &str = "http://www.fec.gov/agenda/agendas.shtml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    /// Extra known-broken URLs. An empty replacement means none is known.
    pub url_overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub root_url: String,
    pub output_prefix: String,
    pub output_dir: PathBuf,
    pub check_links: bool,
    pub fetch_meeting_pages: bool,
    pub user_agent: String,
    pub timeout_secs: Option<u64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            output_prefix: "meetings".to_string(),
            output_dir: PathBuf::from("."),
            check_links: false,
            fetch_meeting_pages: false,
            user_agent: concat!("fec-agendas/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_archive() {
        let config = Config::default();
        assert_eq!(config.crawl.root_url, DEFAULT_ROOT_URL);
        assert!(!config.crawl.check_links);
        assert!(!config.crawl.fetch_meeting_pages);
        assert!(config.url_overrides.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let raw = r#"
            [crawl]
            check_links = true
            output_prefix = "agendas"

            [url_overrides]
            "http://www.fec.gov/agenda/old.pdf" = "http://www.fec.gov/agenda/new.pdf"
            "http://www.fec.gov/agenda/gone.pdf" = ""
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert!(config.crawl.check_links);
        assert_eq!(config.crawl.output_prefix, "agendas");
        assert_eq!(config.crawl.root_url, DEFAULT_ROOT_URL);
        assert_eq!(config.url_overrides.len(), 2);
    }
}
