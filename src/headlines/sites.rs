// src/headlines/sites.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::SiteDescriptor;

pub const ENV_SITES_PATH: &str = "DASHBOARD_SITES_PATH";

const EMBEDDED_SITES: &str = include_str!("../../config/sites.toml");

#[derive(Debug, Deserialize)]
struct SitesFile {
    sites: Vec<SiteDescriptor>,
}

/// The six reference sources shipped with the binary.
pub fn reference_sites() -> Result<Vec<SiteDescriptor>> {
    parse_sites(EMBEDDED_SITES).context("parsing embedded config/sites.toml")
}

pub fn load_sites_from(path: &Path) -> Result<Vec<SiteDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sites from {}", path.display()))?;
    parse_sites(&content).with_context(|| format!("parsing sites from {}", path.display()))
}

/// $DASHBOARD_SITES_PATH if set (must exist), else the embedded table.
pub fn load_sites_default() -> Result<Vec<SiteDescriptor>> {
    if let Ok(p) = std::env::var(ENV_SITES_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_SITES_PATH} points to non-existent path"));
        }
        return load_sites_from(&pb);
    }
    reference_sites()
}

pub fn parse_sites(s: &str) -> Result<Vec<SiteDescriptor>> {
    let file: SitesFile = toml::from_str(s)?;
    file.sites
        .into_iter()
        .enumerate()
        .map(|(i, site)| clean_site(site).with_context(|| format!("site #{}", i + 1)))
        .collect()
}

fn clean_site(site: SiteDescriptor) -> Result<SiteDescriptor> {
    let name = site.name.trim().to_string();
    let url = site.url.trim().to_string();
    let title_selector = site.title_selector.trim().to_string();
    if name.is_empty() {
        bail!("missing name");
    }
    if url.is_empty() {
        bail!("{name}: missing url");
    }
    if title_selector.is_empty() {
        bail!("{name}: missing title_selector");
    }
    let source_language = match site.source_language.trim() {
        "" => "en".to_string(),
        lang => lang.to_ascii_lowercase(),
    };
    Ok(SiteDescriptor {
        name,
        url,
        title_selector,
        subtitle_selector: site
            .subtitle_selector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        source_language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_has_six_sites() {
        let sites = reference_sites().unwrap();
        assert_eq!(sites.len(), 6);
        assert_eq!(sites[0].name, "ABC News");
        assert_eq!(sites[0].subtitle_selector, None);
        assert_eq!(sites[3].title_selector, "h2[data-testid='card-headline']");
        let clarin = &sites[5];
        assert_eq!(clarin.source_language, "es");
        assert!(sites[..5].iter().all(|s| s.source_language == "en"));
    }

    #[test]
    fn blank_subtitle_and_language_are_normalized() {
        let toml = r#"
            [[sites]]
            name = " X "
            url = "https://x.test"
            title_selector = "h1"
            subtitle_selector = "  "
            translate_from = ""
        "#;
        let sites = parse_sites(toml).unwrap();
        assert_eq!(sites[0].name, "X");
        assert_eq!(sites[0].subtitle_selector, None);
        assert_eq!(sites[0].source_language, "en");
    }

    #[test]
    fn missing_title_selector_is_rejected() {
        let toml = r#"
            [[sites]]
            name = "X"
            url = "https://x.test"
            title_selector = ""
        "#;
        let err = parse_sites(toml).unwrap_err();
        assert!(format!("{err:#}").contains("title_selector"));
    }
}
