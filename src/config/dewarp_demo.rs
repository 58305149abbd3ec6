use crate::detector::DewarpParams;
use crate::geometry::{ContentRect, Dpi};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
pub struct PageConfig {
    pub input: PathBuf,
    /// Resolution of the scan; defaults to 300 DPI.
    #[serde(default)]
    pub dpi: Dpi,
    /// Area holding the page content; the whole image when absent.
    #[serde(default)]
    pub content_rect: Option<ContentRect>,
    /// Stem for the per-page outputs; the input file stem when absent.
    #[serde(default)]
    pub name: Option<String>,
}

impl PageConfig {
    pub fn output_stem(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "page".to_string())
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DemoOutputConfig {
    pub dir: PathBuf,
    /// Also write a PNG with bounds and curves drawn over the page.
    #[serde(default = "default_true")]
    pub overlay: bool,
}

impl DemoOutputConfig {
    pub fn json_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.json"))
    }

    pub fn overlay_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}_overlay.png"))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DewarpDemoConfig {
    pub pages: Vec<PageConfig>,
    pub output: DemoOutputConfig,
    #[serde(default)]
    pub params: DewarpParams,
}

fn default_true() -> bool {
    true
}

pub fn load_config(path: &Path) -> Result<DewarpDemoConfig, String> {
    let config: DewarpDemoConfig = super::load_config(path)?;
    if config.pages.is_empty() {
        return Err(format!("Config {} lists no pages", path.display()));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::tracer::TraceStrategy;

    #[test]
    fn parses_minimal_config() {
        let json = r#"{
            "pages": [
                { "input": "scans/p1.png" },
                { "input": "scans/p2.tif", "dpi": { "horizontal": 600, "vertical": 600 },
                  "content_rect": { "x": 10, "y": 20, "width": 500, "height": 700 },
                  "name": "second" }
            ],
            "output": { "dir": "out" },
            "params": { "tracer": { "strategy": "both" } }
        }"#;
        let cfg: DewarpDemoConfig = parse_config(json).unwrap();
        assert_eq!(cfg.pages.len(), 2);
        assert_eq!(cfg.pages[0].dpi, Dpi::default());
        assert_eq!(cfg.pages[0].output_stem(), "p1");
        assert_eq!(cfg.pages[1].output_stem(), "second");
        assert_eq!(cfg.pages[1].content_rect.map(|r| r.width), Some(500.0));
        assert!(cfg.output.overlay);
        assert_eq!(cfg.output.json_path("p1"), PathBuf::from("out/p1.json"));
        assert_eq!(cfg.params.tracer.strategy, TraceStrategy::Both);
        assert_eq!(cfg.params.working_dpi, 200.0);
    }

    #[test]
    fn missing_pages_is_an_error() {
        assert!(parse_config::<DewarpDemoConfig>(r#"{ "output": { "dir": "o" } }"#).is_err());
    }
}
