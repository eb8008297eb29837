//! Functions for loading settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::math::prelude::Color;
use crate::window::SurfaceParams;

/// A structure containing configuration data of a run, which is used to find or
/// create the drawable surface and to decide how the pipeline treats failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub surface: SurfaceParams,
    pub pipeline: PipelineParams,
    /// One of `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Stops at the first failing stage. When disabled, failures are logged and the
    /// remaining stages run anyway, ending with the draw call.
    pub strict: bool,
    pub clear_color: Color<f32>,
}

impl Default for PipelineParams {
    fn default() -> Self {
        PipelineParams {
            strict: true,
            clear_color: Color::transparent(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            surface: SurfaceParams::default(),
            pipeline: PipelineParams::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|err| Error::Io(format!("{}: {}", path.display(), err)))?;

        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.log_level()?;
        Ok(settings)
    }

    /// Parses `log_level` into a filter.
    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| Error::Settings(format!("unknown log level `{}`.", self.log_level)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.surface.id, "stage");
        assert!(settings.pipeline.strict);
        assert_eq!(settings.pipeline.clear_color, Color::transparent());
        assert_eq!(settings.log_level().unwrap(), log::LevelFilter::Info);
    }

    #[test]
    fn partial() {
        let settings = Settings::from_json(
            r#"{
                "surface": { "id": "canvas", "size": [320, 240] },
                "pipeline": { "strict": false },
                "log_level": "debug"
            }"#,
        )
        .unwrap();

        assert_eq!(settings.surface.id, "canvas");
        assert_eq!(settings.surface.size.x, 320);
        assert_eq!(settings.surface.size.y, 240);
        assert_eq!(settings.surface.title, SurfaceParams::default().title);
        assert!(!settings.pipeline.strict);
        assert_eq!(settings.log_level().unwrap(), log::LevelFilter::Debug);
    }

    #[test]
    fn invalid() {
        match Settings::from_json(r#"{ "log_level": "loud" }"#) {
            Err(Error::Settings(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }

        match Settings::from_json("{ surface ") {
            Err(Error::Settings(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }

        match Settings::load("/nonexistent/settings.json") {
            Err(Error::Io(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
