// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::scheduler::WeightPolicy;

/// Name of the optional config file in a deck directory.
pub const CONFIG_FILE: &str = "streakcards.toml";

const DEFAULT_PORT: u16 = 8000;

/// Settings read from `streakcards.toml`. Every field is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fixed seed for card selection. Random if absent.
    pub seed: Option<u64>,
    /// Port of the drill server.
    pub port: u16,
    /// Whether to open a browser when the drill server starts.
    pub open_browser: bool,
    pub weights: WeightPolicy,
    /// Command used to explain cards. Explanations are disabled if absent.
    pub generator: Option<GeneratorConfig>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            port: DEFAULT_PORT,
            open_browser: true,
            weights: WeightPolicy::default(),
            generator: None,
        }
    }
}

impl Config {
    /// Load the config file from `directory`, or the defaults if there is
    /// none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No config file, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        config.weights.validate()?;
        log::debug!("Loaded config from {path:?}.");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file() -> Fallible<()> {
        let dir = tempdir()?;
        assert_eq!(Config::load(dir.path())?, Config::default());
        Ok(())
    }

    #[test]
    fn test_full_file() -> Fallible<()> {
        let dir = tempdir()?;
        let content = r#"
seed = 42
port = 9000
open_browser = false

[weights]
floor = 0.2
recency_max = 5.0

[generator]
command = "llm"
args = ["-m", "small"]
"#;
        write(dir.path().join(CONFIG_FILE), content)?;
        let config = Config::load(dir.path())?;
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.port, 9000);
        assert!(!config.open_browser);
        assert_eq!(config.weights.floor, 0.2);
        assert_eq!(config.weights.recency_max, 5.0);
        assert_eq!(config.weights.unseen_recency, 2.5);
        let generator = config.generator.unwrap();
        assert_eq!(generator.command, "llm");
        assert_eq!(generator.args, vec!["-m", "small"]);
        Ok(())
    }

    #[test]
    fn test_inverted_recency_bounds() -> Fallible<()> {
        let dir = tempdir()?;
        let content = "[weights]\nrecency_min = 5.0\nrecency_max = 1.0\n";
        write(dir.path().join(CONFIG_FILE), content)?;
        let err = Config::load(dir.path()).err().unwrap();
        assert!(err.to_string().contains("recency_min"), "{err}");
        Ok(())
    }

    #[test]
    fn test_zero_weights() -> Fallible<()> {
        let dir = tempdir()?;
        for content in [
            "[weights]\nfloor = 0.0\n",
            "[weights]\nnovelty_boost = 0.0\n",
            "[weights]\nrecency_max = nan\n",
        ] {
            write(dir.path().join(CONFIG_FILE), content)?;
            assert!(Config::load(dir.path()).is_err(), "{content}");
        }
        Ok(())
    }

    #[test]
    fn test_unknown_field() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join(CONFIG_FILE), "colour = \"blue\"")?;
        assert!(Config::load(dir.path()).is_err());
        Ok(())
    }
}
