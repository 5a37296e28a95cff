use std::{fs, path::Path};

use anyhow::{Context, Result};
use fieldsweep_core::SimConfig;
use fieldsweep_system_stepper::StrategySettings;
use serde::Deserialize;

/// Contents of a simulation TOML file. Every table is optional.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SettingsFile {
    /// Parameters of the simulated world and robot.
    pub(crate) simulation: SimConfig,
    /// Tuning parameters of each strategy, keyed like the registry.
    pub(crate) strategies: StrategySettings,
}

impl SettingsFile {
    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid simulation config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse simulation config toml contents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = SettingsFile::parse("").expect("empty toml is valid");
        assert_eq!(settings, SettingsFile::default());
    }

    #[test]
    fn tables_override_individual_fields() {
        let settings = SettingsFile::parse(
            r#"
            [simulation]
            search_radius_m = 12.0
            time_step_s = 0.05

            [strategies.spiral]
            radius_step_m = 3.5
            center = [1.0, -1.0]

            [strategies.random-walk]
            seed = 7
            duration_s = 60.0
            "#,
        )
        .expect("valid settings");

        assert_eq!(settings.simulation.search_radius_m, 12.0);
        assert_eq!(settings.simulation.time_step_s, 0.05);
        assert_eq!(settings.simulation.grid_cell_size_m, 0.5);
        assert_eq!(settings.strategies.spiral.radius_step_m, 3.5);
        assert_eq!(settings.strategies.spiral.angle_step_deg, 5.0);
        assert!(settings.strategies.spiral.center.is_some());
        assert_eq!(settings.strategies.random_walk.seed, 7);
        assert_eq!(settings.strategies.random_walk.duration_s, Some(60.0));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = SettingsFile::parse("[simulation]\nsearch_radius = 5.0\n")
            .expect_err("misspelled field");
        assert!(format!("{error:#}").contains("search_radius"));
    }
}
