use std::fmt;

use fieldsweep_core::ConfigError;
use fieldsweep_system_expanding_square::{ExpandingSquare, ExpandingSquareConfig};
use fieldsweep_system_lawnmower::{Lawnmower, LawnmowerConfig};
use fieldsweep_system_random_walk::{RandomWalk, RandomWalkConfig};
use fieldsweep_system_spiral::{Spiral, SpiralConfig};
use fieldsweep_system_star_pattern::{StarPattern, StarPatternConfig};
use serde::Deserialize;

use crate::{boxed, Drive, SimulationError};

/// Tuning parameters for every built-in strategy, keyed like the registry.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategySettings {
    /// Parameters of the `spiral` strategy.
    pub spiral: SpiralConfig,
    /// Parameters of the `lawnmower` strategy.
    pub lawnmower: LawnmowerConfig,
    /// Parameters of the `expanding-square` strategy.
    #[serde(rename = "expanding-square")]
    pub expanding_square: ExpandingSquareConfig,
    /// Parameters of the `random-walk` strategy.
    #[serde(rename = "random-walk")]
    pub random_walk: RandomWalkConfig,
    /// Parameters of the `star` strategy.
    pub star: StarPatternConfig,
}

/// Builds a fresh strategy slot from the tuning parameters, rejecting
/// parameters the strategy cannot run with.
pub type StrategyFactory = fn(&StrategySettings) -> Result<Box<dyn Drive>, ConfigError>;

/// Selectable strategy known to a [`Registry`].
#[derive(Clone, Copy)]
pub struct RegistryEntry {
    key: &'static str,
    display_name: &'static str,
    factory: StrategyFactory,
}

impl RegistryEntry {
    /// Short key used to select the strategy.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Human-readable name shown in menus.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Instantiates the strategy with the provided settings.
    pub fn create(&self, settings: &StrategySettings) -> Result<Box<dyn Drive>, ConfigError> {
        (self.factory)(settings)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Ordered table mapping short keys to strategy factories.
#[derive(Clone, Debug)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Creates a registry without any strategies.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a registry holding every built-in strategy.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("spiral", "Spiral Search", |settings| {
            settings.spiral.validate()?;
            Ok(boxed(Spiral::new(settings.spiral.clone())))
        });
        registry.register("lawnmower", "Lawnmower Search", |settings| {
            settings.lawnmower.validate()?;
            Ok(boxed(Lawnmower::new(settings.lawnmower.clone())))
        });
        registry.register("expanding-square", "Expanding Square", |settings| {
            settings.expanding_square.validate()?;
            Ok(boxed(ExpandingSquare::new(
                settings.expanding_square.clone(),
            )))
        });
        registry.register("random-walk", "Random Walk", |settings| {
            settings.random_walk.validate()?;
            Ok(boxed(RandomWalk::new(settings.random_walk.clone())))
        });
        registry.register("star", "Star Pattern", |settings| {
            settings.star.validate()?;
            Ok(boxed(StarPattern::new(settings.star.clone())))
        });
        registry
    }

    /// Adds a strategy, replacing any previous entry with the same key.
    pub fn register(
        &mut self,
        key: &'static str,
        display_name: &'static str,
        factory: StrategyFactory,
    ) {
        let entry = RegistryEntry {
            key,
            display_name,
            factory,
        };
        match self.entries.iter_mut().find(|existing| existing.key == key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Every registered strategy in registration order.
    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Keys of every registered strategy in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(RegistryEntry::key).collect()
    }

    /// Looks up the entry registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Instantiates the strategy registered under `key`.
    pub fn create(
        &self,
        key: &str,
        settings: &StrategySettings,
    ) -> Result<Box<dyn Drive>, SimulationError> {
        let entry = self
            .get(key)
            .ok_or_else(|| SimulationError::UnknownStrategy {
                key: key.to_owned(),
                known: self.keys(),
            })?;
        let driver = entry
            .create(settings)
            .map_err(|source| SimulationError::InvalidStrategyConfig {
                strategy: entry.key,
                source,
            })?;
        log::debug!("selected strategy `{}` ({})", entry.key, entry.display_name);
        Ok(driver)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_lists_every_strategy_in_menu_order() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.keys(),
            vec!["spiral", "lawnmower", "expanding-square", "random-walk", "star"]
        );
        let names: Vec<_> = registry
            .entries()
            .iter()
            .map(RegistryEntry::display_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "Spiral Search",
                "Lawnmower Search",
                "Expanding Square",
                "Random Walk",
                "Star Pattern"
            ]
        );
    }

    #[test]
    fn created_strategies_report_their_names() {
        let registry = Registry::builtin();
        let settings = StrategySettings::default();
        for entry in registry.entries() {
            let driver = registry
                .create(entry.key(), &settings)
                .expect("registered key");
            assert_eq!(driver.name(), entry.display_name());
            assert!(!driver.is_started());
        }
    }

    #[test]
    fn unknown_key_lists_the_valid_keys() {
        let registry = Registry::builtin();
        let error = registry
            .create("zigzag", &StrategySettings::default())
            .expect_err("unknown key");
        match &error {
            SimulationError::UnknownStrategy { key, known } => {
                assert_eq!(key, "zigzag");
                assert_eq!(known.len(), 5);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(error.to_string().contains("random-walk"));
    }

    #[test]
    fn registering_an_existing_key_replaces_it() {
        let mut registry = Registry::builtin();
        registry.register("spiral", "Tight Spiral", |_| {
            Ok(boxed(Spiral::new(SpiralConfig {
                radius_step_m: 3.5,
                ..SpiralConfig::default()
            })))
        });
        assert_eq!(registry.entries().len(), 5);
        assert_eq!(
            registry.get("spiral").map(RegistryEntry::display_name),
            Some("Tight Spiral")
        );
    }

    #[test]
    fn invalid_settings_are_rejected_before_the_run() {
        let registry = Registry::builtin();
        let mut settings = StrategySettings::default();
        settings.random_walk.max_turn_deg = f64::INFINITY;
        settings.spiral.angle_step_deg = 0.0;

        for key in ["random-walk", "spiral"] {
            match registry.create(key, &settings) {
                Err(SimulationError::InvalidStrategyConfig { strategy, .. }) => {
                    assert_eq!(strategy, key);
                }
                other => panic!("unexpected result for {key}: {other:?}"),
            }
        }
        assert!(registry.create("lawnmower", &settings).is_ok());
    }
}
