//! Trainer configuration read from a flat string-keyed mapping.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Generational trainer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerConfig {
    /// Genomes per generation; constant for the whole run.
    pub initial_population: usize,
    /// Probability (0.0-1.0) that a weight matrix of a selected genome mutates.
    pub mutation_chance: f64,
    /// Gene pool copies per unit of score.
    pub fitness_multiplier: f64,
    /// Elites cloned verbatim into the next generation.
    pub best_agent_selection: usize,
    /// Worst genomes that still feed the gene pool.
    pub worst_agent_selection: usize,
    /// Crossover slots, filled two children at a time.
    pub number_to_crossover: usize,
    /// Probability (0.0-1.0) that a weight position inherits from the first parent.
    pub crossover_chance: f64,
    /// Archive admission threshold for novelty search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub novelty_threshold: Option<f64>,
    /// Random seed for reproducibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            initial_population: 20,
            mutation_chance: 0.3,
            fitness_multiplier: 10.0,
            best_agent_selection: 8,
            worst_agent_selection: 3,
            number_to_crossover: 6,
            crossover_chance: 0.5,
            novelty_threshold: None,
            random_seed: None,
        }
    }
}

impl TrainerConfig {
    /// Read every required key from a flat mapping.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Ok(Self {
            initial_population: required(map, "initialPopulation")?,
            mutation_chance: required(map, "mutationChance")?,
            fitness_multiplier: required(map, "fitnessMultiplier")?,
            best_agent_selection: required(map, "bestAgentSelection")?,
            worst_agent_selection: required(map, "worstAgentSelection")?,
            number_to_crossover: required(map, "numberToCrossover")?,
            crossover_chance: required(map, "crossoverChance")?,
            novelty_threshold: optional(map, "noveltyThreshold")?,
            random_seed: optional(map, "randomSeed")?,
        })
    }

    /// Parse a flat JSON object (string or number values) and read it with
    /// [`from_map`](Self::from_map).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::from_map(&flat_map_from_json(json)?)
    }

    /// Flat string mapping accepted by [`from_map`](Self::from_map).
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::from([
            (
                "initialPopulation".to_string(),
                self.initial_population.to_string(),
            ),
            ("mutationChance".to_string(), self.mutation_chance.to_string()),
            (
                "fitnessMultiplier".to_string(),
                self.fitness_multiplier.to_string(),
            ),
            (
                "bestAgentSelection".to_string(),
                self.best_agent_selection.to_string(),
            ),
            (
                "worstAgentSelection".to_string(),
                self.worst_agent_selection.to_string(),
            ),
            (
                "numberToCrossover".to_string(),
                self.number_to_crossover.to_string(),
            ),
            ("crossoverChance".to_string(), self.crossover_chance.to_string()),
        ]);
        if let Some(threshold) = self.novelty_threshold {
            map.insert("noveltyThreshold".to_string(), threshold.to_string());
        }
        if let Some(seed) = self.random_seed {
            map.insert("randomSeed".to_string(), seed.to_string());
        }
        map
    }

    /// Threshold required by the novelty-search variant.
    pub fn novelty_threshold(&self) -> Result<f64, ConfigError> {
        self.novelty_threshold
            .ok_or_else(|| ConfigError::MissingKey("noveltyThreshold".to_string()))
    }

    /// Children produced per generation; crossover always fills slots in pairs.
    #[inline]
    pub fn crossover_children(&self) -> usize {
        self.number_to_crossover.div_ceil(2) * 2
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_population < 2 {
            return Err(ConfigError::PopulationTooSmall(self.initial_population));
        }

        for (key, value) in [
            ("mutationChance", self.mutation_chance),
            ("crossoverChance", self.crossover_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability {
                    key: key.to_string(),
                    value,
                });
            }
        }

        if !self.fitness_multiplier.is_finite() || self.fitness_multiplier < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "fitnessMultiplier".to_string(),
                value: self.fitness_multiplier.to_string(),
            });
        }

        let selected = self.best_agent_selection + self.crossover_children();
        if selected > self.initial_population {
            return Err(ConfigError::InvalidSelection(format!(
                "bestAgentSelection ({}) plus crossover children ({}) exceeds population ({})",
                self.best_agent_selection,
                self.crossover_children(),
                self.initial_population
            )));
        }

        if self.worst_agent_selection > self.initial_population {
            return Err(ConfigError::InvalidSelection(format!(
                "worstAgentSelection ({}) exceeds population ({})",
                self.worst_agent_selection, self.initial_population
            )));
        }

        if let Some(threshold) = self.novelty_threshold
            && !threshold.is_finite()
        {
            return Err(ConfigError::InvalidValue {
                key: "noveltyThreshold".to_string(),
                value: threshold.to_string(),
            });
        }

        Ok(())
    }
}

/// Flatten a JSON object of scalars into the string mapping the readers expect.
pub fn flat_map_from_json(json: &str) -> Result<HashMap<String, String>, ConfigError> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;

    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        value: other.to_string(),
                    });
                }
            };
            Ok((key, text))
        })
        .collect()
}

/// Parse a required key.
pub(crate) fn required<T: FromStr>(
    map: &HashMap<String, String>,
    key: &str,
) -> Result<T, ConfigError> {
    optional(map, key)?.ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

/// Parse a key that may be absent.
pub(crate) fn optional<T: FromStr>(
    map: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    map.get(key)
        .map(|raw| {
            raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
            })
        })
        .transpose()
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration key '{0}'")]
    MissingKey(String),
    #[error("Configuration key '{key}' has invalid value '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("Population size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("Probability '{key}' must be within 0.0-1.0, got {value}")]
    InvalidProbability { key: String, value: f64 },
    #[error("Invalid selection sizes: {0}")]
    InvalidSelection(String),
    #[error("Configuration is not a flat JSON object: {0}")]
    Json(#[from] serde_json::Error),
}
