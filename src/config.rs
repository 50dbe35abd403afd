use serde::{Deserialize, Serialize};

/// Weights of the evaluation terms. Negative square weights are penalties
/// for the side occupying an X or C square next to an empty corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub position: i32,
    pub mobility: i32,
    pub stable: i32,
    pub corner: i32,
    pub x_square: i32,
    pub c_square: i32,
    /// Mobility weight of the simpler level-2 evaluation.
    pub l2_mobility: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            position: 10,
            mobility: 80,
            stable: 100,
            corner: 500,
            x_square: -150,
            c_square: -50,
            l2_mobility: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chance (percent) that level 1 takes the move flipping the most discs
    /// instead of a random one.
    pub greedy_rate_percent: u8,

    // Level 3 search
    pub lv3_max_depth: u8,
    pub endgame_threshold: u8, // empty squares at or below which the game is solved exactly
    pub time_limit_ms: u64,

    /// Minimum time the background worker takes before committing a move.
    pub think_delay_ms: u64,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,

    pub weights: EvalWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            greedy_rate_percent: 70,
            lv3_max_depth: 7,
            endgame_threshold: 12,
            time_limit_ms: 8000,
            think_delay_ms: 1000,
            seed: None,
            weights: EvalWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Loads a config from JSON. Missing fields keep their defaults.
    pub fn load_from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = EngineConfig::load_from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.weights.corner, 500);
        assert_eq!(config.time_limit_ms, 8000);
    }

    #[test]
    fn test_load_config_partial() {
        let json = r#"{
            "time_limit_ms": 250,
            "seed": 42,
            "weights": { "mobility": 60 }
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();

        assert_eq!(config.time_limit_ms, 250);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.weights.mobility, 60);
        // Others should be default
        assert_eq!(config.weights.x_square, -150);
        assert_eq!(config.lv3_max_depth, 7);
    }

    #[test]
    fn test_load_config_invalid_json() {
        assert!(EngineConfig::load_from_json("{ invalid json }").is_err());
    }
}
