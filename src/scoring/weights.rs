//! Category and overall weights.
//!
//! Every weight defaults to `1.0`. Weights can be overridden from a JSON file;
//! fields left out of the file keep their default:
//! ```json
//! {
//!   "valuation": { "peg": 2.0 },
//!   "overall": { "performance": 0.5 }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationWeights {
    pub fwd_p_e: f64,
    pub peg: f64,
    pub p_s: f64,
    pub p_b: f64,
    pub p_fcf: f64,
}

impl Default for ValuationWeights {
    fn default() -> Self {
        Self {
            fwd_p_e: 1.0,
            peg: 1.0,
            p_s: 1.0,
            p_b: 1.0,
            p_fcf: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfitabilityWeights {
    pub profit_m: f64,
    pub oper_m: f64,
    pub gross_m: f64,
    pub roe: f64,
    pub roa: f64,
}

impl Default for ProfitabilityWeights {
    fn default() -> Self {
        Self {
            profit_m: 1.0,
            oper_m: 1.0,
            gross_m: 1.0,
            roe: 1.0,
            roa: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthWeights {
    pub eps_this_y: f64,
    pub eps_next_y: f64,
    pub eps_next_5y: f64,
    pub sales_q_q: f64,
    pub eps_q_q: f64,
}

impl Default for GrowthWeights {
    fn default() -> Self {
        Self {
            eps_this_y: 1.0,
            eps_next_y: 1.0,
            eps_next_5y: 1.0,
            sales_q_q: 1.0,
            eps_q_q: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceWeights {
    pub perf_month: f64,
    pub perf_quart: f64,
    pub perf_half: f64,
    pub perf_year: f64,
    pub perf_ytd: f64,
    pub volatility_m: f64,
}

impl Default for PerformanceWeights {
    fn default() -> Self {
        Self {
            perf_month: 1.0,
            perf_quart: 1.0,
            perf_half: 1.0,
            perf_year: 1.0,
            perf_ytd: 1.0,
            volatility_m: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallWeights {
    pub valuation: f64,
    pub profitability: f64,
    pub growth: f64,
    pub performance: f64,
}

impl Default for OverallWeights {
    fn default() -> Self {
        Self {
            valuation: 1.0,
            profitability: 1.0,
            growth: 1.0,
            performance: 1.0,
        }
    }
}

/// All weights used by the scoring engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub valuation: ValuationWeights,
    pub profitability: ProfitabilityWeights,
    pub growth: GrowthWeights,
    pub performance: PerformanceWeights,
    pub overall: OverallWeights,
}

impl ScoringWeights {
    /// Loads weights from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read weights file '{path}'"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("invalid weights JSON")
    }
}
