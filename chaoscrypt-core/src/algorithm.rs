//! Algorithm identifiers and their static properties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CipherError;

/// The chaotic-map families the engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmId {
    /// Logistic map, sort-based confusion, two-pass chain diffusion.
    #[serde(rename = "logistic")]
    Logistic,
    /// Fractional-order Hopfield neural map.
    #[serde(rename = "fodhnn")]
    Fodhnn,
    /// 2-D logistic-adjusted sine map.
    #[serde(rename = "2dlasm")]
    TwoDLasm,
    /// Bulban map on a grayscale projection.
    #[serde(rename = "bulban")]
    Bulban,
    /// Arnold cat map + 2-D sine-cosine-logistic mask + Chen-system chain.
    #[serde(rename = "acm_2dscl")]
    Acm2dScl,
}

/// Whether an algorithm needs a nonce to reproduce its trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceRequirement {
    /// Never used.
    None,
    /// Mixed into the key schedule when supplied, never generated.
    Optional,
    /// Generated on encryption when absent, mandatory on decryption.
    Required,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 5] = [
        AlgorithmId::Logistic,
        AlgorithmId::Fodhnn,
        AlgorithmId::TwoDLasm,
        AlgorithmId::Bulban,
        AlgorithmId::Acm2dScl,
    ];

    /// Wire identifier used by requests and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::Logistic => "logistic",
            AlgorithmId::Fodhnn => "fodhnn",
            AlgorithmId::TwoDLasm => "2dlasm",
            AlgorithmId::Bulban => "bulban",
            AlgorithmId::Acm2dScl => "acm_2dscl",
        }
    }

    pub fn nonce_requirement(&self) -> NonceRequirement {
        match self {
            AlgorithmId::Logistic => NonceRequirement::Optional,
            AlgorithmId::Fodhnn | AlgorithmId::TwoDLasm | AlgorithmId::Acm2dScl => {
                NonceRequirement::Required
            }
            AlgorithmId::Bulban => NonceRequirement::None,
        }
    }

    /// Grayscale-only algorithms collapse color input to one channel.
    /// The collapse is not reversible.
    pub fn grayscale_only(&self) -> bool {
        matches!(self, AlgorithmId::Bulban)
    }

    pub fn description(&self) -> &'static str {
        match self {
            AlgorithmId::Logistic => "Logistic map, fastest tier",
            AlgorithmId::Fodhnn => "Fractional-order Hopfield neural map, slow and strong",
            AlgorithmId::TwoDLasm => "2-D logistic-adjusted sine map, high key sensitivity",
            AlgorithmId::Bulban => "Bulban map, grayscale output only",
            AlgorithmId::Acm2dScl => "Arnold cat + 2-D SCL + Chen system, strongest tier",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmId {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AlgorithmId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| CipherError::UnsupportedAlgorithm(s.trim().to_string()))
    }
}

impl fmt::Display for NonceRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NonceRequirement::None => "none",
            NonceRequirement::Optional => "optional",
            NonceRequirement::Required => "required",
        })
    }
}
