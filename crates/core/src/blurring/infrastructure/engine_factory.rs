use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blurring::domain::blur_engine::BlurEngine;
use crate::blurring::domain::boundary_policy::BoundaryPolicy;
use crate::blurring::domain::contribution_strategy::ContributionStrategy;
use crate::shared::constants::DEFAULT_WEIGHT_SCALE;
use crate::shared::error::BlurError;
use crate::shared::raster::Sample;

use super::channel_ops::ChannelOps;
use super::halved_scatter_contribution::HalvedScatterContribution;
use super::row_parallelizer::RowParallelizer;
use super::scatter_contribution::ScatterContribution;

/// How each mask sample contributes to the accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionVariant {
    #[default]
    Direct,
    Halved,
}

impl ContributionVariant {
    pub const ALL: &[ContributionVariant] =
        &[ContributionVariant::Direct, ContributionVariant::Halved];
}

impl std::fmt::Display for ContributionVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContributionVariant::Direct => write!(f, "direct"),
            ContributionVariant::Halved => write!(f, "halved"),
        }
    }
}

impl std::str::FromStr for ContributionVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(ContributionVariant::Direct),
            "halved" => Ok(ContributionVariant::Halved),
            other => Err(format!("Variant must be 'direct' or 'halved', got '{other}'")),
        }
    }
}

/// Everything needed to assemble a [`BlurEngine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineOptions {
    pub boundary: BoundaryPolicy,
    pub variant: ContributionVariant,
    /// Multiplier on mask luminance; only used by the direct variant.
    pub weight_scale: f64,
    /// Row workers; `None` uses the available hardware parallelism.
    pub workers: Option<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::default(),
            variant: ContributionVariant::default(),
            weight_scale: DEFAULT_WEIGHT_SCALE,
            workers: None,
        }
    }
}

/// Builds a blur engine for channel type `S` with its own row worker pool.
pub fn create_engine<S: Sample>(options: &EngineOptions) -> Result<BlurEngine<S>, BlurError> {
    let parallelizer = Arc::new(RowParallelizer::new(options.workers)?);
    log::info!(
        "Using {} contribution with {} boundary on {} row workers",
        options.variant,
        options.boundary,
        parallelizer.workers()
    );
    let ops = ChannelOps::new(parallelizer, options.boundary);
    let strategy: Box<dyn ContributionStrategy<S>> = match options.variant {
        ContributionVariant::Direct => Box::new(ScatterContribution::new(ops, options.weight_scale)),
        ContributionVariant::Halved => Box::new(HalvedScatterContribution::new(ops)),
    };
    Ok(BlurEngine::new(strategy))
}
