use clap::ValueEnum;
use tracing::debug;

use lease_engine_core::{RateConvention, ScheduleConfig};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConventionArg {
    Compound,
    Simple,
}

impl From<ConventionArg> for RateConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::Compound => RateConvention::Compound,
            ConventionArg::Simple => RateConvention::Simple,
        }
    }
}

/// Configuration assembled from `--config` and `--convention`.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    file: Option<ScheduleConfig>,
    convention: Option<RateConvention>,
}

impl Settings {
    pub fn load(
        path: Option<&str>,
        convention: Option<ConventionArg>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let file = match path {
            Some(p) => {
                let config: ScheduleConfig = input::file::read_input(p)?;
                debug!(path = p, ?config, "loaded schedule configuration");
                Some(config)
            }
            None => None,
        };
        Ok(Self {
            file,
            convention: convention.map(RateConvention::from),
        })
    }

    /// The configuration to use when the input carries none of its own.
    pub fn config(&self) -> ScheduleConfig {
        self.resolve(None)
    }

    pub fn convention(&self) -> RateConvention {
        self.config().rate_convention
    }

    /// Precedence: `--convention` over `--config` over the input's own
    /// configuration over the defaults.
    pub fn resolve(&self, embedded: Option<ScheduleConfig>) -> ScheduleConfig {
        let mut config = self.file.clone().or(embedded).unwrap_or_default();
        if let Some(convention) = self.convention {
            config.rate_convention = convention;
        }
        config
    }
}
