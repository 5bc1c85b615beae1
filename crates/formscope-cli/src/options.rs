//! Configuration resolution: defaults < environment < command-line flags.

use std::path::PathBuf;

use formscope::ExtractorConfig;

/// Engine settings given on the command line. `None` leaves the
/// environment or default value in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub static_timeout_secs: Option<u64>,
    pub render_timeout_secs: Option<u64>,
    pub settle_delay_ms: Option<u64>,
    pub chromium_path: Option<PathBuf>,
    pub no_render: bool,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: ExtractorConfig) -> ExtractorConfig {
        if let Some(v) = self.static_timeout_secs {
            config.static_timeout_secs = v;
        }
        if let Some(v) = self.render_timeout_secs {
            config.render_timeout_secs = v;
        }
        if let Some(v) = self.settle_delay_ms {
            config.settle_delay_ms = v;
        }
        if let Some(p) = self.chromium_path {
            config.chromium_path = Some(p);
        }
        if self.no_render {
            config.render_enabled = false;
        }
        config
    }

    /// Environment-derived config with these flags on top.
    pub fn resolve(self) -> ExtractorConfig {
        self.apply(ExtractorConfig::from_env())
    }
}
