use clap::ValueEnum;
use nut_build::Mode;

/// Build mode
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum BuildMode {
    /// Unminified output with development-only checks enabled
    #[value(name = "development")]
    Development,

    /// Optimized output for deployment
    #[value(name = "production")]
    Production,
}

impl From<BuildMode> for Mode {
    fn from(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Development => Mode::Development,
            BuildMode::Production => Mode::Production,
        }
    }
}
