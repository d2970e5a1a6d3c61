//! Build-variant orchestration core for nut.
//!
//! Everything between "the project settings are loaded" and "the external
//! engine compiles code" lives here:
//!
//! - [`matrix`] - which variants of the feature matrix get built
//! - [`context`] - merging command, variant and project layers into one
//!   read-only [`BuildContext`] per variant
//! - [`proxy`] - turning dev server proxy settings into [`ProxyRule`]s
//! - [`entries`] - discovering the entry points handed to the engine
//! - [`engine`] - the boundary to the external build engine
//! - [`supervisor`] - the dev server restart loop
//!
//! The engine itself is opaque: nut shapes and sequences build requests,
//! it does not bundle.

pub mod context;
pub mod engine;
pub mod entries;
pub mod error;
pub mod matrix;
pub mod proxy;
pub mod supervisor;

pub use context::{
    check_command_flags, BuildContext, BuildContextFactory, BuildOverrides, CommandInput, Mode,
};
pub use engine::{load_engine, BuildEngine, CommandEngine, RunningBuild};
pub use entries::{collect_entries, EntryDescriptor, EntryLocation};
pub use error::{BuildError, EngineError, Result};
pub use matrix::{render_feature_matrix, resolve_feature_names, select_variants};
pub use proxy::{construct_proxy_rules, ConnectionAgent, ProxyOptions, ProxyRule};
pub use supervisor::{
    BoxError, DevServerSupervisor, Phase, RestartMachine, RunningServer, ServerLauncher,
};
