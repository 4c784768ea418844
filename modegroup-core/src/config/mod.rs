//! Mode configuration
//!
//! - [`ConfigStore`]: loads the mode file and swaps the table on reload
//! - [`Mode`] / [`ModeTable`]: the parsed definitions
//! - [`smc`]: streaming reader for the host's section/key-value format
//!
//! # File format
//!
//! ```text
//! "ModeGroups"
//! {
//!     "combat"
//!     {
//!         "plugin_directory"  "combat"        // scanned recursively
//!         "use_sm_cvar"       "1"             // optional
//!         "cvars"    { "mp_friendlyfire" "0" }
//!         "commands" { "command" "mp_restartgame 1" }
//!         "load"     { "plugin" "extra/stats.smx" }
//!         "unload"   { "plugin" "fun/hats.smx" }
//!     }
//! }
//! ```

mod parser;
pub mod smc;
mod store;
mod types;

pub use parser::ModeTableBuilder;
pub use store::ConfigStore;
pub use types::{DEFAULT_ROOT_SECTION, Mode, ModeTable, SM_CVAR_PREFIX, SettingRoute};
