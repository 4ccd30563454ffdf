//! Discovery and action types shared by the builder and the CLI adapter.
//!
//! Search paths are listed in **priority-ascending** order: when several
//! directories hold the config file, the one listed last wins. Only that one
//! file is loaded; files are never merged.
//!
//! ```ignore
//! IniConfig::builder::<AppConfig>()
//!     .app_name("myapp")
//!     .search_paths(vec![
//!         SearchPath::Path("/etc/myapp".into()),
//!         SearchPath::Platform,
//!         SearchPath::Cwd,
//!     ])
//!     .persist_path(SearchPath::Platform)
//!     .load()?;
//! ```

use std::path::PathBuf;

/// Where to search for config files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Every value of the loaded config.
    List,
    /// The documented default config, to stdout or a file.
    Gen { output: Option<PathBuf> },
    Get { key: String },
    Set { key: String, value: String },
}
