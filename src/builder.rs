use std::marker::PhantomData;
use std::path::PathBuf;

use tracing::debug;

use crate::error::InimapError;
use crate::file;
use crate::gateway::Gateway;
use crate::ops::{self, ConfigResult};
use crate::structure::IniObject;
use crate::types::{ConfigAction, SearchPath};

/// Entry point for building an INI-backed configuration.
pub struct IniConfig;

impl IniConfig {
    pub fn builder<C: IniObject>() -> IniConfigBuilder<C> {
        IniConfigBuilder::new()
    }
}

/// Builder for locating, loading, and managing one config file.
///
/// - **Discovery**: [`search_paths()`](Self::search_paths) lists where to look;
///   the highest-priority existing file is loaded.
/// - **Persistence**: [`persist_path()`](Self::persist_path) names where
///   `config set` writes.
pub struct IniConfigBuilder<C: IniObject> {
    app_name: Option<String>,
    file_name: Option<String>,
    search_paths: Option<Vec<SearchPath>>,
    persist_path: Option<SearchPath>,
    _phantom: PhantomData<C>,
}

impl<C: IniObject> IniConfigBuilder<C> {
    fn new() -> Self {
        Self {
            app_name: None,
            file_name: None,
            search_paths: None,
            persist_path: None,
            _phantom: PhantomData,
        }
    }

    /// Set the application name. This derives sensible defaults:
    /// - `file_name` → `"{app_name}.ini"`
    /// - `search_paths` → `[SearchPath::Platform]`
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the config file name (default: `"{app_name}.ini"`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Replace the default search paths entirely.
    ///
    /// Paths are listed in **priority-ascending** order: the last entry has the
    /// highest priority. See [`SearchPath`] for the available variants.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Append a search path without replacing the defaults.
    /// If no paths have been set yet, starts from the default `[Platform]`.
    pub fn add_search_path(mut self, path: SearchPath) -> Self {
        self.search_paths
            .get_or_insert_with(|| vec![SearchPath::Platform])
            .push(path);
        self
    }

    /// Set the persistence path for `config set`.
    ///
    /// Independent of the search paths used for reading. If not set,
    /// `config set` returns [`InimapError::NoPersistPath`].
    pub fn persist_path(mut self, path: SearchPath) -> Self {
        self.persist_path = Some(path);
        self
    }

    fn effective_app_name(&self) -> Result<&str, InimapError> {
        self.app_name
            .as_deref()
            .ok_or(InimapError::AppNameRequired)
    }

    fn effective_file_name(&self) -> Result<String, InimapError> {
        if let Some(name) = &self.file_name {
            return Ok(name.clone());
        }
        let app = self.effective_app_name()?;
        Ok(format!("{app}.ini"))
    }

    fn effective_search_paths(&self) -> Vec<SearchPath> {
        if let Some(paths) = &self.search_paths {
            return paths.clone();
        }
        vec![SearchPath::Platform]
    }

    /// The file `load` would read, if any exists.
    pub fn find_file(&self) -> Result<Option<PathBuf>, InimapError> {
        let app_name = self.effective_app_name()?;
        let file_name = self.effective_file_name()?;
        file::find_config_file(&self.effective_search_paths(), &file_name, app_name)
    }

    /// Load the highest-priority config file, or the default instance when
    /// none exists.
    pub fn load(&self) -> Result<C, InimapError> {
        let not_instantiable = || InimapError::NotInstantiable(C::structure().name());
        match self.find_file()? {
            Some(path) => Gateway::load_from_file(&path)?.ok_or_else(not_instantiable),
            None => {
                debug!(target_type = C::structure().name(), "no config file found, using defaults");
                C::instantiate().ok_or_else(not_instantiable)
            }
        }
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(self, action: &ConfigAction) -> Result<(), InimapError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    pub fn handle(self, action: &ConfigAction) -> Result<ConfigResult, InimapError> {
        match action {
            ConfigAction::List => {
                let config = self.load()?;
                ops::list_values(&config)
            }
            ConfigAction::Gen { output } => {
                let template = ops::generate_template::<C>()?;
                match output {
                    Some(path) => {
                        file::write_creating_dirs(path, &template)?;
                        Ok(ConfigResult::TemplateWritten { path: path.clone() })
                    }
                    None => Ok(ConfigResult::Template(template)),
                }
            }
            ConfigAction::Get { key } => {
                let config = self.load()?;
                ops::get_value(&config, key)
            }
            ConfigAction::Set { key, value } => {
                let app_name = self.effective_app_name()?;
                let file_name = self.effective_file_name()?;
                let persist = self
                    .persist_path
                    .as_ref()
                    .ok_or(InimapError::NoPersistPath)?;

                let path = file::resolve_persist_path(persist, &file_name, app_name)?;

                ops::set_value::<C>(&path, key, value)
            }
        }
    }
}
