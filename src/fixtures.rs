#[cfg(test)]
pub mod test {
    use std::sync::OnceLock;

    use crate::document::ConfigValue;
    use crate::error::InimapError;
    use crate::structure::{Array, FieldDescriptor, IniObject, StructuralType};

    macro_rules! structure_of {
        ($ty:ty, $build:expr) => {
            fn structure() -> &'static StructuralType<$ty> {
                static STRUCTURE: OnceLock<StructuralType<$ty>> = OnceLock::new();
                STRUCTURE.get_or_init($build)
            }
        };
    }

    // -- Flat config with one field of every kind -----------------------------

    #[derive(Debug, Clone, PartialEq)]
    pub struct ValuesConfig {
        pub app_name: String,
        pub index: i64,
        pub accuracy: f64,
        pub enabled: bool,
        pub disabled: bool,
        pub nulled: Option<i64>,
        pub trusted_ips: Vec<String>,
        pub untyped: ConfigValue,
        pub filtered: String,
        pub point: Array,
        pub must_be_empty: String,
        pub secret: String,
    }

    impl Default for ValuesConfig {
        fn default() -> Self {
            Self {
                app_name: String::new(),
                index: 0,
                accuracy: 0.0,
                enabled: false,
                disabled: true,
                nulled: Some(1),
                trusted_ips: Vec::new(),
                untyped: ConfigValue::Null,
                filtered: String::new(),
                point: Array::default(),
                must_be_empty: "not empty yet".into(),
                secret: "hidden".into(),
            }
        }
    }

    impl ValuesConfig {
        /// The instance described by [`VALUES_INI`].
        pub fn loaded() -> Self {
            Self {
                app_name: "my-\"application\"".into(),
                index: 2,
                accuracy: 0.5,
                enabled: true,
                disabled: false,
                nulled: None,
                trusted_ips: vec!["127.0.0.1".into(), "192.168.0.1".into()],
                untyped: ConfigValue::from("doesnt matter"),
                filtered: "test".into(),
                point: Array::keyed([("a", "1.1"), ("b", "2.2"), ("c", "3.3")]),
                must_be_empty: String::new(),
                secret: "hidden".into(),
            }
        }
    }

    /// Stored as text, written as space-separated hex bytes.
    fn set_filtered(config: &mut ValuesConfig, raw: &ConfigValue) -> Result<(), InimapError> {
        let invalid = |reason: String| InimapError::InvalidValue {
            key: "filtered".into(),
            reason,
        };
        let bytes = raw
            .to_string()
            .split_whitespace()
            .map(|pair| u8::from_str_radix(pair, 16))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| invalid(e.to_string()))?;
        config.filtered = String::from_utf8(bytes).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    fn get_filtered(config: &ValuesConfig) -> String {
        config
            .filtered
            .bytes()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    impl IniObject for ValuesConfig {
        structure_of!(ValuesConfig, || {
            type Field = FieldDescriptor<ValuesConfig>;
            StructuralType::new("ValuesConfig")
                .doc("/**\n * Values\n */")
                .field(Field::value("appName", |c| &c.app_name, |c| &mut c.app_name).doc("String value"))
                .field(Field::value("index", |c| &c.index, |c| &mut c.index).doc("Integer value"))
                .field(Field::value("accuracy", |c| &c.accuracy, |c| &mut c.accuracy).doc("Float value"))
                .field(Field::value("enabled", |c| &c.enabled, |c| &mut c.enabled).doc("Boolean true"))
                .field(Field::value("disabled", |c| &c.disabled, |c| &mut c.disabled).doc("Boolean false"))
                .field(Field::value("nulled", |c| &c.nulled, |c| &mut c.nulled).doc("/** @var Nullable value */"))
                .field(
                    Field::value("trustedIps", |c| &c.trusted_ips, |c| &mut c.trusted_ips)
                        .doc("List of values"),
                )
                .field(Field::value("untyped", |c| &c.untyped, |c| &mut c.untyped).doc("Untyped value"))
                .field(
                    Field::custom("filtered")
                        .setter(set_filtered)
                        .getter(get_filtered)
                        .doc("Custom accessors"),
                )
                .field(Field::value("point", |c| &c.point, |c| &mut c.point).doc("Indexed array"))
                .field(
                    Field::value("mustBeEmpty", |c| &c.must_be_empty, |c| &mut c.must_be_empty)
                        .doc("Empty if in text"),
                )
                .field(Field::value("secret", |c| &c.secret, |c| &mut c.secret).private())
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    pub const VALUES_INI: &str = r#";
; Values

; String value
app_name = "my-"application""

; Integer value
index = 2

; Float value
accuracy = 0.5

; Boolean true
enabled = true

; Boolean false
disabled = false

; Nullable value
nulled = null

; List of values
trusted_ips = 127.0.0.1, 192.168.0.1

; Untyped value
untyped = doesnt matter

; Custom accessors
filtered = 74 65 73 74

; Indexed array
point[a] = 1.1
point[b] = 2.2
point[c] = 3.3

; Empty if in text
must_be_empty =
"#;

    // -- Config with one level of sections -----------------------------------

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ExternalApiUrls {
        pub rest_v1: String,
        pub rest_v2: String,
    }

    impl IniObject for ExternalApiUrls {
        structure_of!(ExternalApiUrls, || {
            type Field = FieldDescriptor<ExternalApiUrls>;
            StructuralType::new("ExternalApiUrls")
                .doc("/**\n * External API URLs\n */")
                .field(Field::value("restV1", |c| &c.rest_v1, |c| &mut c.rest_v1))
                .field(Field::value("restV2", |c| &c.rest_v2, |c| &mut c.rest_v2))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct DirsConfig {
        pub run_dir: String,
        pub working_dir: String,
        pub log_dir: String,
    }

    impl IniObject for DirsConfig {
        structure_of!(DirsConfig, || {
            type Field = FieldDescriptor<DirsConfig>;
            StructuralType::new("DirsConfig")
                .doc("Directory layout")
                .field(Field::value("runDir", |c| &c.run_dir, |c| &mut c.run_dir))
                .field(Field::value("workingDir", |c| &c.working_dir, |c| &mut c.working_dir))
                .field(Field::value("logDir", |c| &c.log_dir, |c| &mut c.log_dir))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DbConfig {
        pub host: String,
        pub dbname: String,
        pub username: String,
        pub port: u16,
    }

    impl Default for DbConfig {
        fn default() -> Self {
            Self {
                host: "localhost".into(),
                dbname: "app".into(),
                username: "app".into(),
                port: 5432,
            }
        }
    }

    impl IniObject for DbConfig {
        structure_of!(DbConfig, || {
            type Field = FieldDescriptor<DbConfig>;
            StructuralType::new("DbConfig")
                .field(Field::value("host", |c| &c.host, |c| &mut c.host))
                .field(Field::value("dbname", |c| &c.dbname, |c| &mut c.dbname))
                .field(Field::value("username", |c| &c.username, |c| &mut c.username))
                .field(Field::value("port", |c| &c.port, |c| &mut c.port))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct SectionsConfig {
        pub app_name: String,
        pub version: String,
        pub external_api_urls: ExternalApiUrls,
        pub dirs: DirsConfig,
        pub db: DbConfig,
    }

    impl SectionsConfig {
        /// The instance described by [`SECTIONS_INI`].
        pub fn loaded() -> Self {
            Self {
                app_name: "Sections".into(),
                version: "1.0".into(),
                external_api_urls: ExternalApiUrls {
                    rest_v1: "https://api.example.com/v1".into(),
                    rest_v2: "https://api.example.com/v2".into(),
                },
                dirs: DirsConfig {
                    run_dir: "/run/app".into(),
                    working_dir: "/var/lib/app".into(),
                    log_dir: "/var/log/app".into(),
                },
                db: DbConfig::default(),
            }
        }
    }

    impl IniObject for SectionsConfig {
        structure_of!(SectionsConfig, || {
            type Field = FieldDescriptor<SectionsConfig>;
            StructuralType::new("SectionsConfig")
                .doc("/**\n * Config with sections\n *\n * Nested objects become sections.\n */")
                .field(Field::value("appName", |c| &c.app_name, |c| &mut c.app_name).doc("Application name"))
                .field(Field::value("version", |c| &c.version, |c| &mut c.version).doc("Version"))
                .field(Field::nested(
                    "externalApiUrls",
                    |c| &c.external_api_urls,
                    |c| &mut c.external_api_urls,
                ))
                .field(Field::nested("dirs", |c| &c.dirs, |c| &mut c.dirs).doc("System directories"))
                .field(Field::nested("db", |c| &c.db, |c| &mut c.db))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    pub const SECTIONS_INI: &str = ";
; Config with sections

; Application name
app_name = Sections

; Version
version = 1.0

; External API URLs
[external_api_urls]
rest_v1 = https://api.example.com/v1
rest_v2 = https://api.example.com/v2

; System directories
[dirs]
run_dir = /run/app
working_dir = /var/lib/app
log_dir = /var/log/app

[db]
host = localhost
dbname = app
username = app
port = 5432
";

    // -- Config with non-instantiable nested types ---------------------------

    /// Can be held but never created by the gateway.
    #[derive(Debug, Clone, PartialEq)]
    pub struct NotifyConfig {
        pub url: String,
    }

    impl IniObject for NotifyConfig {
        structure_of!(NotifyConfig, || {
            StructuralType::new("NotifyConfig")
                .field(FieldDescriptor::<NotifyConfig>::value("url", |c| &c.url, |c| &mut c.url))
        });

        fn instantiate() -> Option<Self> {
            None
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct LogConfig {
        pub level: String,
    }

    impl IniObject for LogConfig {
        structure_of!(LogConfig, || {
            StructuralType::new("LogConfig")
                .field(FieldDescriptor::<LogConfig>::value("level", |c| &c.level, |c| &mut c.level))
        });

        fn instantiate() -> Option<Self> {
            None
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DirmonConfig {
        pub app_name: String,
        pub version: String,
        pub dirs: Array,
        pub notify: NotifyConfig,
        pub logs: Option<LogConfig>,
    }

    impl Default for DirmonConfig {
        fn default() -> Self {
            Self {
                app_name: "dirmon".into(),
                version: "0.0.0".into(),
                dirs: Array::default(),
                notify: NotifyConfig {
                    url: "unix:///dev/null".into(),
                },
                logs: None,
            }
        }
    }

    impl DirmonConfig {
        pub fn loaded() -> Self {
            Self {
                version: "0.11.3".into(),
                dirs: Array::keyed([
                    ("zones", "/var/lib/dirmon/zones"),
                    ("events", "/var/lib/dirmon/events"),
                ]),
                ..Self::default()
            }
        }
    }

    impl IniObject for DirmonConfig {
        structure_of!(DirmonConfig, || {
            type Field = FieldDescriptor<DirmonConfig>;
            StructuralType::new("DirmonConfig")
                .field(Field::value("appName", |c| &c.app_name, |c| &mut c.app_name))
                .field(Field::value("version", |c| &c.version, |c| &mut c.version))
                .field(Field::value("dirs", |c| &c.dirs, |c| &mut c.dirs))
                .field(Field::nested("notify", |c| &c.notify, |c| &mut c.notify))
                .field(Field::lazy_nested("logs", |c| &c.logs, |c| &mut c.logs))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    pub const DIRMON_SKIPPED_IN: &str = "app_name = dirmon
version = 0.11.3
unknown_key = whatever
dirs[zones] = /var/lib/dirmon/zones
dirs[events] = /var/lib/dirmon/events

[logs]
level = debug

[notify]
url = http://example.com/hook

[unknown_section]
key = value
";

    pub const DIRMON_SKIPPED_OUT: &str = "app_name = dirmon
version = 0.11.3
dirs[zones] = /var/lib/dirmon/zones
dirs[events] = /var/lib/dirmon/events

[notify]
url = unix:///dev/null
";

    // -- A chain four levels deep --------------------------------------------

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Level3 {
        pub name: String,
    }

    impl IniObject for Level3 {
        structure_of!(Level3, || {
            StructuralType::new("Level3")
                .field(FieldDescriptor::<Level3>::value("name", |c| &c.name, |c| &mut c.name))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Level2 {
        pub name: String,
        pub config: Level3,
    }

    impl IniObject for Level2 {
        structure_of!(Level2, || {
            type Field = FieldDescriptor<Level2>;
            StructuralType::new("Level2")
                .field(Field::value("name", |c| &c.name, |c| &mut c.name))
                .field(Field::nested("config", |c| &c.config, |c| &mut c.config))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Level1 {
        pub name: String,
        pub config: Level2,
    }

    impl IniObject for Level1 {
        structure_of!(Level1, || {
            type Field = FieldDescriptor<Level1>;
            StructuralType::new("Level1")
                .field(Field::value("name", |c| &c.name, |c| &mut c.name))
                .field(Field::nested("config", |c| &c.config, |c| &mut c.config))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct LevelsConfig {
        pub name: String,
        pub config: Level1,
    }

    impl LevelsConfig {
        pub fn populated() -> Self {
            Self {
                name: "root".into(),
                config: Level1 {
                    name: "lvl1".into(),
                    config: Level2 {
                        name: "lvl2".into(),
                        config: Level3 {
                            name: "lvl3".into(),
                        },
                    },
                },
            }
        }
    }

    impl IniObject for LevelsConfig {
        structure_of!(LevelsConfig, || {
            type Field = FieldDescriptor<LevelsConfig>;
            StructuralType::new("LevelsConfig")
                .field(Field::value("name", |c| &c.name, |c| &mut c.name))
                .field(Field::nested("config", |c| &c.config, |c| &mut c.config))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    pub const LEVELS_INI: &str = "name = root\n\n[config]\nname = lvl1\n";

    // -- Small shapes ---------------------------------------------------------

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct SimpleConfig {
        pub app_name: String,
        pub index: i64,
        pub enabled: bool,
    }

    impl IniObject for SimpleConfig {
        structure_of!(SimpleConfig, || {
            type Field = FieldDescriptor<SimpleConfig>;
            StructuralType::new("SimpleConfig")
                .field(Field::value("appName", |c| &c.app_name, |c| &mut c.app_name))
                .field(Field::value("index", |c| &c.index, |c| &mut c.index))
                .field(Field::value("enabled", |c| &c.enabled, |c| &mut c.enabled))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    /// Nested field declared before a plain one.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct NestedFirstConfig {
        pub db: DbConfig,
        pub name: String,
    }

    impl IniObject for NestedFirstConfig {
        structure_of!(NestedFirstConfig, || {
            type Field = FieldDescriptor<NestedFirstConfig>;
            StructuralType::new("NestedFirstConfig")
                .field(Field::nested("db", |c| &c.db, |c| &mut c.db))
                .field(Field::value("name", |c| &c.name, |c| &mut c.name))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct OptionalDbConfig {
        pub name: String,
        pub replica: Option<DbConfig>,
        pub cache: Option<DbConfig>,
    }

    impl Default for OptionalDbConfig {
        fn default() -> Self {
            Self {
                name: "app".into(),
                replica: None,
                cache: None,
            }
        }
    }

    impl IniObject for OptionalDbConfig {
        structure_of!(OptionalDbConfig, || {
            type Field = FieldDescriptor<OptionalDbConfig>;
            StructuralType::new("OptionalDbConfig")
                .field(Field::value("name", |c| &c.name, |c| &mut c.name))
                .field(Field::nullable_nested("replica", |c| &c.replica, |c| &mut c.replica))
                .field(Field::lazy_nested("cache", |c| &c.cache, |c| &mut c.cache))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    /// Plain list, string, and one section: the shapes a save must reload.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ListConfig {
        pub name: String,
        pub hosts: Vec<String>,
        pub tags: Array,
        pub db: DbConfig,
    }

    impl IniObject for ListConfig {
        structure_of!(ListConfig, || {
            type Field = FieldDescriptor<ListConfig>;
            StructuralType::new("ListConfig")
                .field(Field::value("name", |c| &c.name, |c| &mut c.name))
                .field(Field::value("hosts", |c| &c.hosts, |c| &mut c.hosts))
                .field(Field::value("tags", |c| &c.tags, |c| &mut c.tags))
                .field(Field::nested("db", |c| &c.db, |c| &mut c.db))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    /// A computed, read-only entry next to a plain one.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct StampedConfig {
        pub name: String,
    }

    fn get_stamp(config: &StampedConfig) -> String {
        format!("{}-v1", config.name)
    }

    impl IniObject for StampedConfig {
        structure_of!(StampedConfig, || {
            type Field = FieldDescriptor<StampedConfig>;
            StructuralType::new("StampedConfig")
                .field(Field::value("name", |c| &c.name, |c| &mut c.name))
                .field(Field::custom("stamp").getter(get_stamp).doc("Build stamp"))
        });

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[test]
    fn fixtures_instantiate_with_defaults() {
        let values = ValuesConfig::instantiate().unwrap();
        assert_eq!(values.secret, "hidden");
        assert_eq!(values.nulled, Some(1));
        assert!(NotifyConfig::instantiate().is_none());
        assert!(LogConfig::instantiate().is_none());
        assert_eq!(DbConfig::instantiate().unwrap().port, 5432);
    }
}
