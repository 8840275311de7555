use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use runm_core::errors::{ErrorInfo, RunmError};
use runm_core::rng::validate_bits;
use runm_sweep::{sweeps_from_values, SweepNode};
use serde::Deserialize;
use serde_json::Value;

use crate::serde::{from_commented_json_str, from_yaml_str};

/// Timestamp layout used for per-invocation run directories.
pub const RUN_DIRECTORY_FORMAT: &str = "%Y.%m.%d-%H.%M.%S";

/// On-disk encoding of the per-run parameter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParametersFormat {
    /// Nested JSON object built from dot-segmented keys.
    #[default]
    Json,
    /// Headerless `key,value` rows.
    Csv,
    /// Headerless tab separated `key<TAB>value` rows.
    Tsv,
}

impl FromStr for ParametersFormat {
    type Err = RunmError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "json" => Ok(ParametersFormat::Json),
            "csv" => Ok(ParametersFormat::Csv),
            "txt" | "tsv" => Ok(ParametersFormat::Tsv),
            _ => Err(RunmError::Config(
                ErrorInfo::new("parameters_format", "unsupported parameters format")
                    .with_context("format", text)
                    .with_hint("use json, csv, or txt/tsv"),
            )),
        }
    }
}

impl fmt::Display for ParametersFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParametersFormat::Json => "json",
            ParametersFormat::Csv => "csv",
            ParametersFormat::Tsv => "tsv",
        })
    }
}

/// Immutable sweep configuration.
///
/// Defaults are applied once by [`Config::default`]; the loader only fills in
/// what the file sets. Nothing mutates a config after [`load_config`] returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Sweep name, prefix of every `RUNM_RUN_NAME`.
    pub name: String,
    /// Repetitions per parameter combination.
    pub runs: usize,
    /// Prepare run directories without launching anything.
    pub dry: bool,
    /// Size of the submission worker pool.
    pub thread_count: usize,
    /// Constant parameters, inline entries overridden by the constants file.
    pub constants: IndexMap<String, Value>,
    /// Shell command launched once per run.
    pub submit_command: Option<String>,
    /// Base directory for results, relative to the config file.
    pub results_directory: PathBuf,
    /// Append the sweep name to the results directory.
    pub make_subdirectory: bool,
    /// Append an invocation timestamp to the results directory.
    pub make_run_directory: bool,
    /// Reuse run directories that already exist instead of aborting.
    pub use_existing_directories: bool,
    /// Prefix of each rendered `name=value` argument token.
    pub command_line_argument_prefix: String,
    /// Separator between name and value in argument tokens.
    pub command_line_argument_delimiter: String,
    /// Export every sweep parameter as its own environment variable.
    pub use_environment_variables: bool,
    /// File name of the parameter file inside each run directory.
    pub parameters_filename: String,
    /// Encoding of the parameter file.
    pub parameters_format: ParametersFormat,
    /// Parameter name carrying the generated seed.
    pub random_seed_parameter_name: String,
    /// Width of generated seeds in bits.
    pub random_seed_bits: u32,
    /// Parameter name carrying the run number.
    pub run_number_parameter_name: String,
    /// Absolute path of the config file, empty when built in code.
    pub config_file: PathBuf,
    /// Root of the sweep tree.
    pub sweep: SweepNode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "runm".to_string(),
            runs: 1,
            dry: false,
            thread_count: 1,
            constants: IndexMap::new(),
            submit_command: None,
            results_directory: PathBuf::from("."),
            make_subdirectory: true,
            make_run_directory: true,
            use_existing_directories: false,
            command_line_argument_prefix: String::new(),
            command_line_argument_delimiter: "=".to_string(),
            use_environment_variables: false,
            parameters_filename: "parameters.json".to_string(),
            parameters_format: ParametersFormat::Json,
            random_seed_parameter_name: "randomSeed".to_string(),
            random_seed_bits: 16,
            run_number_parameter_name: "run".to_string(),
            config_file: PathBuf::new(),
            sweep: SweepNode::combination(Vec::new()),
        }
    }
}

/// Command line overrides applied on top of the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    /// Force a dry run.
    pub dry: bool,
}

fn invalid(code: &str, message: &str, key: &str, value: impl ToString) -> RunmError {
    RunmError::Config(ErrorInfo::new(code, message).with_context(key, value.to_string()))
}

impl Config {
    /// Checks the invariants submission relies on.
    pub fn validate(&self) -> Result<(), RunmError> {
        if self.runs == 0 {
            return Err(invalid("runs", "runs must be at least 1", "runs", self.runs));
        }
        if self.thread_count == 0 {
            return Err(invalid(
                "thread_count",
                "threadCount must be at least 1",
                "threadCount",
                self.thread_count,
            ));
        }
        validate_bits(self.random_seed_bits)?;
        if self.parameters_filename.is_empty() {
            return Err(RunmError::config(
                "parameters_filename",
                "parametersFilename must not be empty",
            ));
        }
        if !self.dry && self.submit_command.as_deref().map_or(true, str::is_empty) {
            return Err(RunmError::Config(
                ErrorInfo::new("submit_command", "no submit command configured")
                    .with_hint("set submitCommand or pass --dry"),
            ));
        }
        Ok(())
    }

    /// Directory holding the config file, or the working directory when the
    /// config was built in code.
    pub fn config_dir(&self) -> Result<PathBuf, RunmError> {
        match self.config_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
            _ => std::env::current_dir().map_err(|err| RunmError::io("current_dir", ".", err)),
        }
    }

    /// Absolute root directory for one submission started at `now`.
    pub fn root_dir(&self, now: DateTime<Local>) -> Result<PathBuf, RunmError> {
        let mut root = self.results_directory.clone();
        if self.make_subdirectory {
            root.push(&self.name);
        }
        if self.make_run_directory {
            root.push(now.format(RUN_DIRECTORY_FORMAT).to_string());
        }
        Ok(absolutize(&expand_home(&root), &self.config_dir()?))
    }
}

/// Replaces a leading `~` with `$HOME`.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Joins `path` onto `base` when relative and folds `.`/`..` lexically.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    runs: Option<usize>,
    dry: Option<bool>,
    thread_count: Option<usize>,
    #[serde(default)]
    constants: IndexMap<String, Value>,
    #[serde(alias = "constantsFile")]
    constants_filename: Option<PathBuf>,
    submit_command: Option<String>,
    results_directory: Option<PathBuf>,
    make_run_directory: Option<bool>,
    make_subdirectory: Option<bool>,
    use_existing_directories: Option<bool>,
    command_line_argument_prefix: Option<String>,
    command_line_argument_delimiter: Option<String>,
    use_environment_variables: Option<bool>,
    parameters_filename: Option<String>,
    parameters_format: Option<String>,
    random_seed_parameter_name: Option<String>,
    random_seed_bits: Option<u32>,
    run_number_parameter_name: Option<String>,
    #[serde(default)]
    sweeps: Vec<Value>,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// Loads, resolves, and validates a sweep configuration file.
pub fn load_config<P: AsRef<Path>>(
    path: P,
    overrides: ConfigOverrides,
) -> Result<Config, RunmError> {
    let path = path.as_ref();
    let cwd = std::env::current_dir().map_err(|err| RunmError::io("current_dir", ".", err))?;
    let config_file = absolutize(path, &cwd);
    let text = fs::read_to_string(&config_file)
        .map_err(|err| RunmError::io("config_read", &config_file, err))?;
    let file: ConfigFile = if is_yaml(&config_file) {
        from_yaml_str(&text)
    } else {
        from_commented_json_str(&text)
    }
    .map_err(|err| {
        RunmError::Config(err.info().clone().with_path(&config_file))
    })?;
    build_config(file, config_file, overrides)
}

fn build_config(
    file: ConfigFile,
    config_file: PathBuf,
    overrides: ConfigOverrides,
) -> Result<Config, RunmError> {
    if let Some(kind) = file.kind.as_deref() {
        if kind != "config" {
            return Err(invalid("config_type", "top-level type must be \"config\"", "type", kind));
        }
    }
    let defaults = Config::default();
    let mut constants = file.constants;
    let config_dir = config_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    if let Some(constants_path) = file.constants_filename {
        let resolved = absolutize(&expand_home(&constants_path), &config_dir);
        let text = fs::read_to_string(&resolved)
            .map_err(|err| RunmError::io("constants_read", &resolved, err))?;
        let from_file: IndexMap<String, Value> = from_commented_json_str(&text)?;
        constants.extend(from_file);
    }
    let parameters_filename = file
        .parameters_filename
        .unwrap_or(defaults.parameters_filename);
    let parameters_format = match file.parameters_format {
        Some(format) => format.parse()?,
        None => match Path::new(&parameters_filename).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext.parse()?,
            None => ParametersFormat::Json,
        },
    };

    let config = Config {
        name: file.name.unwrap_or(defaults.name),
        runs: file.runs.unwrap_or(defaults.runs),
        dry: overrides.dry || file.dry.unwrap_or(defaults.dry),
        thread_count: file.thread_count.unwrap_or(defaults.thread_count),
        constants,
        submit_command: file.submit_command,
        results_directory: file.results_directory.unwrap_or(defaults.results_directory),
        make_subdirectory: file.make_subdirectory.unwrap_or(defaults.make_subdirectory),
        make_run_directory: file.make_run_directory.unwrap_or(defaults.make_run_directory),
        use_existing_directories: file
            .use_existing_directories
            .unwrap_or(defaults.use_existing_directories),
        command_line_argument_prefix: file
            .command_line_argument_prefix
            .unwrap_or(defaults.command_line_argument_prefix),
        command_line_argument_delimiter: file
            .command_line_argument_delimiter
            .unwrap_or(defaults.command_line_argument_delimiter),
        use_environment_variables: file
            .use_environment_variables
            .unwrap_or(defaults.use_environment_variables),
        parameters_filename,
        parameters_format,
        random_seed_parameter_name: file
            .random_seed_parameter_name
            .unwrap_or(defaults.random_seed_parameter_name),
        random_seed_bits: file.random_seed_bits.unwrap_or(defaults.random_seed_bits),
        run_number_parameter_name: file
            .run_number_parameter_name
            .unwrap_or(defaults.run_number_parameter_name),
        config_file,
        sweep: sweeps_from_values(&file.sweeps)?,
    };
    config.validate()?;
    Ok(config)
}
