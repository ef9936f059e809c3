//! Run configuration and argument resolution.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::log::{debug, Log};

pub mod file;

pub use file::FlowFile;

/// Names the vqm2blif checkout; also the default root for architecture files.
pub const CONVERTER_DIR_VAR: &str = "V2B_REGRESSION_BASE_DIR";
/// Names the Quartus II binary directory.
pub const SYNTHESIS_DIR_VAR: &str = "QII_BASE_DIR";
/// Names the VPR directory.
pub const LAYOUT_DIR_VAR: &str = "VPR_BASE_DIR";

pub const DEFAULT_DEVICE_FAMILY: &str = "stratixiv";
/// Outputs blackbox primitives only, with no `.names` blocks.
pub const DEFAULT_CONVERTER_OPTS: &str = "-luts vqm";
pub const DEFAULT_LAYOUT_OPTS: &str = "--fast --timing_analysis off -route_chan_width 300 --nodisp";

pub const NETLIST_EXT: &str = "vqm";
pub const LOGIC_EXT: &str = "blif";

/// Options as supplied by the user, before defaults are filled in.
///
/// `None` means "not given"; [`resolve`] substitutes a default.
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
#[builder(pattern = "owned")]
pub struct FlowArgs {
    #[builder(setter(into))]
    pub project: PathBuf,
    #[builder(setter(into, strip_option), default)]
    pub device_family: Option<ArcStr>,
    #[builder(default = "true")]
    pub resynthesize: bool,
    #[builder(setter(into, strip_option), default)]
    pub netlist: Option<PathBuf>,
    #[builder(setter(into, strip_option), default)]
    pub logic: Option<PathBuf>,
    #[builder(setter(into, strip_option), default)]
    pub arch: Option<PathBuf>,
    #[builder(setter(into, strip_option), default)]
    pub converter_opts: Option<String>,
    #[builder(setter(into, strip_option), default)]
    pub layout_opts: Option<String>,
    #[builder(default)]
    pub run_layout: bool,
    #[builder(setter(into, strip_option), default)]
    pub converter_dir: Option<PathBuf>,
    #[builder(setter(into, strip_option), default)]
    pub synthesis_dir: Option<PathBuf>,
    #[builder(setter(into, strip_option), default)]
    pub layout_dir: Option<PathBuf>,
}

impl FlowArgs {
    #[inline]
    pub fn builder() -> FlowArgsBuilder {
        FlowArgsBuilder::default()
    }

    /// Fills options that were not given explicitly from a configuration file.
    pub fn with_defaults_from(mut self, file: FlowFile) -> Self {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.device_family, file.family);
        fill(&mut self.netlist, file.vqm);
        fill(&mut self.logic, file.blif);
        fill(&mut self.arch, file.arch);
        fill(&mut self.converter_opts, file.vqm2blif_opts);
        fill(&mut self.layout_opts, file.vpr_opts);
        fill(&mut self.converter_dir, file.vqm2blif_dir);
        fill(&mut self.synthesis_dir, file.quartus_dir);
        fill(&mut self.layout_dir, file.vpr_dir);
        self
    }
}

/// A snapshot of environment variables.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Environment {
    vars: HashMap<OsString, OsString>,
}

impl Environment {
    /// Captures the environment of the current process.
    pub fn capture() -> Self {
        std::env::vars_os().collect()
    }

    /// Looks up `key`. A variable set to the empty string is returned as an
    /// empty path.
    pub fn get(&self, key: &str) -> Option<PathBuf> {
        self.vars.get(std::ffi::OsStr::new(key)).map(PathBuf::from)
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Base directories of the external tools.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ToolDirs {
    /// Root of the vqm2blif checkout.
    pub converter: PathBuf,
    /// Directory holding the Quartus II binaries.
    pub synthesis: PathBuf,
    /// Directory holding VPR; only resolved when layout is requested.
    pub layout: Option<PathBuf>,
}

/// A fully resolved run of the flow.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub project_path: PathBuf,
    pub device_family: ArcStr,
    pub resynthesize: bool,
    pub netlist_path: PathBuf,
    pub logic_path: PathBuf,
    pub arch_path: PathBuf,
    pub converter_opts: String,
    pub layout_opts: String,
    pub run_layout: bool,
    pub tool_dirs: ToolDirs,
}

impl RunConfig {
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Log for RunConfig {
    fn log(&self) {
        debug!("project: {:?}", self.project_path);
        debug!("device family: {}", self.device_family);
        debug!("re-synthesize: {}", self.resynthesize);
        debug!("netlist: {:?}", self.netlist_path);
        debug!("logic: {:?}", self.logic_path);
        debug!("architecture: {:?}", self.arch_path);
        debug!("converter options: {:?}", self.converter_opts);
        debug!("run layout: {}", self.run_layout);
        if self.run_layout {
            debug!("layout options: {:?}", self.layout_opts);
        }
        debug!("tool directories: {:?}", self.tool_dirs);
    }
}

/// Splits a free-form option string into discrete arguments.
pub fn split_opts(opts: &str) -> Vec<String> {
    opts.split_whitespace().map(str::to_string).collect()
}

/// Drops empty command line overrides so that they fall back to a default.
fn given(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|path| !path.as_os_str().is_empty())
}

fn tool_dir(
    explicit: Option<PathBuf>,
    env: &Environment,
    tool: &'static str,
    var: &'static str,
) -> std::result::Result<PathBuf, ConfigError> {
    given(explicit)
        .or_else(|| env.get(var))
        .ok_or(ConfigError::MissingToolDir { tool, var })
}

/// `<stem of the project's file name>_<family>.<ext>`, relative to the
/// invocation directory.
fn default_output(
    project: &Path,
    family: &str,
    ext: &str,
) -> std::result::Result<PathBuf, ConfigError> {
    let stem = project
        .file_stem()
        .ok_or_else(|| ConfigError::InvalidProject(project.to_path_buf()))?;
    let mut name = stem.to_os_string();
    name.push(format!("_{family}.{ext}"));
    Ok(PathBuf::from(name))
}

/// Resolves user options against an environment snapshot.
///
/// Pure: reads neither the filesystem nor the process environment.
pub fn resolve(args: FlowArgs, env: &Environment) -> Result<RunConfig> {
    let converter = tool_dir(args.converter_dir, env, "vqm2blif", CONVERTER_DIR_VAR)?;
    let synthesis = tool_dir(args.synthesis_dir, env, "quartus", SYNTHESIS_DIR_VAR)?;
    let layout = if args.run_layout {
        Some(tool_dir(args.layout_dir, env, "vpr", LAYOUT_DIR_VAR)?)
    } else {
        given(args.layout_dir)
    };

    let device_family = args
        .device_family
        .unwrap_or_else(|| ArcStr::from(DEFAULT_DEVICE_FAMILY));

    let netlist_path = match given(args.netlist) {
        Some(path) => path,
        None => default_output(&args.project, &device_family, NETLIST_EXT)?,
    };
    let logic_path = match given(args.logic) {
        Some(path) => path,
        None => default_output(&args.project, &device_family, LOGIC_EXT)?,
    };
    let arch_path = given(args.arch).unwrap_or_else(|| {
        converter
            .join("BENCHMARKS")
            .join("ARCH")
            .join(format!("{device_family}_arch.xml"))
    });

    Ok(RunConfig {
        project_path: args.project,
        device_family,
        resynthesize: args.resynthesize,
        netlist_path,
        logic_path,
        arch_path,
        converter_opts: args
            .converter_opts
            .unwrap_or_else(|| DEFAULT_CONVERTER_OPTS.to_string()),
        layout_opts: args
            .layout_opts
            .unwrap_or_else(|| DEFAULT_LAYOUT_OPTS.to_string()),
        run_layout: args.run_layout,
        tool_dirs: ToolDirs {
            converter,
            synthesis,
            layout,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorSource;

    fn env() -> Environment {
        Environment::from_iter([
            (CONVERTER_DIR_VAR, "/tools/v2b"),
            (SYNTHESIS_DIR_VAR, "/tools/quartus/bin"),
            (LAYOUT_DIR_VAR, "/tools/vpr"),
        ])
    }

    fn config_error(err: crate::error::FlowError) -> ConfigError {
        match err.into_inner() {
            ErrorSource::Config(err) => err,
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn derives_output_names_from_project_and_family() {
        let args = FlowArgs::builder()
            .project("foo/bar.v")
            .device_family("cycloneV")
            .build()
            .unwrap();
        let cfg = resolve(args, &env()).unwrap();

        assert_eq!(cfg.netlist_path, PathBuf::from("bar_cycloneV.vqm"));
        assert_eq!(cfg.logic_path, PathBuf::from("bar_cycloneV.blif"));
    }

    #[test]
    fn derives_architecture_file_from_converter_dir() {
        let args = FlowArgs::builder()
            .project("design.qpf")
            .converter_dir("/tools/v2b")
            .synthesis_dir("/tools/quartus/bin")
            .build()
            .unwrap();
        let cfg = resolve(args, &Environment::default()).unwrap();

        assert_eq!(cfg.device_family.as_str(), "stratixiv");
        assert_eq!(
            cfg.arch_path,
            PathBuf::from("/tools/v2b/BENCHMARKS/ARCH/stratixiv_arch.xml")
        );
    }

    #[test]
    fn applies_defaults() {
        let args = FlowArgs::builder().project("design.qpf").build().unwrap();
        let cfg = resolve(args, &env()).unwrap();

        assert!(cfg.resynthesize);
        assert!(!cfg.run_layout);
        assert_eq!(cfg.converter_opts, DEFAULT_CONVERTER_OPTS);
        assert_eq!(cfg.layout_opts, DEFAULT_LAYOUT_OPTS);
        assert_eq!(cfg.tool_dirs.converter, PathBuf::from("/tools/v2b"));
        assert_eq!(cfg.tool_dirs.synthesis, PathBuf::from("/tools/quartus/bin"));
        assert_eq!(cfg.tool_dirs.layout, None);
    }

    #[test]
    fn explicit_values_win_over_environment_and_defaults() {
        let args = FlowArgs::builder()
            .project("proj/design.qpf")
            .netlist("out/n.vqm")
            .logic("out/l.blif")
            .arch("my_arch.xml")
            .converter_dir("/elsewhere/v2b")
            .converter_opts("")
            .build()
            .unwrap();
        let cfg = resolve(args, &env()).unwrap();

        assert_eq!(cfg.netlist_path, PathBuf::from("out/n.vqm"));
        assert_eq!(cfg.logic_path, PathBuf::from("out/l.blif"));
        assert_eq!(cfg.arch_path, PathBuf::from("my_arch.xml"));
        assert_eq!(cfg.tool_dirs.converter, PathBuf::from("/elsewhere/v2b"));
        assert_eq!(cfg.converter_opts, "");
    }

    #[test]
    fn missing_converter_dir_is_fatal() {
        let env = Environment::from_iter([(SYNTHESIS_DIR_VAR, "/tools/quartus/bin")]);
        let args = FlowArgs::builder().project("design.qpf").build().unwrap();
        let err = config_error(resolve(args, &env).unwrap_err());

        assert_eq!(
            err,
            ConfigError::MissingToolDir {
                tool: "vqm2blif",
                var: CONVERTER_DIR_VAR
            }
        );
    }

    #[test]
    fn missing_synthesis_dir_is_fatal() {
        let env = Environment::from_iter([(CONVERTER_DIR_VAR, "/tools/v2b")]);
        let args = FlowArgs::builder().project("design.qpf").build().unwrap();
        let err = config_error(resolve(args, &env).unwrap_err());

        assert!(matches!(
            err,
            ConfigError::MissingToolDir {
                var: SYNTHESIS_DIR_VAR,
                ..
            }
        ));
    }

    #[test]
    fn layout_dir_is_only_required_for_layout_runs() {
        let env = Environment::from_iter([
            (CONVERTER_DIR_VAR, "/tools/v2b"),
            (SYNTHESIS_DIR_VAR, "/tools/quartus/bin"),
        ]);

        let args = FlowArgs::builder().project("design.qpf").build().unwrap();
        assert!(resolve(args, &env).is_ok());

        let args = FlowArgs::builder()
            .project("design.qpf")
            .run_layout(true)
            .build()
            .unwrap();
        let err = config_error(resolve(args, &env).unwrap_err());
        assert!(matches!(
            err,
            ConfigError::MissingToolDir {
                var: LAYOUT_DIR_VAR,
                ..
            }
        ));
    }

    #[test]
    fn empty_overrides_count_as_unset() {
        let args = FlowArgs::builder()
            .project("design.qpf")
            .netlist("")
            .logic("")
            .arch("")
            .converter_dir("")
            .synthesis_dir("")
            .build()
            .unwrap();
        let cfg = resolve(args, &env()).unwrap();

        assert_eq!(cfg.netlist_path, PathBuf::from("design_stratixiv.vqm"));
        assert_eq!(cfg.logic_path, PathBuf::from("design_stratixiv.blif"));
        assert_eq!(
            cfg.arch_path,
            PathBuf::from("/tools/v2b/BENCHMARKS/ARCH/stratixiv_arch.xml")
        );
        assert_eq!(cfg.tool_dirs.converter, PathBuf::from("/tools/v2b"));
        assert_eq!(cfg.tool_dirs.synthesis, PathBuf::from("/tools/quartus/bin"));
    }

    #[test]
    fn empty_override_without_environment_is_fatal() {
        let env = Environment::from_iter([(SYNTHESIS_DIR_VAR, "/tools/quartus/bin")]);
        let args = FlowArgs::builder()
            .project("design.qpf")
            .converter_dir("")
            .build()
            .unwrap();
        let err = config_error(resolve(args, &env).unwrap_err());
        assert!(matches!(
            err,
            ConfigError::MissingToolDir {
                var: CONVERTER_DIR_VAR,
                ..
            }
        ));
    }

    #[test]
    fn empty_environment_variable_is_a_relative_base() {
        let env = Environment::from_iter([
            (CONVERTER_DIR_VAR, ""),
            (SYNTHESIS_DIR_VAR, "/tools/quartus/bin"),
        ]);
        let args = FlowArgs::builder().project("design.qpf").build().unwrap();
        let cfg = resolve(args, &env).unwrap();

        assert_eq!(cfg.tool_dirs.converter, PathBuf::new());
        assert_eq!(
            cfg.arch_path,
            PathBuf::from("BENCHMARKS/ARCH/stratixiv_arch.xml")
        );
    }

    #[test]
    fn project_without_file_name_is_rejected() {
        let args = FlowArgs::builder().project("..").build().unwrap();
        let err = config_error(resolve(args, &env()).unwrap_err());
        assert_eq!(err, ConfigError::InvalidProject(PathBuf::from("..")));
    }

    #[test]
    fn project_is_required() {
        assert!(FlowArgs::builder().device_family("cycloneV").build().is_err());
    }

    #[test]
    fn splits_options_into_tokens() {
        assert_eq!(split_opts("-luts vqm"), vec!["-luts", "vqm"]);
        assert_eq!(split_opts("  --fast\t--nodisp \n"), vec!["--fast", "--nodisp"]);
        assert!(split_opts("").is_empty());
        assert!(split_opts("   ").is_empty());
    }

    #[test]
    fn config_file_fills_only_unset_options() {
        let file: FlowFile = toml::from_str(
            r#"
            family = "cycloneiv"
            vqm2blif_opts = "-luts blif"
            quartus_dir = "/from/file/quartus"
            "#,
        )
        .unwrap();
        let args = FlowArgs::builder()
            .project("design.qpf")
            .converter_opts("-luts vqm -debug")
            .build()
            .unwrap()
            .with_defaults_from(file);

        assert_eq!(args.device_family.as_deref(), Some("cycloneiv"));
        assert_eq!(args.converter_opts.as_deref(), Some("-luts vqm -debug"));
        assert_eq!(args.synthesis_dir, Some(PathBuf::from("/from/file/quartus")));
    }

    #[test]
    fn resolved_config_serializes_to_toml() {
        let args = FlowArgs::builder().project("design.qpf").build().unwrap();
        let toml = resolve(args, &env()).unwrap().to_toml().unwrap();
        assert!(toml.contains("device_family = \"stratixiv\""));
        assert!(toml.contains("[tool_dirs]"));
    }
}
