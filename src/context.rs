//! Option-parsing orchestration.
//!
//! [`OptionsContext`] owns the option registry and the usage composer,
//! seeds the built-in options and groups, and turns a raw argument vector
//! into an immutable [`CommandLine`]: typed option values, the ordered
//! command list, and the inline environment-variable overrides.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::debug;

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::parallelism;
use crate::registry::{OptKind, OptParser, OptSpec, OptValue, OptionGroup, ParsedOptions, REST_ARGS};
use crate::usage::CommandDocs;

/// Name of the hosting binary, used in usage text.
pub const PROG: &str = "mason";

/// The commands every project supports out of the box.
pub const DEFAULT_COMMANDS: &[&str] = &[
    "distclean",
    "configure",
    "build",
    "install",
    "clean",
    "uninstall",
    "check",
    "dist",
    "distcheck",
];

/// Effective color mode after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Off,
    Auto,
    On,
}

impl ColorMode {
    fn from_choice(choice: &str) -> Self {
        match choice {
            "yes" => ColorMode::On,
            "no" => ColorMode::Off,
            _ => ColorMode::Auto,
        }
    }

    /// Numeric level for the logging facility: off 0, auto 1, on 2.
    pub fn level(self) -> u8 {
        match self {
            ColorMode::Off => 0,
            ColorMode::Auto => 1,
            ColorMode::On => 2,
        }
    }
}

/// The immutable result of a parse: written once, read everywhere.
#[derive(Debug, Clone)]
pub struct CommandLine {
    /// One resolved value per registered option, default or overridden.
    pub options: ParsedOptions,
    /// Commands to execute, in order, duplicates allowed.
    pub commands: Vec<String>,
    /// Raw `KEY=VALUE` tokens, unparsed at this layer.
    pub env_overrides: Vec<String>,
    /// Resolved color mode.
    pub colors: ColorMode,
    /// Whether the extended diagnostic pass is armed (`-v` and above).
    pub extra_checks: bool,
}

/// Collects the built-in and project-supplied options and parses the
/// command line.
#[derive(Debug, Clone)]
pub struct OptionsContext {
    parser: OptParser,
    docs: CommandDocs,
}

impl OptionsContext {
    /// Creates a context with the built-in options and groups registered
    /// and the default job count probed.
    pub fn new() -> Result<Self> {
        let mut parser = OptParser::new();
        let jobs = parallelism::default_jobs();

        let color_default = if env::var_os("NOCOLOR").is_some_and(|value| !value.is_empty()) {
            "no"
        } else {
            "auto"
        };
        parser.add_option(
            OptSpec::new("colors", OptKind::Str)
                .short('c')
                .long("color")
                .default(OptValue::Str(color_default.to_string()))
                .choices(["yes", "no", "auto"])
                .help("whether to use colors (yes/no/auto) [default: auto]"),
        )?;
        parser.add_option(
            OptSpec::new("jobs", OptKind::Int)
                .short('j')
                .default(OptValue::Int(jobs as i64))
                .help(format!("amount of parallel jobs ({jobs})")),
        )?;
        parser.add_option(
            OptSpec::new("keep", OptKind::Count)
                .short('k')
                .help("continue despite errors (-kk to try harder)"),
        )?;
        parser.add_option(
            OptSpec::new("verbose", OptKind::Count)
                .short('v')
                .help("verbosity level -v -vv or -vvv [default: 0]"),
        )?;
        parser.add_option(
            OptSpec::new("zones", OptKind::Str)
                .help("debugging zones (task_gen, deps, tasks, etc)"),
        )?;

        let group = parser.add_option_group("Configuration options");
        group.add_option(
            OptSpec::new("out", OptKind::Str)
                .short('o')
                .help("build dir for the project"),
        )?;
        group.add_option(
            OptSpec::new("top", OptKind::Str)
                .short('t')
                .help("src dir for the project"),
        )?;
        group.add_option(OptSpec::new("no_lock_in_run", OptKind::Flag).hidden())?;
        group.add_option(OptSpec::new("no_lock_in_out", OptKind::Flag).hidden())?;
        group.add_option(OptSpec::new("no_lock_in_top", OptKind::Flag).hidden())?;
        let prefix = default_prefix();
        group.add_option(
            OptSpec::new("prefix", OptKind::Str)
                .default(OptValue::Str(prefix.clone()))
                .help(format!("installation prefix [default: {prefix:?}]")),
        )?;
        group.add_option(OptSpec::new("bindir", OptKind::Str).help("bindir"))?;
        group.add_option(OptSpec::new("libdir", OptKind::Str).help("libdir"))?;
        parser.alias_group("configure options", "Configuration options");

        let group = parser.add_option_group("Build and installation options");
        group.add_option(
            OptSpec::new("progress_bar", OptKind::Count)
                .short('p')
                .long("progress")
                .help("-p: progress bar; -pp: ide output"),
        )?;
        group.add_option(
            OptSpec::new("targets", OptKind::Str)
                .help("task generators, e.g. \"target1,target2\""),
        )?;
        parser.alias_group("build and install options", "Build and installation options");

        let group = parser.add_option_group("Step options");
        group.add_option(
            OptSpec::new("files", OptKind::Str)
                .help("files to process, by regexp, e.g. \"*/main.c,*/test/main.o\""),
        )?;
        parser.alias_group("step options", "Step options");

        let destdir = env::var("DESTDIR").unwrap_or_default();
        let group = parser.add_option_group("Installation and uninstallation options");
        group.add_option(
            OptSpec::new("destdir", OptKind::Str)
                .default(OptValue::Str(destdir.clone()))
                .help(format!("installation root [default: {destdir:?}]")),
        )?;
        group.add_option(
            OptSpec::new("force", OptKind::Flag)
                .short('f')
                .help("force file installation"),
        )?;
        group.add_option(
            OptSpec::new("distcheck_args", OptKind::Str)
                .long("distcheck-args")
                .help("arguments to pass to distcheck"),
        )?;
        parser.alias_group(
            "install/uninstall options",
            "Installation and uninstallation options",
        );

        Ok(Self {
            parser,
            docs: CommandDocs::new(),
        })
    }

    /// Registers a top-level option, overwriting any prior definition
    /// with the same destination key.
    pub fn add_option(&mut self, spec: OptSpec) -> Result<()> {
        self.parser.add_option(spec)
    }

    /// Returns the group with the given title, creating it on first use.
    pub fn add_option_group(&mut self, title: &str) -> &mut OptionGroup {
        self.parser.add_option_group(title)
    }

    /// Looks a group up by key or title; `None` when never created.
    pub fn get_option_group(&mut self, key: &str) -> Option<&mut OptionGroup> {
        self.parser.get_option_group(key)
    }

    /// Registers a command type's description for the usage text.
    pub fn register_command_doc(&mut self, name: &str, doc: &str) {
        self.docs.register_command(name, doc);
    }

    /// Registers a documented project-script function for the usage text.
    pub fn register_script_doc(&mut self, name: &str, doc: &str) {
        self.docs.register_script_doc(name, doc);
    }

    /// The full `--help` usage text for the current registry contents.
    pub fn usage(&self) -> String {
        self.docs.compose(PROG)
    }

    /// Parses the process arguments.
    pub fn execute(&mut self) -> Result<CommandLine> {
        self.parse_args(env::args_os().skip(1))
    }

    /// Parses an explicit argument vector (not bound to the command line).
    pub fn parse_args<I, T>(&mut self, args: I) -> Result<CommandLine>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let banner = self.docs.command_table(PROG);
        let matches = self
            .parser
            .to_command(PROG, banner)
            .try_get_matches_from(args)?;

        let leftover: Vec<String> = matches
            .get_many::<String>(REST_ARGS)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let (commands, env_overrides) = classify(leftover);

        let mut options = self.parser.collect(&matches);

        // An empty destdir means "not set"; an explicit empty value is
        // deliberately treated the same way.
        let destdir = options.str_value("destdir").unwrap_or("").to_string();
        if !destdir.is_empty() {
            let normalized = normalize_user_path(&destdir)?;
            debug!("destdir normalized to `{}`", normalized.display());
            options.set(
                "destdir",
                OptValue::Str(normalized.to_string_lossy().into_owned()),
            );
        }

        let colors = options
            .str_value("colors")
            .map(ColorMode::from_choice)
            .unwrap_or(ColorMode::Auto);
        let extra_checks = options.count_value("verbose").unwrap_or(0) >= 1;

        Ok(CommandLine {
            options,
            commands,
            env_overrides,
            colors,
            extra_checks,
        })
    }
}

/// Default installation prefix: the `PREFIX` environment variable, a
/// capitalized temp directory on Windows, `/usr/local/` elsewhere.
fn default_prefix() -> String {
    if let Ok(prefix) = env::var("PREFIX") {
        if !prefix.is_empty() {
            return prefix;
        }
    }
    if cfg!(windows) {
        // Windows preserves case but the temp-dir query does not.
        let tmp = env::temp_dir().to_string_lossy().into_owned();
        let mut chars = tmp.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => tmp,
        }
    } else {
        "/usr/local/".to_string()
    }
}

/// Expands `~` and resolves the path against the working directory.
fn normalize_user_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::tilde(raw);
    std::path::absolute(Path::new(expanded.as_ref()))
        .map_err(|error| Error::path_error(raw.to_string(), error))
}
