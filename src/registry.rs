//! Typed command-line option registry.
//!
//! Options are registered dynamically (built-ins first, then whatever a
//! project's `options` hook adds), so the parser is driven by data rather
//! than a derive macro: each option is an [`OptSpec`] with a destination
//! key and a tagged default value, and the registry materializes a
//! `clap::Command` from the specs at parse time.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Identifier of the hidden positional argument collecting leftover tokens.
pub(crate) const REST_ARGS: &str = "__rest";

/// Value kinds an option can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    Str,
    Int,
    Count,
    Flag,
}

impl OptKind {
    fn name(self) -> &'static str {
        match self {
            OptKind::Str => "string",
            OptKind::Int => "integer",
            OptKind::Count => "count",
            OptKind::Flag => "flag",
        }
    }
}

/// A resolved option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptValue {
    Str(String),
    Int(i64),
    Count(u64),
    Flag(bool),
}

impl OptValue {
    pub fn kind(&self) -> OptKind {
        match self {
            OptValue::Str(_) => OptKind::Str,
            OptValue::Int(_) => OptKind::Int,
            OptValue::Count(_) => OptKind::Count,
            OptValue::Flag(_) => OptKind::Flag,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            OptValue::Count(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptValue::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

/// One registered option: flag forms, destination key, kind, default,
/// help text, optional choice set, hidden-from-help marker.
///
/// Built with a chained builder; immutable once handed to the registry.
#[derive(Debug, Clone)]
pub struct OptSpec {
    dest: String,
    kind: OptKind,
    short: Option<char>,
    long: Option<String>,
    default: OptValue,
    help: String,
    choices: Option<Vec<String>>,
    hidden: bool,
}

impl OptSpec {
    pub fn new(dest: impl Into<String>, kind: OptKind) -> Self {
        let default = match kind {
            OptKind::Str => OptValue::Str(String::new()),
            OptKind::Int => OptValue::Int(0),
            OptKind::Count => OptValue::Count(0),
            OptKind::Flag => OptValue::Flag(false),
        };
        Self {
            dest: dest.into(),
            kind,
            short: None,
            long: None,
            default,
            help: String::new(),
            choices: None,
            hidden: false,
        }
    }

    #[must_use]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    #[must_use]
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    #[must_use]
    pub fn default(mut self, default: OptValue) -> Self {
        self.default = default;
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    #[must_use]
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn kind(&self) -> OptKind {
        self.kind
    }

    /// The long flag form: explicit, or derived from the destination key.
    pub fn long_flag(&self) -> String {
        match &self.long {
            Some(long) => long.clone(),
            None => self.dest.replace('_', "-"),
        }
    }

    /// Checks the invariants that must hold before registration: the
    /// default matches the declared kind, and a choice set only appears
    /// on string options with the default among the choices.
    fn validate(&self) -> Result<()> {
        if self.default.kind() != self.kind {
            return Err(Error::wrong_kind(&self.dest, self.kind.name()));
        }
        if let Some(choices) = &self.choices {
            if self.kind != OptKind::Str {
                return Err(Error::ChoicesOnNonString(self.dest.clone()));
            }
            let default = self.default.as_str().unwrap_or("");
            if !choices.iter().any(|choice| choice == default) {
                return Err(Error::DefaultOutsideChoices {
                    dest: self.dest.clone(),
                    default: default.to_string(),
                });
            }
        }
        Ok(())
    }

    fn to_arg(&self, heading: Option<&str>) -> Arg {
        let mut arg = Arg::new(self.dest.clone())
            .long(self.long_flag())
            .help(self.help.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if self.hidden {
            arg = arg.hide(true);
        }
        if let Some(heading) = heading {
            arg = arg.help_heading(heading.to_string());
        }
        match self.kind {
            OptKind::Str => {
                arg = arg.action(ArgAction::Set);
                if let Some(choices) = &self.choices {
                    arg = arg.value_parser(PossibleValuesParser::new(choices.clone()));
                }
                if let OptValue::Str(default) = &self.default {
                    arg = arg.default_value(default.clone());
                }
            }
            OptKind::Int => {
                arg = arg.action(ArgAction::Set).value_parser(clap::value_parser!(i64));
                if let OptValue::Int(default) = &self.default {
                    arg = arg.default_value(default.to_string());
                }
            }
            OptKind::Count => {
                arg = arg.action(ArgAction::Count);
            }
            OptKind::Flag => {
                arg = arg.action(ArgAction::SetTrue);
            }
        }
        arg
    }
}

/// A titled bucket of options, used for help-text organization only.
#[derive(Debug, Clone)]
pub struct OptionGroup {
    title: String,
    options: IndexMap<String, OptSpec>,
}

impl OptionGroup {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            options: IndexMap::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Registers an option in this group. Re-registering a destination
    /// key within the group overwrites the prior definition.
    pub fn add_option(&mut self, spec: OptSpec) -> Result<()> {
        spec.validate()?;
        self.options.insert(spec.dest().to_string(), spec);
        Ok(())
    }

    pub fn has_option(&self, dest: &str) -> bool {
        self.options.contains_key(dest)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// The parse result: one resolved value per registered destination key.
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    values: IndexMap<String, OptValue>,
}

impl ParsedOptions {
    pub fn get(&self, dest: &str) -> Option<&OptValue> {
        self.values.get(dest)
    }

    pub fn str_value(&self, dest: &str) -> Result<&str> {
        self.lookup(dest)?
            .as_str()
            .ok_or_else(|| Error::wrong_kind(dest, OptKind::Str.name()))
    }

    pub fn int_value(&self, dest: &str) -> Result<i64> {
        self.lookup(dest)?
            .as_int()
            .ok_or_else(|| Error::wrong_kind(dest, OptKind::Int.name()))
    }

    pub fn count_value(&self, dest: &str) -> Result<u64> {
        self.lookup(dest)?
            .as_count()
            .ok_or_else(|| Error::wrong_kind(dest, OptKind::Count.name()))
    }

    pub fn flag_value(&self, dest: &str) -> Result<bool> {
        self.lookup(dest)?
            .as_flag()
            .ok_or_else(|| Error::wrong_kind(dest, OptKind::Flag.name()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup(&self, dest: &str) -> Result<&OptValue> {
        self.values
            .get(dest)
            .ok_or_else(|| Error::UnknownOption(dest.to_string()))
    }

    pub(crate) fn set(&mut self, dest: &str, value: OptValue) {
        self.values.insert(dest.to_string(), value);
    }
}

/// The underlying parser abstraction: ungrouped options plus titled
/// groups, with idempotent group creation and alias keys.
#[derive(Debug, Clone, Default)]
pub struct OptParser {
    options: IndexMap<String, OptSpec>,
    groups: Vec<OptionGroup>,
    group_index: IndexMap<String, usize>,
}

impl OptParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a top-level option. Last writer wins: any prior option
    /// with the same destination key is dropped, groups included.
    pub fn add_option(&mut self, spec: OptSpec) -> Result<()> {
        spec.validate()?;
        for group in &mut self.groups {
            group.options.shift_remove(spec.dest());
        }
        self.options.insert(spec.dest().to_string(), spec);
        Ok(())
    }

    /// Returns the group with the given title, creating it on first use.
    /// Requesting an existing title returns the same group.
    pub fn add_option_group(&mut self, title: &str) -> &mut OptionGroup {
        let idx = match self.group_index.get(title) {
            Some(&idx) => idx,
            None => {
                self.groups.push(OptionGroup::new(title));
                let idx = self.groups.len() - 1;
                self.group_index.insert(title.to_string(), idx);
                idx
            }
        };
        &mut self.groups[idx]
    }

    /// Indexes an existing group under an additional lookup key.
    /// Returns false when no group has the given title.
    pub fn alias_group(&mut self, alias: &str, title: &str) -> bool {
        match self.group_index.get(title).copied() {
            Some(idx) => {
                self.group_index.insert(alias.to_string(), idx);
                true
            }
            None => false,
        }
    }

    /// Looks a group up by key, falling back to a linear scan over all
    /// group titles before giving up.
    pub fn get_option_group(&mut self, key: &str) -> Option<&mut OptionGroup> {
        let idx = match self.group_index.get(key) {
            Some(&idx) => Some(idx),
            None => self.groups.iter().position(|group| group.title == key),
        };
        idx.and_then(move |idx| self.groups.get_mut(idx))
    }

    /// Final view of the registry: destination keys are unique, later
    /// registrations shadowing earlier ones (ungrouped first, then
    /// groups in creation order).
    fn merged(&self) -> IndexMap<&str, (Option<&str>, &OptSpec)> {
        let mut all = IndexMap::new();
        for (dest, spec) in &self.options {
            all.insert(dest.as_str(), (None, spec));
        }
        for group in &self.groups {
            for (dest, spec) in &group.options {
                all.insert(dest.as_str(), (Some(group.title.as_str()), spec));
            }
        }
        all
    }

    pub(crate) fn to_command(&self, prog: &'static str, banner: String) -> Command {
        let mut cmd = Command::new(prog)
            .no_binary_name(true)
            .version(env!("CARGO_PKG_VERSION"))
            .override_usage(format!("{prog} [commands] [options]"))
            .before_help(banner)
            .arg(
                Arg::new(REST_ARGS)
                    .value_name("COMMAND|KEY=VALUE")
                    .num_args(0..)
                    .hide(true),
            );
        for (_, (heading, spec)) in self.merged() {
            cmd = cmd.arg(spec.to_arg(heading));
        }
        cmd
    }

    pub(crate) fn collect(&self, matches: &ArgMatches) -> ParsedOptions {
        let mut parsed = ParsedOptions::default();
        for (dest, (_, spec)) in self.merged() {
            let value = match spec.kind {
                OptKind::Str => OptValue::Str(
                    matches
                        .get_one::<String>(dest)
                        .cloned()
                        .unwrap_or_else(|| spec.default.as_str().unwrap_or("").to_string()),
                ),
                OptKind::Int => OptValue::Int(
                    matches
                        .get_one::<i64>(dest)
                        .copied()
                        .unwrap_or_else(|| spec.default.as_int().unwrap_or(0)),
                ),
                OptKind::Count => OptValue::Count(u64::from(matches.get_count(dest))),
                OptKind::Flag => OptValue::Flag(matches.get_flag(dest)),
            };
            parsed.set(dest, value);
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_opt(dest: &str) -> OptSpec {
        OptSpec::new(dest, OptKind::Str)
    }

    #[test]
    fn test_add_option_group_is_idempotent() {
        let mut parser = OptParser::new();
        parser
            .add_option_group("Step options")
            .add_option(string_opt("files"))
            .unwrap();
        let again = parser.add_option_group("Step options");
        assert!(again.has_option("files"));
        assert_eq!(parser.groups.len(), 1);
    }

    #[test]
    fn test_get_option_group_by_key_alias_and_title() {
        let mut parser = OptParser::new();
        parser.add_option_group("Configuration options");
        assert!(parser.alias_group("configure options", "Configuration options"));

        assert!(parser.get_option_group("Configuration options").is_some());
        assert!(parser.get_option_group("configure options").is_some());
        assert!(parser.get_option_group("never created").is_none());
    }

    #[test]
    fn test_get_option_group_falls_back_to_title_scan() {
        let mut parser = OptParser::new();
        parser.add_option_group("Step options");
        // Shadow the index key so only the title scan can find the group.
        parser.group_index.shift_remove("Step options");
        assert!(parser.get_option_group("Step options").is_some());
    }

    #[test]
    fn test_alias_group_for_unknown_title() {
        let mut parser = OptParser::new();
        assert!(!parser.alias_group("alias", "no such group"));
    }

    #[test]
    fn test_reregistering_a_destination_overwrites() {
        let mut parser = OptParser::new();
        parser
            .add_option(string_opt("zones").help("first"))
            .unwrap();
        parser
            .add_option(string_opt("zones").help("second"))
            .unwrap();
        let merged = parser.merged();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged["zones"].1.help, "second");
    }

    #[test]
    fn test_top_level_registration_removes_grouped_duplicate() {
        let mut parser = OptParser::new();
        parser
            .add_option_group("Configuration options")
            .add_option(string_opt("prefix"))
            .unwrap();
        parser.add_option(string_opt("prefix")).unwrap();

        let group = parser.get_option_group("Configuration options").unwrap();
        assert!(!group.has_option("prefix"));
        assert_eq!(parser.merged().len(), 1);
    }

    #[test]
    fn test_choices_require_string_kind() {
        let spec = OptSpec::new("jobs", OptKind::Int)
            .default(OptValue::Int(1))
            .choices(["1", "2"]);
        let result = OptParser::new().add_option(spec);
        assert!(matches!(result, Err(Error::ChoicesOnNonString(_))));
    }

    #[test]
    fn test_default_must_be_a_choice() {
        let spec = string_opt("colors")
            .default(OptValue::Str("purple".to_string()))
            .choices(["yes", "no", "auto"]);
        let result = OptParser::new().add_option(spec);
        assert!(matches!(
            result,
            Err(Error::DefaultOutsideChoices { .. })
        ));
    }

    #[test]
    fn test_mismatched_default_kind_is_rejected() {
        let spec = OptSpec::new("force", OptKind::Flag).default(OptValue::Int(1));
        let result = OptParser::new().add_option(spec);
        assert!(matches!(result, Err(Error::WrongKind { .. })));
    }

    #[test]
    fn test_parsed_options_typed_getters() {
        let mut parsed = ParsedOptions::default();
        parsed.set("out", OptValue::Str("build".to_string()));
        parsed.set("jobs", OptValue::Int(4));
        parsed.set("verbose", OptValue::Count(2));
        parsed.set("force", OptValue::Flag(true));

        assert_eq!(parsed.str_value("out").unwrap(), "build");
        assert_eq!(parsed.int_value("jobs").unwrap(), 4);
        assert_eq!(parsed.count_value("verbose").unwrap(), 2);
        assert!(parsed.flag_value("force").unwrap());

        assert!(matches!(
            parsed.str_value("missing"),
            Err(Error::UnknownOption(_))
        ));
        assert!(matches!(
            parsed.int_value("out"),
            Err(Error::WrongKind { .. })
        ));
    }

    #[test]
    fn test_long_flag_derived_from_destination() {
        assert_eq!(string_opt("no_lock_in_run").long_flag(), "no-lock-in-run");
        assert_eq!(
            string_opt("progress_bar").long("progress").long_flag(),
            "progress"
        );
    }
}
