//! Help-text assembly.
//!
//! Command descriptions are contributed explicitly: the hosting driver
//! registers one entry per known command type, and the project script's
//! documented functions are registered on top. The composed table is
//! deterministic for identical registry contents.

use std::collections::BTreeMap;

use itertools::Itertools;

/// Hook names a project script may define that are not commands.
const RESERVED_HOOKS: &[&str] = &["options", "init", "shutdown"];

/// Registry of command-name to short-description entries for `--help`.
///
/// Entries are deduplicated by name (later registrations win) and kept
/// sorted by name.
#[derive(Debug, Clone, Default)]
pub struct CommandDocs {
    entries: BTreeMap<String, String>,
}

impl CommandDocs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command type. Nameless commands, the `options` command
    /// itself and internal commands (leading underscore) are skipped; an
    /// empty description is kept.
    pub fn register_command(&mut self, name: &str, doc: &str) {
        if name.is_empty() || name == "options" || name.starts_with('_') {
            return;
        }
        self.entries.insert(name.to_string(), summary(doc));
    }

    /// Registers a function exposed by the project script. Undocumented
    /// functions, reserved hook names and internal names are skipped.
    pub fn register_script_doc(&mut self, name: &str, doc: &str) {
        if doc.trim().is_empty() || RESERVED_HOOKS.contains(&name) {
            return;
        }
        if name.is_empty() || name.starts_with('_') {
            return;
        }
        self.entries.insert(name.to_string(), summary(doc));
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The "Main commands" section: one line per command, descriptions
    /// column-aligned to the longest name.
    pub fn command_table(&self, prog: &str) -> String {
        let just = self.entries.keys().map(String::len).max().unwrap_or(0);
        let table = self
            .entries
            .iter()
            .map(|(name, doc)| format!("  {name:<just$}: {doc}"))
            .join("\n");
        format!("Main commands (example: {prog} build -j4)\n{table}")
    }

    /// The full usage text: introductory banner plus the command table.
    pub fn compose(&self, prog: &str) -> String {
        format!(
            "{prog} [commands] [options]\n\n{}\n",
            self.command_table(prog)
        )
    }
}

fn summary(doc: &str) -> String {
    doc.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_and_reserved_names_are_excluded() {
        let mut docs = CommandDocs::new();
        docs.register_command("build", "builds the project");
        docs.register_command("clean", "cleans the project");
        docs.register_command("_internal", "not for the help text");
        docs.register_command("options", "the options command itself");
        docs.register_command("", "nameless");
        docs.register_script_doc("foo", "does foo things");
        docs.register_script_doc("init", "reserved hook");
        docs.register_script_doc("shutdown", "reserved hook");
        docs.register_script_doc("undocumented", "");
        docs.register_script_doc("_helper", "internal helper");

        let names: Vec<&str> = docs.names().collect();
        assert_eq!(names, vec!["build", "clean", "foo"]);
    }

    #[test]
    fn test_later_registration_wins() {
        let mut docs = CommandDocs::new();
        docs.register_command("dist", "creates an archive");
        docs.register_script_doc("dist", "creates a project-specific archive");
        assert_eq!(
            docs.command_table("mason"),
            "Main commands (example: mason build -j4)\n  dist: creates a project-specific archive"
        );
    }

    #[test]
    fn test_table_is_sorted_and_aligned() {
        let mut docs = CommandDocs::new();
        docs.register_command("install", "installs the targets");
        docs.register_command("build", "builds the project");
        docs.register_script_doc("foo", "does foo things");

        assert_eq!(
            docs.compose("mason"),
            "mason [commands] [options]\n\n\
             Main commands (example: mason build -j4)\n\
             \x20 build  : builds the project\n\
             \x20 foo    : does foo things\n\
             \x20 install: installs the targets\n"
        );
    }

    #[test]
    fn test_summary_uses_first_non_blank_line() {
        let mut docs = CommandDocs::new();
        docs.register_command("check", "\n\n  runs the tests\n  and more detail\n");
        assert_eq!(
            docs.command_table("mason"),
            "Main commands (example: mason build -j4)\n  check: runs the tests"
        );
    }

    #[test]
    fn test_empty_command_description_is_kept() {
        let mut docs = CommandDocs::new();
        docs.register_command("step", "");
        let names: Vec<&str> = docs.names().collect();
        assert_eq!(names, vec!["step"]);
        assert_eq!(
            docs.command_table("mason"),
            "Main commands (example: mason build -j4)\n  step: "
        );
    }

    #[test]
    fn test_composition_is_deterministic() {
        let mut docs = CommandDocs::new();
        docs.register_command("build", "builds the project");
        docs.register_command("clean", "cleans the project");
        assert_eq!(docs.compose("mason"), docs.compose("mason"));
    }
}
