#[cfg(test)]
#[path = "command_test.rs"]
mod tests;

use std::path;

const FILE_PLACEHOLDER: &str = "{file}";

/// A user configured command line such as `afplay {file}`. Arguments are
/// split on whitespace, there is no shell quoting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Option<CommandTemplate> {
        let mut parts = template.split_whitespace().map(|e| return e.to_string());
        let program = parts.next()?;

        return Some(CommandTemplate {
            program,
            args: parts.collect(),
        });
    }

    /// Arguments with `{file}` replaced by `file`. When no argument mentions
    /// the placeholder the file is passed last.
    pub fn args_for(&self, file: &path::Path) -> Vec<String> {
        let file_str = file.to_string_lossy().to_string();
        let mut args = self
            .args
            .iter()
            .map(|e| return e.replace(FILE_PLACEHOLDER, &file_str))
            .collect::<Vec<String>>();

        if !self.args.iter().any(|e| return e.contains(FILE_PLACEHOLDER)) {
            args.push(file_str);
        }

        return args;
    }
}
