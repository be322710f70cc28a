//! Child process spawn configuration.

use std::path::{Path, PathBuf};

/// Configuration for spawning the external command.
///
/// The working directory and environment overlay are scoped to the child:
/// neither the parent's current directory nor its environment is mutated.
///
/// # Example
///
/// ```rust
/// use automigrate::SpawnConfig;
///
/// let config = SpawnConfig::new("pnpm")
///     .args(["payload", "migrate:create", "add-users"])
///     .current_dir("/srv/backend")
///     .env("NODE_ENV", "production");
/// ```
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    /// Program to execute.
    pub program: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// Working directory for the child.
    pub current_dir: PathBuf,

    /// Environment variables overlaid on the inherited environment,
    /// visible to the child only.
    pub env: Vec<(String, String)>,

    /// Copy child output to our stdout as it arrives.
    pub echo: bool,
}

impl SpawnConfig {
    /// Create a config for the given program, run from the current
    /// directory with no overlay.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: PathBuf::from("."),
            env: Vec::new(),
            echo: true,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the child's working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = dir.into();
        self
    }

    /// Add an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Enable or disable the stdout pass-through.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// The full command line, for logging.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// The child's working directory.
    pub fn dir(&self) -> &Path {
        &self.current_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = SpawnConfig::new("pnpm")
            .args(["payload", "migrate:create"])
            .arg("add-users")
            .current_dir("/tmp")
            .env("NODE_ENV", "production")
            .env("PAYLOAD_SECRET", "ignore")
            .echo(false);

        assert_eq!(config.program, "pnpm");
        assert_eq!(config.args, ["payload", "migrate:create", "add-users"]);
        assert_eq!(config.current_dir, PathBuf::from("/tmp"));
        assert_eq!(config.env.len(), 2);
        assert!(!config.echo);
    }

    #[test]
    fn test_command_line() {
        let config = SpawnConfig::new("pnpm").args(["payload", "migrate:create", "add-users"]);
        assert_eq!(config.command_line(), "pnpm payload migrate:create add-users");
    }
}
