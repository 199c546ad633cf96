use std::collections::HashMap;

use gator_logging::{gator_debug, gator_warn};

use crate::{Command, CommandError, SessionState};

/// A command implementation.
pub type Handler = Box<dyn Fn(&mut SessionState, &Command) -> Result<(), CommandError>>;

/// Maps command names to handlers. Built once at startup.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `name`, replacing any earlier binding.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut SessionState, &Command) -> Result<(), CommandError> + 'static,
    {
        let name = name.into();
        if self.handlers.insert(name.clone(), Box::new(handler)).is_some() {
            gator_warn!("handler for command {} was replaced", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves `command.name` and runs its handler.
    pub fn run(&self, state: &mut SessionState, command: &Command) -> Result<(), CommandError> {
        let handler = self
            .handlers
            .get(&command.name)
            .ok_or_else(|| CommandError::UnknownCommand(command.name.clone()))?;
        gator_debug!(
            "dispatching {} with {} argument(s)",
            command.name,
            command.args.len()
        );
        handler(state, command)
    }
}
