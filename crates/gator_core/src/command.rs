use crate::CommandError;

/// One verb plus its arguments, built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a command from the words following the program name.
    ///
    /// The verb is matched case-insensitively, so it is lowercased here.
    /// Returns `None` when no verb was given.
    pub fn from_words(words: &[String]) -> Option<Self> {
        let (name, args) = words.split_first()?;
        Some(Self {
            name: name.to_lowercase(),
            args: args.to_vec(),
        })
    }

    /// Fails unless the command was given no arguments.
    pub fn expect_no_args(&self) -> Result<(), CommandError> {
        if self.args.is_empty() {
            Ok(())
        } else {
            Err(CommandError::Usage(format!(
                "{} command takes no arguments",
                self.name
            )))
        }
    }

    /// Returns the single non-blank argument naming a user.
    pub fn username(&self) -> Result<&str, CommandError> {
        match self.args.as_slice() {
            [] => Err(CommandError::Usage("a username is required".into())),
            [name] if name.trim().is_empty() => {
                Err(CommandError::Usage("a username is required".into()))
            }
            [name] => Ok(name.trim()),
            _ => Err(CommandError::Usage(format!(
                "{} command expects a single argument, the username",
                self.name
            ))),
        }
    }
}
