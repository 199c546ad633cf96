//! Command handlers and the registry that binds them to names.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use gator_core::{Command, CommandError, CommandRegistry, NewUser, SessionState};
use gator_engine::{Feed, FeedEngine, FetchContext, FetchError};
use gator_logging::{gator_debug, gator_info};

pub const DEFAULT_FEED_URL: &str = "https://www.wagslane.dev/index.xml";

/// Settings for the `agg` command.
#[derive(Debug, Clone)]
pub struct AggOptions {
    /// Feed fetched when `agg` is given no URLs.
    pub default_feed_url: String,
    /// Deadline shared by every fetch of one `agg` run.
    pub timeout: Duration,
}

impl Default for AggOptions {
    fn default() -> Self {
        Self {
            default_feed_url: DEFAULT_FEED_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Registers every built-in command.
pub fn build_registry(engine: FeedEngine, agg: AggOptions) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register("login", handler_login);
    registry.register("register", handler_register);
    registry.register("reset", handler_reset);
    registry.register("users", handler_users);
    registry.register("agg", move |state, cmd| handler_agg(state, cmd, &engine, &agg));
    registry
}

pub fn handler_login(state: &mut SessionState, cmd: &Command) -> Result<(), CommandError> {
    let name = cmd.username()?;
    let user = state
        .repository()
        .get_user(name)
        .map_err(|err| CommandError::repository("error fetching user", err))?;
    if user.is_none() {
        return Err(CommandError::AccountNotFound(name.to_string()));
    }
    state
        .set_current_user(name)
        .map_err(|err| CommandError::config("error setting current user", err))?;
    writeln!(state.out(), "Logged in as {name}")?;
    Ok(())
}

pub fn handler_register(state: &mut SessionState, cmd: &Command) -> Result<(), CommandError> {
    let name = cmd.username()?;
    let user = state
        .repository()
        .create_user(NewUser::named(name))
        .map_err(|err| CommandError::repository("error registering user", err))?;
    state
        .set_current_user(&user.name)
        .map_err(|err| CommandError::config("error setting current user", err))?;
    gator_info!("registered user {} ({})", user.name, user.id);
    writeln!(
        state.out(),
        "User created: {} (id {}, created {})",
        user.name,
        user.id,
        user.created_at.to_rfc3339()
    )?;
    Ok(())
}

pub fn handler_reset(state: &mut SessionState, cmd: &Command) -> Result<(), CommandError> {
    cmd.expect_no_args()?;
    state
        .repository()
        .reset_users()
        .map_err(|err| CommandError::repository("error resetting users table", err))?;
    writeln!(state.out(), "Reset successful!")?;
    Ok(())
}

pub fn handler_users(state: &mut SessionState, cmd: &Command) -> Result<(), CommandError> {
    cmd.expect_no_args()?;
    let users = state
        .repository()
        .list_users()
        .map_err(|err| CommandError::repository("error fetching users", err))?;
    let current = state.config().current_user_name.clone();
    let out = state.out();
    for user in users {
        if user.name == current {
            writeln!(out, "* {} (current)", user.name)?;
        } else {
            writeln!(out, "* {}", user.name)?;
        }
    }
    Ok(())
}

/// Fetches the default feed, or every URL given, and prints each feed.
///
/// Successful feeds are printed even when others fail; the command then
/// fails naming every feed that could not be fetched.
pub fn handler_agg(
    state: &mut SessionState,
    cmd: &Command,
    engine: &FeedEngine,
    options: &AggOptions,
) -> Result<(), CommandError> {
    let urls = if cmd.args.is_empty() {
        vec![options.default_feed_url.clone()]
    } else {
        cmd.args.clone()
    };
    let ctx = FetchContext::with_timeout(options.timeout);
    let results = engine.fetch_all_blocking(&ctx, &urls);

    let mut failures = Vec::new();
    for (url, result) in results {
        match result {
            Ok(feed) => {
                gator_debug!("printing {} with {} item(s)", url, feed.items.len());
                write_feed(state.out(), &feed)?;
            }
            Err(err) => failures.push((url, err)),
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    let total = urls.len();
    let source: Box<dyn std::error::Error + Send + Sync> = if total == 1 && failures.len() == 1 {
        let (_, err) = failures.remove(0);
        Box::new(err)
    } else {
        Box::new(FeedFailures { failures, total })
    };
    Err(CommandError::Fetch {
        context: "error fetching rss feed".to_string(),
        source,
    })
}

/// Several feeds of one `agg` run failed.
#[derive(Debug)]
pub struct FeedFailures {
    pub failures: Vec<(String, FetchError)>,
    pub total: usize,
}

impl fmt::Display for FeedFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} feeds failed", self.failures.len(), self.total)?;
        for (url, err) in &self.failures {
            write!(f, "; {url}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FeedFailures {}

/// Human-readable dump of one feed.
pub fn write_feed(out: &mut dyn Write, feed: &Feed) -> io::Result<()> {
    writeln!(out, "Feed: {}", feed.title)?;
    writeln!(out, "Link: {}", feed.link)?;
    writeln!(out, "Description: {}", feed.description)?;
    writeln!(out, "Items: {}", feed.items.len())?;
    for item in &feed.items {
        writeln!(out)?;
        writeln!(out, "- {}", item.title)?;
        writeln!(out, "  Link: {}", item.link)?;
        if !item.published_at.is_empty() {
            writeln!(out, "  Published: {}", item.published_at)?;
        }
        if !item.description.is_empty() {
            writeln!(out, "  {}", item.description)?;
        }
    }
    Ok(())
}
