pub mod commands;

use std::time::Duration;

use clap::Parser;

use crate::app::{AppContext, Result, TributaryError};
use crate::domain::User;
use crate::scheduler;
use crate::session::Session;
use crate::store::Store;

#[derive(Parser)]
#[command(name = "tributary")]
#[command(about = "A multi-user CLI RSS feed aggregator", long_about = None)]
pub struct Cli {
    /// Command to run (register, login, agg, addfeed, browse, ...)
    pub command: String,

    /// Arguments for the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// The closed set of supported commands, parsed from raw `<command>
/// [args...]` input. Arity and shape are validated here; everything after
/// parse is typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register { name: String },
    Login { name: String },
    Reset,
    Users,
    Agg { interval: Duration },
    Feeds,
    AddFeed { name: String, url: String },
    Follow { url: String },
    Unfollow { url: String },
    Following,
    Browse { limit: i64 },
}

const AGG_USAGE: &str = "agg <interval: 1h, 30m, 90s, ...>";
const BROWSE_USAGE: &str = "browse [limit]";

impl Command {
    pub fn parse(name: &str, args: &[String]) -> Result<Self> {
        match name {
            "register" => match args {
                [name] => Ok(Self::Register { name: name.clone() }),
                _ => Err(TributaryError::Usage("register <name>")),
            },
            "login" => match args {
                [name] => Ok(Self::Login { name: name.clone() }),
                _ => Err(TributaryError::Usage("login <name>")),
            },
            "reset" => match args {
                [] => Ok(Self::Reset),
                _ => Err(TributaryError::Usage("reset")),
            },
            "users" => match args {
                [] => Ok(Self::Users),
                _ => Err(TributaryError::Usage("users")),
            },
            "agg" => match args {
                [interval] => scheduler::parse_interval(interval)
                    .map(|interval| Self::Agg { interval })
                    .map_err(|_| TributaryError::Usage(AGG_USAGE)),
                _ => Err(TributaryError::Usage(AGG_USAGE)),
            },
            "feeds" => match args {
                [] => Ok(Self::Feeds),
                _ => Err(TributaryError::Usage("feeds")),
            },
            "addfeed" => match args {
                [name, url] => Ok(Self::AddFeed {
                    name: name.clone(),
                    url: url.clone(),
                }),
                _ => Err(TributaryError::Usage("addfeed <name> <url>")),
            },
            "follow" => match args {
                [url] => Ok(Self::Follow { url: url.clone() }),
                _ => Err(TributaryError::Usage("follow <url>")),
            },
            "unfollow" => match args {
                [url] => Ok(Self::Unfollow { url: url.clone() }),
                _ => Err(TributaryError::Usage("unfollow <url>")),
            },
            "following" => match args {
                [] => Ok(Self::Following),
                _ => Err(TributaryError::Usage("following")),
            },
            "browse" => match args {
                [] => Ok(Self::Browse { limit: 2 }),
                [limit] => limit
                    .parse::<i64>()
                    .ok()
                    .filter(|n| *n > 0)
                    .map(|limit| Self::Browse { limit })
                    .ok_or(TributaryError::Usage(BROWSE_USAGE)),
                _ => Err(TributaryError::Usage(BROWSE_USAGE)),
            },
            other => Err(TributaryError::UnknownCommand(other.to_string())),
        }
    }
}

/// Resolve the session's current user against the store. Commands that
/// require identity run this first and never execute when it fails.
pub fn resolve_current_user(ctx: &AppContext, session: &Session) -> Result<User> {
    let name = session.current_user_name.as_deref().unwrap_or("");
    if name.is_empty() {
        return Err(TributaryError::NoSuchUser("(not logged in)".into()));
    }

    ctx.store
        .get_user(name)?
        .ok_or_else(|| TributaryError::NoSuchUser(name.to_string()))
}

/// Run one command to completion. Identity resolution is an explicit step
/// before the handler, not a wrapper around it; handler errors propagate
/// verbatim.
pub async fn dispatch(ctx: &AppContext, session: &mut Session, command: Command) -> Result<()> {
    match command {
        Command::Register { name } => commands::register(ctx, session, &name),
        Command::Login { name } => commands::login(ctx, session, &name),
        Command::Reset => commands::reset(ctx),
        Command::Users => commands::users(ctx, session),
        Command::Agg { interval } => commands::agg(ctx, interval).await,
        Command::Feeds => commands::feeds(ctx),
        Command::AddFeed { name, url } => {
            let user = resolve_current_user(ctx, session)?;
            commands::add_feed(ctx, &user, &name, &url)
        }
        Command::Follow { url } => {
            let user = resolve_current_user(ctx, session)?;
            commands::follow(ctx, &user, &url)
        }
        Command::Unfollow { url } => {
            let user = resolve_current_user(ctx, session)?;
            commands::unfollow(ctx, &user, &url)
        }
        Command::Following => {
            let user = resolve_current_user(ctx, session)?;
            commands::following(ctx, &user)
        }
        Command::Browse { limit } => {
            let user = resolve_current_user(ctx, session)?;
            commands::browse(ctx, &user, limit)
        }
    }
}
