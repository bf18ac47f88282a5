// error.rs - Command error classification
// Commands report argument and permission problems as `BotError`. The framework
// hooks in main.rs turn any command failure into a user-facing message through
// `describe_failure`, so individual commands never format their own error text.

use serenity::framework::standard::{CommandError, DispatchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("bad argument: {0}")]
    BadArgument(&'static str),
    #[error("missing permission")]
    MissingPermission,
}

/// Broad category of a failed command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingArgument,
    BadArgument,
    MissingPermission,
    Other,
}

impl From<&BotError> for FailureKind {
    fn from(err: &BotError) -> Self {
        match err {
            BotError::MissingArgument(_) => FailureKind::MissingArgument,
            BotError::BadArgument(_) => FailureKind::BadArgument,
            BotError::MissingPermission => FailureKind::MissingPermission,
        }
    }
}

/// Classifies an error returned from a command body.
pub fn classify_command_error(err: &CommandError) -> FailureKind {
    err.downcast_ref::<BotError>()
        .map(FailureKind::from)
        .unwrap_or(FailureKind::Other)
}

/// Classifies a framework dispatch error; `None` means it should stay silent.
pub fn classify_dispatch_error(err: &DispatchError) -> Option<FailureKind> {
    match err {
        DispatchError::LackingPermissions(_) | DispatchError::LackingRole => {
            Some(FailureKind::MissingPermission)
        }
        DispatchError::NotEnoughArguments { .. } => Some(FailureKind::MissingArgument),
        DispatchError::TooManyArguments { .. } => Some(FailureKind::BadArgument),
        DispatchError::OnlyForGuilds => Some(FailureKind::Other),
        _ => None,
    }
}

/// Permission name shown to users for each gated command.
fn required_permission(command: &str) -> Option<&'static str> {
    match command {
        "setwelcome" | "setgoodbye" => Some("Manage Channels"),
        "kick" => Some("Kick Members"),
        "ban" => Some("Ban Members"),
        "mute" => Some("Manage Roles"),
        "clear" => Some("Manage Messages"),
        _ => None,
    }
}

fn missing_argument_hint(command: &str, prefix: &str) -> Option<String> {
    let text = match command {
        "setwelcome" => format!(
            "Please specify a channel and a message. Example: `{}setwelcome #general Welcome {{user}}!`",
            prefix
        ),
        "setgoodbye" => format!(
            "Please specify a channel and a message. Example: `{}setgoodbye #general Goodbye {{user}}.`",
            prefix
        ),
        "kick" => format!("Please specify the member to kick. Example: `{}kick @user spamming`", prefix),
        "ban" => format!("Please specify the member to ban. Example: `{}ban @user violating rules`", prefix),
        "mute" => format!(
            "Please specify the member to mute, duration, and optionally a reason. Example: `{}mute @user 30m spam`",
            prefix
        ),
        "clear" => format!("Please specify the number of messages to delete. Example: `{}clear 10`", prefix),
        "remindme" => format!(
            "Please specify a duration and a reminder message. Example: `{}remindme 1h Project deadline`",
            prefix
        ),
        "net_predict" => format!(
            "Please provide a photo URL. Example: `{}net_predict https://example.com/some_pc_part.jpg`",
            prefix
        ),
        "info" => format!("Please specify a PC part. Example: `{}info CPU`", prefix),
        "poll" => format!(
            "Please provide a question and options. Example: `{}poll \"Favorite part?\" \"CPU\" \"GPU\"`",
            prefix
        ),
        _ => return None,
    };
    Some(text)
}

fn bad_argument_hint(command: &str) -> Option<&'static str> {
    match command {
        "setwelcome" | "setgoodbye" => Some("Invalid channel. Please tag a valid text channel."),
        "kick" | "ban" | "mute" => Some("Invalid user. Please tag a valid user."),
        "clear" => Some("Invalid number. Please enter an integer."),
        _ => None,
    }
}

/// Maps a failure category to the message shown in the channel.
pub fn describe_failure(command: &str, kind: FailureKind, prefix: &str, detail: &str) -> String {
    let specific = match kind {
        FailureKind::MissingPermission => required_permission(command)
            .map(|perm| format!("You need '{}' permission to use this command.", perm)),
        FailureKind::MissingArgument => missing_argument_hint(command, prefix),
        FailureKind::BadArgument => bad_argument_hint(command).map(str::to_string),
        FailureKind::Other => None,
    };
    specific.unwrap_or_else(|| format!("An error occurred: {}", detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::permissions::Permissions;

    #[test]
    fn test_permission_messages() {
        assert_eq!(
            describe_failure("kick", FailureKind::MissingPermission, "$", ""),
            "You need 'Kick Members' permission to use this command."
        );
        assert_eq!(
            describe_failure("setgoodbye", FailureKind::MissingPermission, "$", ""),
            "You need 'Manage Channels' permission to use this command."
        );
    }

    #[test]
    fn test_missing_argument_uses_prefix() {
        let text = describe_failure("clear", FailureKind::MissingArgument, "!", "");
        assert_eq!(text, "Please specify the number of messages to delete. Example: `!clear 10`");
        let text = describe_failure("setwelcome", FailureKind::MissingArgument, "$", "");
        assert!(text.contains("`$setwelcome #general Welcome {user}!`"));
    }

    #[test]
    fn test_bad_argument_messages() {
        assert_eq!(
            describe_failure("mute", FailureKind::BadArgument, "$", ""),
            "Invalid user. Please tag a valid user."
        );
    }

    #[test]
    fn test_unknown_failures_are_echoed() {
        assert_eq!(
            describe_failure("quote", FailureKind::Other, "$", "boom"),
            "An error occurred: boom"
        );
        assert_eq!(
            describe_failure("hello", FailureKind::BadArgument, "$", "bad thing"),
            "An error occurred: bad thing"
        );
    }

    #[test]
    fn test_classifies_command_errors() {
        let err: CommandError = BotError::BadArgument("member").into();
        assert_eq!(classify_command_error(&err), FailureKind::BadArgument);

        let err: CommandError = "something else".into();
        assert_eq!(classify_command_error(&err), FailureKind::Other);
    }

    #[test]
    fn test_classifies_dispatch_errors() {
        let err = DispatchError::LackingPermissions(Permissions::KICK_MEMBERS);
        assert_eq!(classify_dispatch_error(&err), Some(FailureKind::MissingPermission));
        assert_eq!(classify_dispatch_error(&DispatchError::BlockedUser), None);
    }
}
