use crate::{
    auth::AclRuleError,
    client::ClientSession,
    commands::{CommandError, CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub enum AclArguments {
    WhoAmI,
    GetUser(String),
    SetUser { username: String, rules: Vec<String> },
}

impl AclArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let Some((subcommand, rest)) = arguments.split_first() else {
            return Err(CommandError::WrongNumberOfArguments("acl".into()));
        };

        match (subcommand.to_uppercase().as_str(), rest) {
            ("WHOAMI", []) => Ok(Self::WhoAmI),
            ("GETUSER", [username]) => Ok(Self::GetUser(username.clone())),
            ("SETUSER", [username, rules @ ..]) => Ok(Self::SetUser {
                username: username.clone(),
                rules: rules.to_vec(),
            }),
            ("WHOAMI" | "GETUSER" | "SETUSER", _) => Err(CommandError::WrongNumberOfArguments(
                format!("acl|{}", subcommand.to_lowercase()),
            )),
            _ => Err(CommandError::UnknownAclSubcommand(subcommand.clone())),
        }
    }
}

/// `ACL WHOAMI`, `ACL GETUSER user` and `ACL SETUSER user [>password | nopass ...]`.
///
/// GETUSER replies with `["flags", [...], "passwords", [sha256 hex digests...]]`, or
/// null for an unknown user.
pub async fn acl(
    state: &ServerState,
    session: &ClientSession,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    let reply = match AclArguments::parse(arguments)? {
        AclArguments::WhoAmI => RespValue::BulkString(session.user.clone()),
        AclArguments::GetUser(username) => match state.users.lock().await.get(&username) {
            Some(user) => RespValue::Array(vec![
                RespValue::bulk("flags"),
                RespValue::array_of_bulk_strings(user.flags.iter().cloned()),
                RespValue::bulk("passwords"),
                RespValue::array_of_bulk_strings(user.passwords.iter().cloned()),
            ]),
            None => RespValue::Null,
        },
        AclArguments::SetUser { username, rules } => {
            state
                .users
                .lock()
                .await
                .set_user(&username, &rules)
                .map_err(|AclRuleError::UnknownRule(rule)| CommandError::InvalidAclRule(rule))?;
            RespValue::ok()
        }
    };

    Ok(CommandResult::Response(reply))
}
