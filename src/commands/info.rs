use crate::{
    commands::{CommandError, CommandResult},
    resp::RespValue,
    state::ServerState,
};

enum InfoSection {
    Default,
    Replication,
}

pub struct InfoArguments {
    section: InfoSection,
}

impl InfoArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() > 1 {
            return Err(CommandError::Syntax);
        }

        let section = match arguments.first().map(|s| s.to_lowercase()).as_deref() {
            None | Some("all") | Some("default") => InfoSection::Default,
            Some("replication") => InfoSection::Replication,
            Some(_) => return Err(CommandError::Syntax),
        };

        Ok(InfoArguments { section })
    }
}

/// Only the replication section exists, so the default report is the same text.
pub async fn info(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let info_arguments = InfoArguments::parse(arguments)?;

    let mut replication = state.replication.lock().await;
    replication.prune_closed();

    let lines = [
        "# Replication".to_string(),
        format!("role:{}", state.role.as_info_str()),
        format!("connected_slaves:{}", replication.connected_replicas()),
        format!("master_replid:{}", replication.replication_id()),
        format!("master_repl_offset:{}", replication.offset()),
    ];

    let report = match info_arguments.section {
        InfoSection::Default | InfoSection::Replication => lines.join("\r\n"),
    };

    Ok(CommandResult::Response(RespValue::BulkString(report)))
}
