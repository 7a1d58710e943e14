use crate::{
    commands::{
        command_error::CommandError, command_handler::CommandResult, parse_integer,
        stream_utils::stream_entries_to_resp,
    },
    resp::RespValue,
    state::ServerState,
    types::stream::{StreamId, parse_range_bound},
};

pub struct XrangeArguments {
    pub key: String,
    pub start: StreamId,
    pub end: StreamId,
    pub count: Option<usize>,
}

impl XrangeArguments {
    /// Parses `key start end [COUNT n]`. `-` and `+` stand for the smallest and largest
    /// IDs; a bare `ms` means `ms-0` as a start and `ms-<max>` as an end.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 3 {
            return Err(CommandError::WrongNumberOfArguments("xrange".into()));
        }

        let count = match &arguments[3..] {
            [] => None,
            [option, count] if option.eq_ignore_ascii_case("count") => {
                Some(parse_integer::<usize>(count)?)
            }
            _ => return Err(CommandError::Syntax),
        };

        Ok(Self {
            key: arguments[0].clone(),
            start: parse_range_bound(&arguments[1], true)?,
            end: parse_range_bound(&arguments[2], false)?,
            count,
        })
    }
}

pub async fn xrange(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let xrange_arguments = XrangeArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let Some(stream) = db.store.stream_mut(&xrange_arguments.key)? else {
        return Ok(CommandResult::Response(RespValue::Array(Vec::new())));
    };

    let entries = stream.range(
        xrange_arguments.start,
        xrange_arguments.end,
        xrange_arguments.count,
    );

    Ok(CommandResult::Response(stream_entries_to_resp(entries)))
}
