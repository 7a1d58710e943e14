use crate::{
    resp::RespValue,
    types::stream::{StreamFields, StreamId},
};

/// Converts stream entries to the RESP shape clients expect.
///
/// Each entry becomes a 2-element array: `[id, [field1, value1, field2, value2, ...]]`,
/// fields in the order they were added.
pub fn stream_entries_to_resp(entries: Vec<(StreamId, &StreamFields)>) -> RespValue {
    RespValue::Array(
        entries
            .into_iter()
            .map(|(id, fields)| {
                RespValue::Array(vec![
                    RespValue::BulkString(id.to_string()),
                    RespValue::array_of_bulk_strings(
                        fields
                            .iter()
                            .flat_map(|(field, value)| [field.clone(), value.clone()]),
                    ),
                ])
            })
            .collect(),
    )
}
