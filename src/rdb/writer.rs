use crate::rdb::encoding::{encode_length, encode_string};

const SNAPSHOT_HEADER: &[u8] = b"REDIS0011";

/// Encodes string entries `(key, value, expires_at)` as a version 11 snapshot.
///
/// The trailing checksum is written as eight zero bytes, which readers treat as
/// "checksum disabled".
pub fn encode_snapshot(entries: &[(&str, &str, u64)]) -> Vec<u8> {
    let mut out = SNAPSHOT_HEADER.to_vec();

    out.push(0xFA);
    encode_string("redis-ver", &mut out);
    encode_string("7.2.0", &mut out);
    out.push(0xFA);
    encode_string("redis-bits", &mut out);
    encode_string("64", &mut out);

    out.push(0xFE);
    encode_length(0, &mut out);
    out.push(0xFB);
    encode_length(entries.len(), &mut out);
    encode_length(
        entries.iter().filter(|(_, _, expires_at)| *expires_at != 0).count(),
        &mut out,
    );

    for (key, value, expires_at) in entries {
        if *expires_at != 0 {
            out.push(0xFC);
            out.extend_from_slice(&expires_at.to_le_bytes());
        }
        out.push(0x00);
        encode_string(key, &mut out);
        encode_string(value, &mut out);
    }

    out.push(0xFF);
    out.extend_from_slice(&[0; 8]);
    out
}
