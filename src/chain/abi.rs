//! The two ABI shapes needed for `tokenURI(uint256) returns (string)`.

use crate::foundation::error::{CitizenError, CitizenResult};

/// `keccak256("tokenURI(uint256)")[..4]`.
pub const TOKEN_URI_SELECTOR: [u8; 4] = [0xc8, 0x7b, 0x56, 0xdd];

const WORD: usize = 32;

/// Calldata for `tokenURI(id)`, `0x`-prefixed hex.
pub fn encode_token_uri_call(id: u64) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&TOKEN_URI_SELECTOR);
    data.extend_from_slice(&[0u8; WORD - 8]);
    data.extend_from_slice(&id.to_be_bytes());
    format!("0x{}", hex::encode(data))
}

fn word_as_usize(word: &[u8]) -> CitizenResult<usize> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(CitizenError::chain("abi word does not fit in usize"));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(buf))
        .map_err(|_| CitizenError::chain("abi word does not fit in usize"))
}

fn word_at(data: &[u8], offset: usize) -> CitizenResult<&[u8]> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| CitizenError::chain("abi data truncated"))
}

/// Decode a single dynamic `string` return value from `0x`-prefixed hex.
pub fn decode_string_return(result: &str) -> CitizenResult<String> {
    let raw = result.strip_prefix("0x").unwrap_or(result);
    let data =
        hex::decode(raw).map_err(|e| CitizenError::chain(format!("call result is not hex: {e}")))?;
    if data.is_empty() {
        return Err(CitizenError::chain("empty call result"));
    }

    let offset = word_as_usize(word_at(&data, 0)?)?;
    let len = word_as_usize(word_at(&data, offset)?)?;
    let start = offset + WORD;
    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| CitizenError::chain("abi string truncated"))?;

    String::from_utf8(bytes.to_vec())
        .map_err(|e| CitizenError::chain(format!("abi string is not utf-8: {e}")))
}
