//! Request/response framing around the argument list: `{func_id, argc,
//! args...}` for a request, `{func_id|0x80, argc, err_code, args...}` for a
//! response.

use crate::args::{decode_args, encode_arg, validate_argc, ArgSchema, ArgView};
use crate::error::{DlpError, DlpErrorCode, Result};

/// Bit set on a response's function id to distinguish it from the request
/// that produced it.
pub const RESPONSE_BIT: u8 = 0x80;

/// A decoded request: its function id and the raw argument views that
/// followed it, still borrowed from the original buffer.
#[derive(Debug, Clone)]
pub struct RequestView<'a> {
    pub func_id: u8,
    pub args: Vec<ArgView<'a>>,
}

/// A decoded response: its function id (with [`RESPONSE_BIT`] stripped),
/// status, and arguments. `args` is only ever non-empty when `error` is
/// [`DlpErrorCode::None`].
#[derive(Debug, Clone)]
pub struct ResponseView<'a> {
    pub func_id: u8,
    pub error: DlpErrorCode,
    pub args: Vec<ArgView<'a>>,
}

pub fn encode_request(func_id: u8, arg_groups: &[(u8, &[u8])]) -> Result<Vec<u8>> {
    let mut out = vec![func_id, arg_groups.len() as u8];
    for (arg_id, data) in arg_groups {
        encode_arg(&mut out, *arg_id, data)?;
    }
    Ok(out)
}

/// Decodes a request, rejecting a frame that carries fewer argument groups
/// than `schema` declares required.
pub fn decode_request(buf: &[u8], schema: ArgSchema) -> Result<RequestView<'_>> {
    if buf.len() < 2 {
        return Err(DlpError::Truncated);
    }
    let func_id = buf[0];
    let argc = buf[1];
    validate_argc(argc, schema)?;
    let args = decode_args(&buf[2..], argc as usize)?;
    Ok(RequestView { func_id, args })
}

pub fn encode_response(func_id: u8, error: DlpErrorCode, arg_groups: &[(u8, &[u8])]) -> Result<Vec<u8>> {
    if !error.is_success() && !arg_groups.is_empty() {
        return Err(DlpError::ErrorWithArgs(error));
    }
    let mut out = vec![func_id | RESPONSE_BIT, arg_groups.len() as u8];
    out.extend_from_slice(&error.code().to_be_bytes());
    for (arg_id, data) in arg_groups {
        encode_arg(&mut out, *arg_id, data)?;
    }
    Ok(out)
}

/// Decodes a response and checks it against `expected_func_id`, applying
/// the protocol's framing rules: a function id mismatch is
/// [`DlpError::ProtocolMismatch`], a non-zero error code carrying
/// arguments is rejected outright, and a successful response carrying
/// fewer argument groups than `schema` declares required is rejected as
/// [`DlpError::ArgCountMismatch`].
pub fn decode_response<'a>(buf: &'a [u8], expected_func_id: u8, schema: ArgSchema) -> Result<ResponseView<'a>> {
    if buf.len() < 4 {
        return Err(DlpError::Truncated);
    }
    let got_func_id = buf[0] & !RESPONSE_BIT;
    if got_func_id != expected_func_id {
        return Err(DlpError::ProtocolMismatch { expected: expected_func_id, got: got_func_id });
    }
    let argc = buf[1];
    let code = u16::from_be_bytes([buf[2], buf[3]]);
    let error = DlpErrorCode::from_u16(code).ok_or(DlpError::UnknownErrorCode(code))?;
    if !error.is_success() && argc != 0 {
        return Err(DlpError::ErrorWithArgs(error));
    }
    if error.is_success() {
        validate_argc(argc, schema)?;
    }
    let args = decode_args(&buf[4..], argc as usize)?;
    Ok(ResponseView { func_id: got_func_id, error, args })
}

/// Checks that a decoded argument group has exactly `expected` fields
/// packed into one argument's data (used by commands whose argument is
/// itself a fixed-size record), returning [`DlpError::ArgShapeMismatch`]
/// otherwise.
pub fn require_len(data: &[u8], expected: usize) -> Result<()> {
    if data.len() != expected {
        return Err(DlpError::ArgShapeMismatch { expected, got: data.len() });
    }
    Ok(())
}

/// Checks that a decoded argument group has at least `minimum` bytes
/// (used by commands whose argument is a fixed header followed by a
/// variable-length tail, e.g. a record header plus its data).
pub fn require_min_len(data: &[u8], minimum: usize) -> Result<()> {
    if data.len() < minimum {
        return Err(DlpError::Truncated);
    }
    Ok(())
}

/// Appends `s` as a null-terminated string, the form Palm database and
/// file names travel in.
pub fn encode_cstr(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

/// Reads a null-terminated string starting at `data[0]`, returning it and
/// the number of bytes consumed (including the terminator).
pub fn decode_cstr(data: &[u8]) -> Result<(String, usize)> {
    let end = data.iter().position(|&b| b == 0).ok_or(DlpError::Truncated)?;
    Ok((String::from_utf8_lossy(&data[..end]).into_owned(), end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_with_two_fields_round_trips_like_the_wire_example() {
        // func_id, argc=2, {0x20, len=1, byte}, {0x21 short-class, len=300, data}
        let byte = [0x42u8];
        let payload = vec![0xAAu8; 300];
        let encoded = encode_request(0x20, &[(0x20, &byte), (0x21, &payload)]).unwrap();
        let decoded = decode_request(&encoded, ArgSchema::fixed(2)).unwrap();
        assert_eq!(decoded.func_id, 0x20);
        assert_eq!(decoded.args.len(), 2);
        assert_eq!(decoded.args[0].data, &byte);
        assert_eq!(decoded.args[1].data, payload.as_slice());
    }

    #[test]
    fn request_below_required_arg_count_is_rejected() {
        let encoded = encode_request(0x20, &[(0x20, b"x")]).unwrap();
        let err = decode_request(&encoded, ArgSchema::fixed(2)).unwrap_err();
        assert!(matches!(err, DlpError::ArgCountMismatch { required: 2, got: 1 }));
    }

    #[test]
    fn request_with_omitted_optional_arg_is_accepted() {
        let encoded = encode_request(0x20, &[(0x20, b"x")]).unwrap();
        assert!(decode_request(&encoded, ArgSchema::with_optional(1, 1)).is_ok());
    }

    #[test]
    fn response_func_id_mismatch_is_rejected() {
        let encoded = encode_response(0x20, DlpErrorCode::None, &[]).unwrap();
        let err = decode_response(&encoded, 0x21, ArgSchema::EMPTY).unwrap_err();
        assert!(matches!(err, DlpError::ProtocolMismatch { expected: 0x21, got: 0x20 }));
    }

    #[test]
    fn error_response_cannot_carry_arguments() {
        let err = encode_response(0x20, DlpErrorCode::Param, &[(0x20, b"x")]).unwrap_err();
        assert!(matches!(err, DlpError::ErrorWithArgs(DlpErrorCode::Param)));
    }

    #[test]
    fn successful_response_round_trips() {
        let encoded = encode_response(0x12, DlpErrorCode::None, &[(0x20, b"hi")]).unwrap();
        let decoded = decode_response(&encoded, 0x12, ArgSchema::fixed(1)).unwrap();
        assert_eq!(decoded.error, DlpErrorCode::None);
        assert_eq!(decoded.args[0].data, b"hi");
    }

    #[test]
    fn successful_response_below_required_arg_count_is_rejected() {
        let encoded = encode_response(0x12, DlpErrorCode::None, &[(0x20, b"hi")]).unwrap();
        let err = decode_response(&encoded, 0x12, ArgSchema::fixed(2)).unwrap_err();
        assert!(matches!(err, DlpError::ArgCountMismatch { required: 2, got: 1 }));
    }
}
