//! Token-aware value skimming over raw JSON bytes.
//!
//! Everything here advances byte offsets past one JSON value without parsing
//! it into a value model. The skimmer is structure-aware but non-validating:
//! it assumes well-formed input beyond the bytes it actually touches.

use crate::error::SliceError;
use memchr::memchr2;

/// Half-open byte range into the input.
pub(crate) type Span = (usize, usize);

/// Skip whitespace and commas starting at `i`.
///
/// Commas count as whitespace so callers can walk across array element
/// boundaries with the same loop they use inside a value.
#[inline]
pub(crate) fn skip_spaces(buf: &[u8], mut i: usize) -> usize {
    while i < buf.len() {
        match buf[i] {
            b' ' | b'\t' | b'\r' | b'\n' | b',' => i += 1,
            _ => break,
        }
    }
    i
}

/// Skip one JSON string starting at the opening quote at `i`.
///
/// Returns the offset just past the closing quote. A backslash escapes the
/// byte after it, so `\"` does not terminate the string.
pub(crate) fn skip_string(buf: &[u8], i: usize) -> Result<usize, SliceError> {
    debug_assert_eq!(buf.get(i), Some(&b'"'));
    let mut j = i + 1;
    loop {
        // Fast scan to the next quote or backslash
        match memchr2(b'"', b'\\', &buf[j..]) {
            Some(p) => {
                let at = j + p;
                if buf[at] == b'"' {
                    return Ok(at + 1);
                }
                // escape: the next byte is literal, whatever it is
                j = at + 2;
                if j > buf.len() {
                    return Err(SliceError::UnexpectedEnd);
                }
            }
            None => return Err(SliceError::UnexpectedEnd),
        }
    }
}

/// Skip a number starting at `i`: `[0-9+\-.eE]` consumed greedily, no
/// structural validation.
#[inline]
pub(crate) fn skip_number(buf: &[u8], mut i: usize) -> usize {
    while i < buf.len() {
        match buf[i] {
            b'0'..=b'9' | b'.' | b'-' | b'+' | b'e' | b'E' => i += 1,
            _ => break,
        }
    }
    i
}

/// Skip a balanced `{...}` or `[...]` starting at `i`, respecting string
/// interiors and the one-byte escape rule.
pub(crate) fn skip_object(buf: &[u8], i: usize) -> Result<usize, SliceError> {
    debug_assert!(matches!(buf.get(i), Some(b'{') | Some(b'[')));
    let mut depth = 1usize;
    let mut j = i + 1;
    while j < buf.len() {
        match buf[j] {
            b'"' => {
                j = skip_string(buf, j)?;
                continue;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(j + 1);
                }
            }
            _ => {}
        }
        j += 1;
    }
    Err(SliceError::UnexpectedEnd)
}

/// Skip one JSON value starting at or after `i` (leading whitespace and
/// commas allowed). Returns the offset just past the value.
pub(crate) fn skip_value(buf: &[u8], i: usize) -> Result<usize, SliceError> {
    let i = skip_spaces(buf, i);
    let Some(&b) = buf.get(i) else {
        return Err(SliceError::UnexpectedEnd);
    };
    match b {
        b'"' => skip_string(buf, i),
        b'{' | b'[' => skip_object(buf, i),
        b'0'..=b'9' | b'-' | b'.' => Ok(skip_number(buf, i)),
        _ => skip_literal(buf, i),
    }
}

// Bare tokens: only true/false/null are recognized.
fn skip_literal(buf: &[u8], i: usize) -> Result<usize, SliceError> {
    for lit in [&b"true"[..], b"false", b"null"] {
        if buf[i..].starts_with(lit) {
            return Ok(i + lit.len());
        }
    }
    Err(SliceError::UnrecognizedValue)
}

/// After an object key string ending at `i`, seek to the start of its value:
/// skip whitespace, require `:`, skip whitespace again.
pub(crate) fn seek_to_value(buf: &[u8], i: usize) -> Result<usize, SliceError> {
    let i = skip_spaces(buf, i);
    if buf.get(i) != Some(&b':') {
        return Err(SliceError::ColonExpected);
    }
    Ok(skip_spaces(buf, i + 1))
}

/// Collect the span of every element of the array opening at `i`.
pub(crate) fn scan_elements(buf: &[u8], i: usize) -> Result<Vec<Span>, SliceError> {
    debug_assert_eq!(buf.get(i), Some(&b'['));
    let mut spans = Vec::new();
    let mut j = skip_spaces(buf, i + 1);
    loop {
        match buf.get(j) {
            None => return Err(SliceError::UnexpectedEnd),
            Some(b']') => return Ok(spans),
            Some(_) => {
                let end = skip_value(buf, j)?;
                spans.push((j, end));
                j = skip_spaces(buf, end);
            }
        }
    }
}

/// Advance across elements of the array opening at `i` until `idx` and
/// return that element's span, without collecting the rest.
pub(crate) fn nth_element(buf: &[u8], i: usize, idx: usize) -> Result<Span, SliceError> {
    debug_assert_eq!(buf.get(i), Some(&b'['));
    let mut j = skip_spaces(buf, i + 1);
    let mut n = 0usize;
    loop {
        match buf.get(j) {
            None => return Err(SliceError::UnexpectedEnd),
            Some(b']') => return Err(SliceError::ArrayElementNotFound),
            Some(_) => {
                let end = skip_value(buf, j)?;
                if n == idx {
                    return Ok((j, end));
                }
                n += 1;
                j = skip_spaces(buf, end);
            }
        }
    }
}
