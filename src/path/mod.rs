//! Path compilation: query text to a linked chain of step nodes.

pub(crate) mod filter;

use crate::error::SliceError;
use filter::FilterExpr;
use log::trace;

pub(crate) type Flags = u8;

/// Step carries an array operation (index, range, list or filter).
pub(crate) const F_ARRAY: Flags = 1 << 0;
/// The array operation is a `[a:b]` range.
pub(crate) const F_RANGED: Flags = 1 << 1;
/// Last step of the chain.
pub(crate) const F_TERMINAL: Flags = 1 << 2;
/// Step is a function call (`length()`, `count()`, `size()`).
pub(crate) const F_FUNCTION: Flags = 1 << 3;
/// Step's successor is a function; this step furnishes its argument.
pub(crate) const F_SUBJECT: Flags = 1 << 4;
/// Step output is an array synthesized from multiple input fragments.
pub(crate) const F_AGGREGATING: Flags = 1 << 5;

/// One segment of a compiled path.
///
/// A step named by `key` may additionally carry one array operation; bracket
/// segments that follow another bracket get their own step with an empty key.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Step {
    pub(crate) key: Vec<u8>,
    pub(crate) keys: Vec<Vec<u8>>,
    pub(crate) flags: Flags,
    pub(crate) left: i32,
    /// `None` means "to the end"; `Some(0)` is the explicit empty slice.
    pub(crate) right: Option<i32>,
    pub(crate) elems: Vec<i32>,
    pub(crate) filter: Option<FilterExpr>,
    pub(crate) next: Option<Box<Step>>,
}

impl Step {
    #[inline]
    pub(crate) fn is(&self, f: Flags) -> bool {
        self.flags & f != 0
    }

    /// `$`, `@` or the empty key: the step operates on the current value
    /// without an object lookup.
    #[inline]
    pub(crate) fn is_sigil(&self) -> bool {
        matches!(self.key.as_slice(), b"" | b"$" | b"@")
    }

    #[inline]
    pub(crate) fn has_array_op(&self) -> bool {
        self.is(F_ARRAY) || self.filter.is_some()
    }
}

/// Compile a full query. The query must begin with `$` and be consumed to
/// its last byte.
pub(crate) fn parse_path(path: &[u8]) -> Result<Box<Step>, SliceError> {
    if path.is_empty() {
        return Err(SliceError::PathEmpty);
    }
    if path[0] != b'$' {
        return Err(SliceError::PathRootExpected(0));
    }
    let mut i = 1usize;
    let chain = parse_chain(path, &mut i, b'$')?;
    if i != path.len() {
        return Err(SliceError::PathInvalidReference(i));
    }
    Ok(chain)
}

/// Parse a chain of steps starting after the root sigil at `*i`. Stops at
/// the first byte that cannot begin a segment, which lets filter expressions
/// reuse this for `@`/`$` sub-paths.
pub(crate) fn parse_chain(
    path: &[u8],
    i: &mut usize,
    sigil: u8,
) -> Result<Box<Step>, SliceError> {
    let mut steps: Vec<Step> = vec![Step {
        key: vec![sigil],
        ..Step::default()
    }];
    loop {
        match path.get(*i) {
            Some(b'.') => {
                if path.get(*i + 1) == Some(&b'.') {
                    // recursive descent is not supported
                    return Err(SliceError::PathInvalidReference(*i + 1));
                }
                *i += 1;
                let mut step = Step::default();
                if path.get(*i) == Some(&b'*') {
                    *i += 1;
                    step.key = b"*".to_vec();
                    steps.push(step);
                    continue;
                }
                let start = *i;
                let key = read_key(path, i);
                if key.is_empty() {
                    return Err(SliceError::PathUnexpectedEnd(*i));
                }
                if path.get(*i) == Some(&b'(') {
                    let func = parse_function_call(path, i, key, start)?;
                    if let Some(prev) = steps.last_mut() {
                        prev.flags |= F_SUBJECT;
                    }
                    steps.push(func);
                    // a function ends the chain: its result is a scalar
                    if matches!(path.get(*i), Some(b'.') | Some(b'[')) {
                        return Err(SliceError::PathInvalidReference(*i));
                    }
                    break;
                }
                step.key = key.to_vec();
                if path.get(*i) == Some(&b'[') {
                    parse_bracket(path, i, &mut step)?;
                }
                steps.push(step);
            }
            Some(b'[') => {
                let mut step = Step::default();
                parse_bracket(path, i, &mut step)?;
                steps.push(step);
            }
            _ => break,
        }
    }
    trace!("compiled chain of {} steps", steps.len());

    let mut tail = steps.pop().ok_or(SliceError::PathEmpty)?;
    tail.flags |= F_TERMINAL;
    let mut chain = Box::new(tail);
    while let Some(mut s) = steps.pop() {
        s.next = Some(chain);
        chain = Box::new(s);
    }
    Ok(chain)
}

// An identifier runs until whitespace or a structural/operator byte.
fn read_key<'a>(path: &'a [u8], i: &mut usize) -> &'a [u8] {
    let start = *i;
    while let Some(&b) = path.get(*i) {
        match b {
            b' ' | b'\t' | b'.' | b'[' | b'(' | b')' | b']' | b'<' | b'=' | b'>' | b'+'
            | b'-' | b'*' | b'/' | b'&' | b'|' => break,
            _ => *i += 1,
        }
    }
    &path[start..*i]
}

fn parse_function_call(
    path: &[u8],
    i: &mut usize,
    name: &[u8],
    start: usize,
) -> Result<Step, SliceError> {
    let known = [&b"length"[..], b"count", b"size"]
        .iter()
        .any(|f| name.eq_ignore_ascii_case(f));
    if !known {
        return Err(SliceError::PathUnknownFunction(start));
    }
    match path.get(*i + 1) {
        Some(b')') => *i += 2,
        None => return Err(SliceError::PathUnexpectedEnd(path.len())),
        Some(_) => return Err(SliceError::PathInvalidReference(*i + 1)),
    }
    Ok(Step {
        key: name.to_ascii_lowercase(),
        flags: F_FUNCTION,
        ..Step::default()
    })
}

#[inline]
fn skip_blank(path: &[u8], i: &mut usize) {
    while matches!(path.get(*i), Some(b' ') | Some(b'\t')) {
        *i += 1;
    }
}

/// Parse one `[...]` group into `step`. The leading byte inside the bracket
/// selects the form: a quote starts a key list, `?(` a filter, anything else
/// an integer expression.
fn parse_bracket(path: &[u8], i: &mut usize, step: &mut Step) -> Result<(), SliceError> {
    debug_assert_eq!(path.get(*i), Some(&b'['));
    let open = *i;
    *i += 1;
    skip_blank(path, i);
    match path.get(*i) {
        None => Err(SliceError::PathUnexpectedEnd(path.len())),
        Some(b'\'') | Some(b'"') => parse_key_list(path, i, open, step),
        Some(b'?') => {
            if path.get(*i + 1) != Some(&b'(') {
                return Err(SliceError::PathInvalidReference(*i + 1));
            }
            *i += 2;
            let expr = filter::parse_filter(path, i)?;
            skip_blank(path, i);
            match path.get(*i) {
                Some(b']') => {
                    *i += 1;
                    step.filter = Some(expr);
                    step.flags |= F_ARRAY | F_AGGREGATING;
                    Ok(())
                }
                None => Err(SliceError::PathUnexpectedEnd(path.len())),
                Some(_) => Err(SliceError::UnknownToken(*i)),
            }
        }
        Some(_) => parse_index_forms(path, i, open, step),
    }
}

fn parse_key_list(
    path: &[u8],
    i: &mut usize,
    open: usize,
    step: &mut Step,
) -> Result<(), SliceError> {
    let mut keys: Vec<Vec<u8>> = Vec::new();
    loop {
        skip_blank(path, i);
        let q = match path.get(*i).copied() {
            Some(q @ (b'\'' | b'"')) => q,
            Some(_) => return Err(SliceError::PathKeyListTerminated(*i)),
            None => return Err(SliceError::PathKeyListTerminated(open)),
        };
        let start = *i + 1;
        let mut j = start;
        loop {
            match path.get(j) {
                None => return Err(SliceError::PathKeyListTerminated(open)),
                Some(&b) if b == q => break,
                Some(_) => j += 1,
            }
        }
        keys.push(path[start..j].to_vec());
        *i = j + 1;
        skip_blank(path, i);
        match path.get(*i) {
            Some(b',') => *i += 1,
            Some(b']') => {
                *i += 1;
                break;
            }
            None => return Err(SliceError::PathKeyListTerminated(open)),
            Some(_) => return Err(SliceError::PathKeyListTerminated(*i)),
        }
    }
    if keys.len() > 1 {
        step.flags |= F_AGGREGATING;
    }
    step.keys = keys;
    Ok(())
}

fn parse_index_forms(
    path: &[u8],
    i: &mut usize,
    open: usize,
    step: &mut Step,
) -> Result<(), SliceError> {
    let a = parse_bound(path, i)?;
    skip_blank(path, i);
    match path.get(*i) {
        Some(b':') => {
            *i += 1;
            skip_blank(path, i);
            let b = parse_bound(path, i)?;
            skip_blank(path, i);
            match path.get(*i) {
                Some(b']') => *i += 1,
                None => return Err(SliceError::PathUnexpectedEnd(path.len())),
                Some(_) => return Err(SliceError::PathInvalidReference(*i)),
            }
            // "[a:0]" with an explicit positive left bound selects nothing
            // forwards; only "[:0]" (and "[0:0]") mean the empty slice
            if b == Some(0) {
                if let Some(av) = a {
                    if av > 0 {
                        return Err(SliceError::PathIndexNonsense(open + 1));
                    }
                }
            }
            step.left = a.unwrap_or(0);
            step.right = b;
            step.flags |= F_ARRAY | F_RANGED | F_AGGREGATING;
            Ok(())
        }
        Some(b',') => {
            let first = match a {
                Some(v) => v,
                None => return Err(SliceError::PathIndexBoundMissing(*i)),
            };
            let mut elems = vec![first];
            while path.get(*i) == Some(&b',') {
                *i += 1;
                skip_blank(path, i);
                match parse_bound(path, i)? {
                    Some(v) => elems.push(v),
                    None => return Err(SliceError::PathIndexBoundMissing(*i)),
                }
                skip_blank(path, i);
            }
            match path.get(*i) {
                Some(b']') => *i += 1,
                None => return Err(SliceError::PathUnexpectedEnd(path.len())),
                Some(_) => return Err(SliceError::PathInvalidReference(*i)),
            }
            step.elems = elems;
            step.flags |= F_ARRAY | F_AGGREGATING;
            Ok(())
        }
        Some(b']') => {
            *i += 1;
            match a {
                Some(v) => {
                    step.left = v;
                    step.flags |= F_ARRAY;
                    Ok(())
                }
                None => Err(SliceError::PathIndexBoundMissing(*i - 1)),
            }
        }
        None => Err(SliceError::PathUnexpectedEnd(path.len())),
        Some(_) => {
            if a.is_none() {
                Err(SliceError::PathIndexBoundMissing(*i))
            } else {
                Err(SliceError::PathInvalidReference(*i))
            }
        }
    }
}

// Optional signed integer. A bare "-" without digits is an error; absence
// of any digits is Ok(None) so range slots can stay empty.
fn parse_bound(path: &[u8], i: &mut usize) -> Result<Option<i32>, SliceError> {
    let neg = path.get(*i) == Some(&b'-');
    let mut j = *i + usize::from(neg);
    let digits_at = j;
    let mut v: i64 = 0;
    while let Some(&b) = path.get(j) {
        if !b.is_ascii_digit() {
            break;
        }
        v = v * 10 + i64::from(b - b'0');
        if v > i64::from(i32::MAX) {
            v = i64::from(i32::MAX);
        }
        j += 1;
    }
    if j == digits_at {
        if neg {
            return Err(SliceError::PathIndexBoundMissing(*i));
        }
        return Ok(None);
    }
    *i = j;
    Ok(Some(if neg { -(v as i32) } else { v as i32 }))
}
