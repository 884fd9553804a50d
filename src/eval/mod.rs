//! Streaming path evaluation: walk the raw document bytes in lockstep with
//! the compiled step chain, returning sub-slices of the input wherever
//! possible and synthesizing `[...]` fragments only when aggregating.

pub(crate) mod filter;

use std::borrow::Cow;

use crate::error::SliceError;
use crate::path::{F_ARRAY, F_FUNCTION, F_RANGED, F_SUBJECT, F_TERMINAL, Step};
use crate::scan::{
    Span, nth_element, scan_elements, seek_to_value, skip_spaces, skip_string, skip_value,
};

/// Evaluate a chain against the value at `span`. The bare root (`$` or `@`
/// with no further steps) returns the value verbatim, before any structural
/// check.
pub(crate) fn eval_chain<'a>(
    input: &'a [u8],
    span: Span,
    chain: &Step,
) -> Result<Cow<'a, [u8]>, SliceError> {
    if chain.is(F_TERMINAL) && chain.is_sigil() && !chain.has_array_op() && chain.keys.is_empty()
    {
        return Ok(Cow::Borrowed(&input[span.0..span.1]));
    }
    eval_step(input, span, chain)
}

pub(crate) fn get_by_chain<'a>(input: &'a [u8], chain: &Step) -> Result<Cow<'a, [u8]>, SliceError> {
    eval_chain(input, (0, input.len()), chain)
}

fn eval_step<'a>(input: &'a [u8], span: Span, step: &Step) -> Result<Cow<'a, [u8]>, SliceError> {
    let i = skip_spaces(input, span.0);
    let open = match input.get(i).copied() {
        Some(b @ (b'{' | b'[')) => b,
        Some(_) => return Err(SliceError::ObjectOrArrayExpected),
        None => return Err(SliceError::UnexpectedEnd),
    };

    if step.key == b"*" {
        return eval_wildcard(input, i, open, step);
    }

    // locate the base value this step operates on
    let mut vspan: Span = (i, span.1);
    if !step.is_sigil() {
        if open != b'{' {
            return Err(SliceError::ObjectExpected);
        }
        vspan = find_key(input, i, &step.key)?;
    }

    if !step.keys.is_empty() {
        return eval_key_list(input, vspan, step);
    }
    if step.has_array_op() {
        return eval_array_op(input, vspan, step);
    }
    continue_after_value(input, vspan, step)
}

// Common tail once a single value has been located: apply a pending
// function, stop at the terminal, or descend into the successor.
fn continue_after_value<'a>(
    input: &'a [u8],
    vspan: Span,
    step: &Step,
) -> Result<Cow<'a, [u8]>, SliceError> {
    if let Some(func) = subject_function(step) {
        let j = skip_spaces(input, vspan.0);
        let end = skip_value(input, j)?;
        return apply_function(&input[j..end], func);
    }
    if step.is(F_TERMINAL) {
        let j = skip_spaces(input, vspan.0);
        let end = skip_value(input, j)?;
        return Ok(Cow::Borrowed(&input[j..end]));
    }
    match step.next.as_deref() {
        Some(next) => eval_step(input, vspan, next),
        None => Err(SliceError::FieldNotFound),
    }
}

fn subject_function(step: &Step) -> Option<&Step> {
    if !step.is(F_SUBJECT) {
        return None;
    }
    step.next.as_deref().filter(|n| n.is(F_FUNCTION))
}

fn eval_wildcard<'a>(
    input: &'a [u8],
    i: usize,
    open: u8,
    step: &Step,
) -> Result<Cow<'a, [u8]>, SliceError> {
    let spans = if open == b'{' {
        object_values(input, i)?
    } else {
        scan_elements(input, i)?
    };
    if let Some(func) = subject_function(step) {
        let synth = assemble_joined(input, &spans);
        return apply_function(&synth, func);
    }
    let mut parts: Vec<Cow<'a, [u8]>> = Vec::with_capacity(spans.len());
    for vs in spans {
        if step.is(F_TERMINAL) {
            parts.push(Cow::Borrowed(&input[vs.0..vs.1]));
        } else if let Some(next) = step.next.as_deref() {
            // a member the successor cannot match is skipped, not fatal
            if let Ok(v) = eval_step(input, vs, next) {
                parts.push(v);
            }
        }
    }
    Ok(Cow::Owned(join_parts(&parts)))
}

fn eval_key_list<'a>(
    input: &'a [u8],
    vspan: Span,
    step: &Step,
) -> Result<Cow<'a, [u8]>, SliceError> {
    let i = skip_spaces(input, vspan.0);
    if input.get(i) != Some(&b'{') {
        return Err(SliceError::ObjectExpected);
    }
    if let [key] = step.keys.as_slice() {
        // ['a'] is a plain lookup, not an aggregate
        let v = find_key(input, i, key)?;
        return continue_after_value(input, v, step);
    }
    let spans = harvest_keys(input, i, &step.keys)?;
    finish_aggregate(input, spans, step, Assemble::Join)
}

fn eval_array_op<'a>(
    input: &'a [u8],
    vspan: Span,
    step: &Step,
) -> Result<Cow<'a, [u8]>, SliceError> {
    let i = skip_spaces(input, vspan.0);
    if input.get(i) != Some(&b'[') {
        return Err(SliceError::ArrayExpected);
    }

    if let Some(expr) = &step.filter {
        let spans = scan_elements(input, i)?;
        let mut keep = Vec::new();
        for s in spans {
            if filter::eval_filter(input, s, expr)? {
                keep.push(s);
            }
        }
        return finish_aggregate(input, keep, step, Assemble::Join);
    }
    if step.is(F_RANGED) {
        let spans = scan_elements(input, i)?;
        let (a, b) = resolve_bounds(step.left, step.right, spans.len())?;
        return finish_aggregate(input, spans[a..b].to_vec(), step, Assemble::Contiguous);
    }
    if !step.elems.is_empty() {
        let spans = scan_elements(input, i)?;
        let mut sel = Vec::with_capacity(step.elems.len());
        for &e in &step.elems {
            sel.push(pick(&spans, e)?);
        }
        return finish_aggregate(input, sel, step, Assemble::Join);
    }

    // single index: positive indices advance linearly and stop early
    let espan = if step.left >= 0 {
        nth_element(input, i, step.left as usize)?
    } else {
        let spans = scan_elements(input, i)?;
        pick(&spans, step.left)?
    };
    if let Some(func) = subject_function(step) {
        return apply_function(&input[espan.0..espan.1], func);
    }
    if step.is(F_TERMINAL) {
        return Ok(Cow::Borrowed(&input[espan.0..espan.1]));
    }
    match step.next.as_deref() {
        Some(next) => eval_step(input, espan, next),
        None => Ok(Cow::Borrowed(&input[espan.0..espan.1])),
    }
}

enum Assemble {
    /// Selected spans joined with commas inside `[...]`.
    Join,
    /// One contiguous slice of the input from the first selected element to
    /// the last, wrapped in `[...]`; keeps the original inter-element bytes.
    Contiguous,
}

// An aggregating step either feeds a function, returns its synthesized
// array, or applies its successor to every selected element.
fn finish_aggregate<'a>(
    input: &'a [u8],
    spans: Vec<Span>,
    step: &Step,
    mode: Assemble,
) -> Result<Cow<'a, [u8]>, SliceError> {
    if let Some(func) = subject_function(step) {
        let synth = assemble(input, &spans, &mode);
        return apply_function(&synth, func);
    }
    if step.is(F_TERMINAL) {
        return Ok(Cow::Owned(assemble(input, &spans, &mode)));
    }
    let Some(next) = step.next.as_deref() else {
        return Ok(Cow::Owned(assemble(input, &spans, &mode)));
    };
    let mut parts: Vec<Cow<'a, [u8]>> = Vec::with_capacity(spans.len());
    for s in spans {
        match eval_step(input, s, next) {
            Ok(v) => parts.push(v),
            // an element without the requested shape is dropped
            Err(
                SliceError::FieldNotFound
                | SliceError::ArrayElementNotFound
                | SliceError::ObjectOrArrayExpected,
            ) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(Cow::Owned(join_parts(&parts)))
}

fn assemble(input: &[u8], spans: &[Span], mode: &Assemble) -> Vec<u8> {
    match mode {
        Assemble::Contiguous if !spans.is_empty() => {
            let first = spans[0].0;
            let last = spans[spans.len() - 1].1;
            let mut out = Vec::with_capacity(last - first + 2);
            out.push(b'[');
            out.extend_from_slice(&input[first..last]);
            out.push(b']');
            out
        }
        _ => assemble_joined(input, spans),
    }
}

fn assemble_joined(input: &[u8], spans: &[Span]) -> Vec<u8> {
    let mut out = vec![b'['];
    for (n, s) in spans.iter().enumerate() {
        if n > 0 {
            out.push(b',');
        }
        out.extend_from_slice(&input[s.0..s.1]);
    }
    out.push(b']');
    out
}

fn join_parts(parts: &[Cow<'_, [u8]>]) -> Vec<u8> {
    let mut out = vec![b'['];
    for (n, p) in parts.iter().enumerate() {
        if n > 0 {
            out.push(b',');
        }
        out.extend_from_slice(p);
    }
    out.push(b']');
    out
}

fn pick(spans: &[Span], idx: i32) -> Result<Span, SliceError> {
    let n = spans.len() as i64;
    let k = if idx < 0 {
        i64::from(idx) + n
    } else {
        i64::from(idx)
    };
    if k < 0 || k >= n {
        return Err(SliceError::ArrayElementNotFound);
    }
    Ok(spans[k as usize])
}

fn resolve_bounds(left: i32, right: Option<i32>, len: usize) -> Result<(usize, usize), SliceError> {
    let n = len as i64;
    let mut a = i64::from(left);
    if a < 0 {
        a += n;
    }
    let b = match right {
        None => n,
        Some(r) if r < 0 => i64::from(r) + n,
        Some(r) => i64::from(r),
    };
    if a < 0 || b < a || b > n {
        return Err(SliceError::ArrayElementNotFound);
    }
    Ok((a as usize, b as usize))
}

fn apply_function<'a>(bytes: &[u8], func: &Step) -> Result<Cow<'a, [u8]>, SliceError> {
    let n = match func.key.as_slice() {
        b"size" => bytes.len(),
        b"length" | b"count" => match bytes.first() {
            Some(b'[') => count_elements(bytes)?,
            // content bytes of the string, escapes left unprocessed
            Some(b'"') => bytes.len().saturating_sub(2),
            _ => return Err(SliceError::InvalidLengthUsage),
        },
        _ => return Err(SliceError::InvalidLengthUsage),
    };
    Ok(Cow::Owned(n.to_string().into_bytes()))
}

fn count_elements(buf: &[u8]) -> Result<usize, SliceError> {
    let mut j = skip_spaces(buf, 1);
    let mut n = 0usize;
    loop {
        match buf.get(j) {
            None => return Err(SliceError::UnexpectedEnd),
            Some(b']') => return Ok(n),
            Some(_) => {
                let end = skip_value(buf, j)?;
                n += 1;
                j = skip_spaces(buf, end);
            }
        }
    }
}

// Object entry walker shared by key search, multi-key harvest and wildcard
// expansion. Honors document order.
struct Entries<'a> {
    buf: &'a [u8],
    j: usize,
}

impl<'a> Entries<'a> {
    fn new(buf: &'a [u8], i: usize) -> Self {
        debug_assert_eq!(buf.get(i), Some(&b'{'));
        Self {
            buf,
            j: skip_spaces(buf, i + 1),
        }
    }

    fn next_entry(&mut self) -> Result<Option<(Span, Span)>, SliceError> {
        match self.buf.get(self.j) {
            None => Err(SliceError::UnexpectedEnd),
            Some(b'}') => Ok(None),
            Some(b'"') => {
                let kend = skip_string(self.buf, self.j)?;
                let key = (self.j + 1, kend - 1);
                let vstart = seek_to_value(self.buf, kend)?;
                let vend = skip_value(self.buf, vstart)?;
                self.j = skip_spaces(self.buf, vend);
                Ok(Some((key, (vstart, vend))))
            }
            Some(_) => Err(SliceError::UnrecognizedValue),
        }
    }
}

fn find_key(input: &[u8], i: usize, key: &[u8]) -> Result<Span, SliceError> {
    let mut it = Entries::new(input, i);
    while let Some((k, v)) = it.next_entry()? {
        if &input[k.0..k.1] == key {
            return Ok(v);
        }
    }
    Err(SliceError::FieldNotFound)
}

fn harvest_keys(input: &[u8], i: usize, keys: &[Vec<u8>]) -> Result<Vec<Span>, SliceError> {
    let mut out = Vec::new();
    let mut it = Entries::new(input, i);
    while let Some((k, v)) = it.next_entry()? {
        if keys.iter().any(|want| want.as_slice() == &input[k.0..k.1]) {
            out.push(v);
        }
    }
    Ok(out)
}

fn object_values(input: &[u8], i: usize) -> Result<Vec<Span>, SliceError> {
    let mut out = Vec::new();
    let mut it = Entries::new(input, i);
    while let Some((_, v)) = it.next_entry()? {
        out.push(v);
    }
    Ok(out)
}

/// Walk the chain to the array it names and return the element spans,
/// keeping every span a direct sub-slice of the input.
pub(crate) fn get_elements<'a>(
    input: &'a [u8],
    chain: &Step,
    capacity: usize,
) -> Result<Vec<&'a [u8]>, SliceError> {
    validate_elements_chain(chain)?;
    let mut step = chain;
    let mut span: Span = (0, input.len());
    loop {
        let i = skip_spaces(input, span.0);
        let open = match input.get(i).copied() {
            Some(b @ (b'{' | b'[')) => b,
            Some(_) => return Err(SliceError::ObjectOrArrayExpected),
            None => return Err(SliceError::UnexpectedEnd),
        };

        let mut vspan: Span = (i, span.1);
        if !step.is_sigil() {
            if open != b'{' {
                return Err(SliceError::ObjectExpected);
            }
            vspan = find_key(input, i, &step.key)?;
        }
        if let [key] = step.keys.as_slice() {
            let j = skip_spaces(input, vspan.0);
            if input.get(j) != Some(&b'{') {
                return Err(SliceError::ObjectExpected);
            }
            vspan = find_key(input, j, key)?;
        }

        if step.is(F_TERMINAL) {
            let j = skip_spaces(input, vspan.0);
            if step.keys.len() > 1 {
                if input.get(j) != Some(&b'{') {
                    return Err(SliceError::ObjectExpected);
                }
                let spans = harvest_keys(input, j, &step.keys)?;
                return Ok(collect_slices(input, &spans, capacity));
            }
            if input.get(j) != Some(&b'[') {
                return Err(SliceError::ArrayExpected);
            }
            let spans = scan_elements(input, j)?;
            let sel: Vec<Span> = if let Some(expr) = &step.filter {
                let mut keep = Vec::new();
                for s in spans {
                    if filter::eval_filter(input, s, expr)? {
                        keep.push(s);
                    }
                }
                keep
            } else if step.is(F_RANGED) {
                let (a, b) = resolve_bounds(step.left, step.right, spans.len())?;
                spans[a..b].to_vec()
            } else if !step.elems.is_empty() {
                let mut sel = Vec::with_capacity(step.elems.len());
                for &e in &step.elems {
                    sel.push(pick(&spans, e)?);
                }
                sel
            } else {
                spans
            };
            return Ok(collect_slices(input, &sel, capacity));
        }

        // non-terminal steps are plain lookups, optionally indexed
        if step.is(F_ARRAY) {
            let j = skip_spaces(input, vspan.0);
            if input.get(j) != Some(&b'[') {
                return Err(SliceError::ArrayExpected);
            }
            vspan = if step.left >= 0 {
                nth_element(input, j, step.left as usize)?
            } else {
                let spans = scan_elements(input, j)?;
                pick(&spans, step.left)?
            };
        }
        span = vspan;
        match step.next.as_deref() {
            Some(next) => step = next,
            None => return Err(SliceError::ArrayExpected),
        }
    }
}

fn collect_slices<'a>(input: &'a [u8], spans: &[Span], capacity: usize) -> Vec<&'a [u8]> {
    let mut out = Vec::with_capacity(capacity.max(spans.len()));
    for s in spans {
        out.push(&input[s.0..s.1]);
    }
    out
}

fn validate_elements_chain(chain: &Step) -> Result<(), SliceError> {
    let mut step = chain;
    loop {
        if step.key == b"*" {
            return Err(SliceError::WildcardsNotSupported);
        }
        if step.is(F_FUNCTION) || step.is(F_SUBJECT) {
            return Err(SliceError::FunctionsNotSupported);
        }
        let aggregating = step.is(F_RANGED)
            || !step.elems.is_empty()
            || step.keys.len() > 1
            || step.filter.is_some();
        if step.is(F_TERMINAL) {
            if step.is(F_ARRAY) && !aggregating {
                return Err(SliceError::TerminalNodeArray);
            }
            return Ok(());
        }
        if aggregating {
            return Err(SliceError::SubSlicingNotSupported);
        }
        match step.next.as_deref() {
            Some(next) => step = next,
            None => return Ok(()),
        }
    }
}
