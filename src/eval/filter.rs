//! Postfix predicate evaluation against one candidate element.

use std::borrow::Cow;

use log::trace;
use regex::bytes::Regex;

use crate::error::SliceError;
use crate::path::Step;
use crate::path::filter::{FilterExpr, Op, ResolvedValue, SubPathRoot, Token};
use crate::scan::Span;

/// A typed view of a resolved operand. `Missing` stands for a sub-path that
/// did not match the candidate; it is falsy and never equal to anything,
/// including explicit null.
pub(crate) enum FilterValue<'a> {
    Missing,
    Null,
    Bool(bool),
    Num(f64),
    Str(Cow<'a, [u8]>),
    Node(Cow<'a, [u8]>),
}

impl ResolvedValue {
    fn as_value(&self) -> FilterValue<'_> {
        match self {
            ResolvedValue::Missing => FilterValue::Missing,
            ResolvedValue::Null => FilterValue::Null,
            ResolvedValue::Bool(b) => FilterValue::Bool(*b),
            ResolvedValue::Num(n) => FilterValue::Num(*n),
            ResolvedValue::Str(s) => FilterValue::Str(Cow::Borrowed(s.as_slice())),
            ResolvedValue::Node(n) => FilterValue::Node(Cow::Borrowed(n.as_slice())),
        }
    }
}

/// Classify raw result bytes into a typed operand by their first byte.
pub(crate) fn classify(bytes: Cow<'_, [u8]>) -> FilterValue<'_> {
    match bytes.first() {
        None => FilterValue::Missing,
        Some(b'"') => {
            if bytes.len() < 2 {
                return FilterValue::Missing;
            }
            let end = bytes.len() - 1;
            FilterValue::Str(slice_cow(bytes, 1, end))
        }
        Some(b'{') | Some(b'[') => FilterValue::Node(bytes),
        Some(b't') => FilterValue::Bool(true),
        Some(b'f') => FilterValue::Bool(false),
        Some(b'n') => FilterValue::Null,
        Some(_) => {
            // raw textual digits parsed as an IEEE double
            match std::str::from_utf8(&bytes)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
            {
                Some(n) => FilterValue::Num(n),
                None => FilterValue::Missing,
            }
        }
    }
}

fn slice_cow(c: Cow<'_, [u8]>, a: usize, b: usize) -> Cow<'_, [u8]> {
    match c {
        Cow::Borrowed(s) => Cow::Borrowed(&s[a..b]),
        Cow::Owned(v) => Cow::Owned(v[a..b].to_vec()),
    }
}

// Sub-path lookups that simply miss are "no match", not an error.
fn resolve_sub_path<'a>(
    input: &'a [u8],
    span: Span,
    chain: &Step,
) -> Result<FilterValue<'a>, SliceError> {
    match super::eval_chain(input, span, chain) {
        Ok(bytes) => Ok(classify(bytes)),
        Err(
            SliceError::FieldNotFound
            | SliceError::ArrayElementNotFound
            | SliceError::ObjectOrArrayExpected
            | SliceError::ObjectExpected
            | SliceError::ArrayExpected,
        ) => Ok(FilterValue::Missing),
        Err(e) => Err(e),
    }
}

enum Slot<'a> {
    Lazy { root: SubPathRoot, chain: &'a Step },
    Re(&'a Regex),
    Val(FilterValue<'a>),
}

fn resolve<'a>(input: &'a [u8], span: Span, slot: Slot<'a>) -> Result<FilterValue<'a>, SliceError> {
    match slot {
        Slot::Val(v) => Ok(v),
        Slot::Lazy { root, chain } => match root {
            SubPathRoot::Current => resolve_sub_path(input, span, chain),
            // root operands are normally frozen ahead of time; this is the
            // fallback for a chain evaluated without preparation
            SubPathRoot::Root => resolve_sub_path(input, (0, input.len()), chain),
        },
        Slot::Re(_) => Err(SliceError::InvalidRegexp),
    }
}

fn truthy(v: &FilterValue<'_>) -> bool {
    match v {
        FilterValue::Missing | FilterValue::Null => false,
        FilterValue::Bool(b) => *b,
        FilterValue::Num(n) => *n != 0.0,
        FilterValue::Str(_) | FilterValue::Node(_) => true,
    }
}

/// Evaluate a compiled predicate against the candidate at `span`.
pub(crate) fn eval_filter<'a>(
    input: &'a [u8],
    span: Span,
    expr: &'a FilterExpr,
) -> Result<bool, SliceError> {
    let mut stack: Vec<Slot<'a>> = Vec::with_capacity(expr.tokens.len());
    for tok in &expr.tokens {
        match tok {
            Token::Num(n) => stack.push(Slot::Val(FilterValue::Num(*n))),
            Token::Str(s) => stack.push(Slot::Val(FilterValue::Str(Cow::Borrowed(s.as_slice())))),
            Token::Bool(b) => stack.push(Slot::Val(FilterValue::Bool(*b))),
            Token::Null => stack.push(Slot::Val(FilterValue::Null)),
            Token::Regex(re) => stack.push(Slot::Re(re)),
            Token::Path { root, chain } => stack.push(Slot::Lazy {
                root: *root,
                chain: &**chain,
            }),
            Token::Resolved(rv) => stack.push(Slot::Val(rv.as_value())),
            Token::Op(op) => {
                let right = stack.pop().ok_or(SliceError::NotEnoughArguments)?;
                let left = stack.pop().ok_or(SliceError::NotEnoughArguments)?;
                let v = apply_op(input, span, *op, left, right)?;
                stack.push(Slot::Val(v));
            }
        }
    }
    let last = stack.pop().ok_or(SliceError::NotEnoughArguments)?;
    if !stack.is_empty() {
        return Err(SliceError::NotEnoughArguments);
    }
    // a bare sub-path with no operator is truthy iff the field exists,
    // explicit null and false included
    if matches!(last, Slot::Lazy { .. }) {
        let v = resolve(input, span, last)?;
        return Ok(!matches!(v, FilterValue::Missing));
    }
    Ok(truthy(&resolve(input, span, last)?))
}

fn apply_op<'a>(
    input: &'a [u8],
    span: Span,
    op: Op,
    left: Slot<'a>,
    right: Slot<'a>,
) -> Result<FilterValue<'a>, SliceError> {
    match op {
        Op::And => {
            let l = resolve(input, span, left)?;
            if !truthy(&l) {
                // short-circuit: the right operand stays unresolved
                return Ok(FilterValue::Bool(false));
            }
            let r = resolve(input, span, right)?;
            Ok(FilterValue::Bool(truthy(&r)))
        }
        Op::Or => {
            let l = resolve(input, span, left)?;
            if truthy(&l) {
                return Ok(FilterValue::Bool(true));
            }
            let r = resolve(input, span, right)?;
            Ok(FilterValue::Bool(truthy(&r)))
        }
        Op::Match => {
            let Slot::Re(re) = right else {
                return Err(SliceError::InvalidRegexp);
            };
            let l = resolve(input, span, left)?;
            match l {
                FilterValue::Str(s) => Ok(FilterValue::Bool(re.is_match(&s))),
                FilterValue::Missing => Ok(FilterValue::Bool(false)),
                _ => Err(SliceError::InvalidRegexp),
            }
        }
        Op::Add | Op::Sub | Op::Mul | Op::Div => {
            let l = resolve(input, span, left)?;
            let r = resolve(input, span, right)?;
            arithmetic(op, l, r)
        }
        Op::Eq | Op::Ne => {
            let l = resolve(input, span, left)?;
            let r = resolve(input, span, right)?;
            Ok(FilterValue::Bool(eq_compare(op, &l, &r)))
        }
        Op::Lt | Op::Le | Op::Gt | Op::Ge => {
            let l = resolve(input, span, left)?;
            let r = resolve(input, span, right)?;
            Ok(FilterValue::Bool(ord_compare(op, &l, &r)?))
        }
    }
}

fn arithmetic<'a>(
    op: Op,
    l: FilterValue<'a>,
    r: FilterValue<'a>,
) -> Result<FilterValue<'a>, SliceError> {
    match (l, r) {
        (FilterValue::Missing, _) | (_, FilterValue::Missing) => Ok(FilterValue::Missing),
        (FilterValue::Num(a), FilterValue::Num(b)) => Ok(FilterValue::Num(match op {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            _ => a / b,
        })),
        _ => Err(SliceError::InvalidArithmetic),
    }
}

// Mismatched kinds yield false for both == and !=; null compares equal
// only to null.
fn eq_compare(op: Op, l: &FilterValue<'_>, r: &FilterValue<'_>) -> bool {
    use FilterValue::*;
    let eq = match (l, r) {
        (Missing, _) | (_, Missing) => return false,
        (Null, Null) => true,
        (Null, _) | (_, Null) => false,
        (Num(a), Num(b)) => a == b,
        (Str(a), Str(b)) => a == b,
        (Bool(a), Bool(b)) => a == b,
        (Node(a), Node(b)) => a == b,
        _ => return false,
    };
    if op == Op::Eq { eq } else { !eq }
}

fn ord_compare(op: Op, l: &FilterValue<'_>, r: &FilterValue<'_>) -> Result<bool, SliceError> {
    use FilterValue::*;
    match (l, r) {
        (Missing, _) | (_, Missing) => Ok(false),
        (Num(a), Num(b)) => Ok(match op {
            Op::Lt => a < b,
            Op::Le => a <= b,
            Op::Gt => a > b,
            _ => a >= b,
        }),
        (Str(_), Str(_)) => Err(SliceError::OperatorNotApplicableToStrings),
        _ => Err(SliceError::OperandTypesMismatch),
    }
}

/// Resolve every root-relative (`$`) filter operand in the chain against the
/// document once and freeze it into a typed literal. Avoids re-walking the
/// document per candidate during filter evaluation over long arrays.
pub(crate) fn freeze_root_operands(step: &mut Step, input: &[u8]) -> Result<(), SliceError> {
    if let Some(expr) = step.filter.as_mut() {
        for tok in expr.tokens.iter_mut() {
            freeze_token(tok, input)?;
        }
    }
    if let Some(next) = step.next.as_mut() {
        freeze_root_operands(next, input)?;
    }
    Ok(())
}

fn freeze_token(tok: &mut Token, input: &[u8]) -> Result<(), SliceError> {
    let Token::Path { root, chain } = tok else {
        return Ok(());
    };
    // nested sub-path filters may carry root operands of their own
    freeze_root_operands(chain, input)?;
    if *root != SubPathRoot::Root {
        return Ok(());
    }
    let resolved = match super::eval_chain(input, (0, input.len()), chain) {
        Ok(bytes) => to_resolved(classify(bytes)),
        Err(
            SliceError::FieldNotFound
            | SliceError::ArrayElementNotFound
            | SliceError::ObjectOrArrayExpected
            | SliceError::ObjectExpected
            | SliceError::ArrayExpected,
        ) => ResolvedValue::Missing,
        Err(e) => return Err(e),
    };
    trace!("froze root-relative filter operand");
    *tok = Token::Resolved(resolved);
    Ok(())
}

fn to_resolved(v: FilterValue<'_>) -> ResolvedValue {
    match v {
        FilterValue::Missing => ResolvedValue::Missing,
        FilterValue::Null => ResolvedValue::Null,
        FilterValue::Bool(b) => ResolvedValue::Bool(b),
        FilterValue::Num(n) => ResolvedValue::Num(n),
        FilterValue::Str(s) => ResolvedValue::Str(s.into_owned()),
        FilterValue::Node(n) => ResolvedValue::Node(n.into_owned()),
    }
}
