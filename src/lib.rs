//! Extract a fragment from a raw JSON document with a JSONPath query,
//! without materializing the document into a value tree.
//!
//! The engine compiles the query into a chain of step nodes and walks the
//! input bytes in lockstep with it, skimming past values it does not need.
//! Whenever the result is a single value it is returned as a direct
//! sub-slice of the input (`Cow::Borrowed`); only aggregating selectors
//! (ranges, filters, wildcards, index and key lists) synthesize a fresh
//! `[...]` byte sequence.
//!
//! ```
//! use jsonslice::get;
//!
//! let doc = br#"{"sku":[{"id":1,"price":160},{"id":2,"price":280}]}"#;
//! let price = get(doc, "$.sku[0].price")?;
//! assert_eq!(price.as_ref(), b"160");
//!
//! let cheap = get(doc, "$.sku[?(@.price < 200)].id")?;
//! assert_eq!(cheap.as_ref(), b"[1]");
//! # Ok::<(), jsonslice::SliceError>(())
//! ```

mod error;
mod eval;
mod path;
mod scan;

pub use error::SliceError;

use log::debug;
use std::borrow::Cow;

/// Retrieve the fragment of `input` designated by `path`.
///
/// The query must begin with `$`; the bare query `"$"` returns the input
/// verbatim. Results that name a single value are `Cow::Borrowed` sub-slices
/// of `input`; aggregating selectors return a synthesized `Cow::Owned`
/// array.
///
/// # Examples
///
/// ```
/// use jsonslice::get;
///
/// let doc = br#"{"a":{"b":{"c":42}}}"#;
/// assert_eq!(get(doc, "$.a.b.c")?.as_ref(), b"42");
/// assert_eq!(get(doc, "$")?.as_ref(), doc.as_slice());
/// # Ok::<(), jsonslice::SliceError>(())
/// ```
pub fn get<'a>(input: &'a [u8], path: &str) -> Result<Cow<'a, [u8]>, SliceError> {
    let mut chain = path::parse_path(path.as_bytes())?;
    eval::filter::freeze_root_operands(&mut chain, input)?;
    debug!("evaluating query {:?}", path);
    eval::get_by_chain(input, &chain)
}

/// Retrieve the elements of the array designated by `path` as a list of
/// sub-slices of `input`.
///
/// The query must resolve to an array. Wildcards and functions are
/// rejected, as is any aggregating selector before the terminal step; a
/// plain single index on the terminal step is rejected too, since it
/// selects an element rather than an array. `capacity` pre-sizes the
/// returned `Vec`.
///
/// # Examples
///
/// ```
/// use jsonslice::get_array_elements;
///
/// let doc = br#"{"tags":["red","big",7]}"#;
/// let elems = get_array_elements(doc, "$.tags", 4)?;
/// assert_eq!(elems, vec![&b"\"red\""[..], b"\"big\"", b"7"]);
/// # Ok::<(), jsonslice::SliceError>(())
/// ```
pub fn get_array_elements<'a>(
    input: &'a [u8],
    path: &str,
    capacity: usize,
) -> Result<Vec<&'a [u8]>, SliceError> {
    let mut chain = path::parse_path(path.as_bytes())?;
    eval::filter::freeze_root_operands(&mut chain, input)?;
    debug!("extracting array elements for query {:?}", path);
    eval::get_elements(input, &chain, capacity)
}

#[cfg(test)]
mod tests;
