use super::*;

// Shared test helpers

/// True when `inner` points into the storage of `outer`.
fn is_subslice(outer: &[u8], inner: &[u8]) -> bool {
    let o = outer.as_ptr() as usize;
    let i = inner.as_ptr() as usize;
    i >= o && i + inner.len() <= o + outer.len()
}

fn get_str<'a>(input: &'a [u8], path: &str) -> std::borrow::Cow<'a, [u8]> {
    get(input, path).unwrap()
}

mod filters;
