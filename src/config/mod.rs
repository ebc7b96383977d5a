use std::num::NonZeroUsize;

use log::debug;

use crate::error::{Error, Result};

/// Environment variable read when no strides are given on the command line.
pub const STRIDE_SIZES_VAR: &str = "STRIDE_SIZES";

pub fn parse_stride(token: &str) -> Result<NonZeroUsize> {
    let value: i64 = token
        .trim()
        .parse()
        .map_err(|_| Error::UnparsableStride(token.to_string()))?;
    usize::try_from(value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(Error::InvalidStride(value))
}

/// Parses every token in order. One bad token rejects the whole list.
pub fn parse_strides<I, S>(tokens: I) -> Result<Vec<NonZeroUsize>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| parse_stride(token.as_ref()))
        .collect()
}

/// Picks the stride list from `args`, or from `env_value` (whitespace
/// separated) when `args` is empty. Both sources empty is an error.
pub fn resolve_strides(args: &[String], env_value: Option<&str>) -> Result<Vec<NonZeroUsize>> {
    if !args.is_empty() {
        debug!("strides from arguments: {args:?}");
        return parse_strides(args);
    }
    let strides = match env_value {
        Some(value) => {
            debug!("strides from {STRIDE_SIZES_VAR}: {value:?}");
            parse_strides(value.split_whitespace())?
        }
        None => Vec::new(),
    };
    if strides.is_empty() {
        return Err(Error::NoStrides);
    }
    Ok(strides)
}
