//! Conversion between signal specs given on the command line and signal
//! numbers.
//!
//! A spec is a catalog name with or without its "SIG" prefix, a realtime
//! name relative to one end of the realtime band (`RTMIN+3`, `SIGRTMAX-1`),
//! or a decimal signal number.

use std::borrow::Cow;

use posix::{RealtimeRange, Signal};

use crate::{
    catalog::{strip_sig, SignalCatalog},
    error::{NosigError, NosigResult},
};

pub fn resolve(catalog: &SignalCatalog, spec: &str) -> NosigResult<Signal> {
    if let Some(sig) = catalog.lookup_by_name(spec) {
        return Ok(sig);
    }
    if let Some(rt) = catalog.realtime() {
        let name = strip_sig(spec);
        if name.starts_with("RTMIN") || name.starts_with("RTMAX") {
            return resolve_realtime(rt, spec, name);
        }
    }
    resolve_number(catalog, spec)
}

fn resolve_realtime(rt: RealtimeRange, spec: &str, name: &str) -> NosigResult<Signal> {
    let (suffix, sign, base, bound) = match name.strip_prefix("RTMIN") {
        Some(suffix) => (suffix, '+', rt.min, "SIGRTMIN"),
        None => (&name["RTMAX".len()..], '-', rt.max, "SIGRTMAX"),
    };
    if suffix.is_empty() {
        return Ok(base);
    }
    let digits = suffix.strip_prefix(sign).ok_or_else(|| {
        NosigError::invalid_spec(spec, format!("must be {0} or {0}{1}<number>", bound, sign))
    })?;
    let offset = parse_offset(spec, digits)?;
    if offset > rt.span() {
        return Err(NosigError::invalid_spec(
            spec,
            format!("offset exceeds {}", rt.span()),
        ));
    }
    Ok(match sign {
        '+' => Signal(base.0 + offset),
        _ => Signal(base.0 - offset),
    })
}

fn parse_offset(spec: &str, digits: &str) -> NosigResult<i32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NosigError::invalid_spec(spec, "could not decode offset"));
    }
    digits
        .parse::<i32>()
        .map_err(|e| NosigError::invalid_spec(spec, format!("could not decode offset: {}", e)))
}

fn resolve_number(catalog: &SignalCatalog, spec: &str) -> NosigResult<Signal> {
    let n = spec
        .parse::<i64>()
        .map_err(|_| NosigError::invalid_spec(spec, "could not decode"))?;
    if n < 0 {
        return Err(NosigError::invalid_spec(
            spec,
            "only positive integers are allowed",
        ));
    }
    let sigmax = catalog.sigmax();
    if n > i64::from(sigmax.0) {
        return Err(NosigError::invalid_spec(
            spec,
            format!("signals greater than {} not supported", sigmax),
        ));
    }
    Ok(Signal(n as i32))
}

/// The preferred name of `sig`, suitable for passing back to `resolve`.
pub fn name_of(catalog: &SignalCatalog, sig: Signal) -> Cow<'static, str> {
    catalog.lookup_by_number(sig)
}
