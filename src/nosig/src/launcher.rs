use std::{
    ffi::{CString, OsString},
    os::unix::ffi::OsStrExt,
};

use anyhow::{anyhow, Context};
use nix::{errno::Errno, unistd};

pub const EXIT_OK: i32 = 0;
/// Any failure of nosig itself.
pub const EXIT_ERR: i32 = 125;
pub const EXIT_PROG_NOT_EXEC: i32 = 126;
pub const EXIT_PROG_NOT_FOUND: i32 = 127;

pub fn exit_status_for(errno: Errno) -> i32 {
    match errno {
        Errno::ENOENT => EXIT_PROG_NOT_FOUND,
        Errno::EACCES => EXIT_PROG_NOT_EXEC,
        _ => EXIT_ERR,
    }
}

/// Replaces the current process with `argv[0]`, searched in `PATH`.
///
/// Only returns when the exec failed. `Ok` then holds the exit status to
/// report; the failure has already been logged.
pub fn exec(argv: &[OsString]) -> anyhow::Result<i32> {
    let program = argv.first().ok_or_else(|| anyhow!("missing program to run"))?;
    let args = argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("{}: invalid argument", program.to_string_lossy()))?;
    logger::debug!("execvp({:?})", argv);
    let errno = match unistd::execvp(&args[0], &args) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    logger::error!("{}: {}", program.to_string_lossy(), errno.desc());
    Ok(exit_status_for(errno))
}
