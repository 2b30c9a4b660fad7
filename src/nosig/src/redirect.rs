use std::{
    os::unix::io::RawFd,
    path::{Path, PathBuf},
};

use anyhow::Context;
use nix::{
    fcntl::{self, OFlag},
    sys::stat::Mode,
    unistd,
};

const DEV_NULL: &str = "/dev/null";

/// Rewiring of the standard descriptors inherited by the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Stdin(PathBuf),
    Stdout(PathBuf),
    Stderr(PathBuf),
    /// stdout to the path, then stderr onto stdout.
    Output(PathBuf),
    NullIo,
}

impl Redirect {
    pub fn apply(&self) -> anyhow::Result<()> {
        logger::debug!("redirect {:?}", self);
        match self {
            Redirect::Stdin(path) => input_from(path),
            Redirect::Stdout(path) => output_to(libc::STDOUT_FILENO, path),
            Redirect::Stderr(path) => output_to(libc::STDERR_FILENO, path),
            Redirect::Output(path) => {
                output_to(libc::STDOUT_FILENO, path)?;
                unistd::dup2(libc::STDOUT_FILENO, libc::STDERR_FILENO)
                    .context("could not dup stdout to stderr")?;
                Ok(())
            }
            Redirect::NullIo => {
                let null = Path::new(DEV_NULL);
                input_from(null)?;
                output_to(libc::STDOUT_FILENO, null)?;
                output_to(libc::STDERR_FILENO, null)
            }
        }
    }
}

fn input_from(path: &Path) -> anyhow::Result<()> {
    redirect_fd(libc::STDIN_FILENO, path, OFlag::O_RDONLY)
}

// Existing files are written over in place, not truncated.
fn output_to(target: RawFd, path: &Path) -> anyhow::Result<()> {
    redirect_fd(target, path, OFlag::O_WRONLY | OFlag::O_CREAT)
}

pub(crate) fn redirect_fd(target: RawFd, path: &Path, flags: OFlag) -> anyhow::Result<()> {
    let mode = Mode::from_bits_truncate(0o666);
    let fd = fcntl::open(path, flags, mode)
        .with_context(|| format!("could not open {}", path.display()))?;
    if fd == target {
        return Ok(());
    }
    let dup = unistd::dup2(fd, target)
        .with_context(|| format!("could not redirect fd {} to {}", target, path.display()));
    let _ = unistd::close(fd);
    dup.map(drop)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_through_the_target() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        redirect_fd(200, file.path(), OFlag::O_RDONLY).unwrap();
        let mut buf = [0u8; 8];
        let n = unistd::read(200, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
        unistd::close(200).unwrap();
    }

    #[test]
    fn output_creates_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        std::fs::write(&path, b"0123456789").unwrap();
        redirect_fd(201, &path, OFlag::O_WRONLY | OFlag::O_CREAT).unwrap();
        unistd::write(201, b"abc").unwrap();
        unistd::close(201).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"abc3456789");

        let fresh = dir.path().join("new.log");
        redirect_fd(202, &fresh, OFlag::O_WRONLY | OFlag::O_CREAT).unwrap();
        unistd::close(202).unwrap();
        assert!(fresh.exists());
    }

    #[test]
    fn missing_input_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");
        let err = Redirect::Stdin(path.clone()).apply().unwrap_err();
        assert!(format!("{:#}", err).contains(&path.display().to_string()));
    }
}
