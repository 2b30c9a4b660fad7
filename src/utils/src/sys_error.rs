use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysErrorKind {
    Libc,
    Nix, // from nix crate
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysError {
    code: i32,
    desc: Option<String>,
    kind: SysErrorKind,
}

impl fmt::Display for SysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.desc {
            Some(desc) => write!(f, "{} (errno {})", desc, self.code),
            None => write!(f, "errno {}", self.code),
        }
    }
}

impl std::error::Error for SysError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl SysError {
    pub fn new(code: i32) -> Self {
        Self {
            code,
            desc: None,
            kind: SysErrorKind::Libc,
        }
    }

    pub fn kind(&self) -> SysErrorKind {
        self.kind
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == libc::EINVAL
    }

    pub fn from_nix_errno(e: nix::errno::Errno) -> Self {
        Self {
            code: e as i32,
            desc: Some(e.desc().to_string()),
            kind: SysErrorKind::Nix,
        }
    }
}

impl From<nix::errno::Errno> for SysError {
    fn from(e: nix::errno::Errno) -> Self {
        Self::from_nix_errno(e)
    }
}

#[macro_export]
macro_rules! bail_libc {
    ($libc_code:expr) => {
        return Err(SysError::new($libc_code))
    };
}

pub type SysResult<T> = std::result::Result<T, SysError>;
