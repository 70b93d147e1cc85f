use std::env;
use std::ffi::CString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming the directory that holds the `julia` binary.
pub const BINDIR_ENV: &str = "JULIA_BINDIR";
/// Environment variable naming the system image to load.
pub const SYSIMAGE_ENV: &str = "JULIA_SYSIMAGE";

/// How to initialize the runtime.
///
/// With nothing set, Julia locates itself relative to `libjulia`. A system
/// image may only be given together with a bindir; a relative image path
/// is resolved by Julia against the bindir.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    bindir: Option<PathBuf>,
    image: Option<PathBuf>,
}

impl InitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read [`BINDIR_ENV`] and [`SYSIMAGE_ENV`]. Empty values count as unset.
    pub fn from_env() -> Self {
        let var = |key: &str| env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        InitOptions {
            bindir: var(BINDIR_ENV),
            image: var(SYSIMAGE_ENV),
        }
    }

    pub fn bindir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bindir = Some(dir.into());
        self
    }

    pub fn image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(path.into());
        self
    }

    /// Fill unset fields from `other`.
    pub fn or(self, other: InitOptions) -> Self {
        InitOptions {
            bindir: self.bindir.or(other.bindir),
            image: self.image.or(other.image),
        }
    }

    pub fn bindir_path(&self) -> Option<&Path> {
        self.bindir.as_deref()
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    /// The C strings for `jl_init_with_image`, or `None` for a plain `jl_init`.
    pub(crate) fn to_c_args(&self) -> Result<Option<(CString, Option<CString>)>> {
        let to_c = |p: &Path| {
            let s = p.to_string_lossy();
            CString::new(s.as_bytes()).map_err(|_| Error::InvalidString(s.into_owned()))
        };
        match (&self.bindir, &self.image) {
            (None, None) => Ok(None),
            (None, Some(image)) => Err(Error::InitFailed(format!(
                "system image {} given without a bindir",
                image.display()
            ))),
            (Some(bindir), image) => {
                let image = image.as_deref().map(to_c).transpose()?;
                Ok(Some((to_c(bindir)?, image)))
            }
        }
    }
}
