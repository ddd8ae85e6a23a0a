use std::{path::PathBuf, process::Command};

use anyhow::{bail, Context, Result};
use is_executable::IsExecutable;
use log::debug;

use crate::{block::Block, logging::LOG_TARGET};

use super::Oracle;

/// A user-supplied oracle plugin, invoked as a subprocess rather than a
/// dynamically loaded library: it shells out with the forged cyphertext as
/// hex arguments and treats exit code 0 as "valid padding", avoiding
/// `libloading` and unsafe FFI for what's otherwise a plain
/// `submit_guess(prev, target) -> bool` contract.
pub struct ScriptOracle {
    path: PathBuf,
}

impl ScriptOracle {
    pub fn load(path: PathBuf) -> Result<Self> {
        if !path.is_file() {
            bail!("`{}` does not point to a file", path.display());
        }
        if !path.is_executable() {
            bail!(
                "`{}` is not executable. Double check its permissions",
                path.display()
            );
        }
        Ok(Self { path })
    }
}

impl Oracle for ScriptOracle {
    fn ask(&self, prev: &Block, target: &Block) -> Result<bool> {
        debug!(target: LOG_TARGET, "Invoking oracle script `{}`", self.path.display());

        let status = Command::new(&self.path)
            .arg(prev.to_hex())
            .arg(target.to_hex())
            .status()
            .with_context(|| format!("Failed to execute oracle script `{}`", self.path.display()))?;

        Ok(status.success())
    }
}
