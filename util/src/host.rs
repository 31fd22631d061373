//! Host platform utility functions

use std::path::PathBuf;

/// Environment variable giving the root directory of the software, containing the `params` and
/// `sessions` directories.
pub const SW_ROOT_ENV_VAR: &str = "WALL_EXPLORE_SW_ROOT";

/// Get the root directory of the software from the environment.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
