//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled            |
//! |-------------|-----------------------------|
//! | `interview` | `Start`, `Resume`           |
//! | `project`   | `List`, `Delete`, `Config`  |

pub mod interview;
pub mod project;

pub use interview::{cmd_resume, cmd_start};
pub use project::{cmd_config_init, cmd_config_show, cmd_delete, cmd_list};
