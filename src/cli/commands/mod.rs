//! One module per subcommand.  Each exposes an `execute` function.

pub mod add;
pub mod copy;
pub mod delete;
pub mod generate;
pub mod init;
pub mod list;
pub mod search;
pub mod show;
pub mod update;
