pub mod command;

pub use command::{CommandError, CommandResult, CommandRunner, ShellRunner, run_with_soft_timeout};
