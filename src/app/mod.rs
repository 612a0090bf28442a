// Author: Dustin Pilgrim
// License: MIT

pub mod command;
pub mod journal;

use eyre::WrapErr;

use petrack::{log, log_file, pdebug};

use crate::cli::Args;

pub fn run(args: Args) -> eyre::Result<()> {
    log::set_verbose(args.verbose);

    if let Some(file) = &args.log_file {
        let path = file.clone().unwrap_or_else(log::log_path);
        log_file::open_run(&path, &log_file::LogPolicy::default(), args.command.name())
            .wrap_err_with(|| format!("failed to prepare log file {}", path.display()))?;
        log::set_log_file(Some(path));
    }

    pdebug!("Petrack", "running {}", args.command.name());
    command::run(args)
}
