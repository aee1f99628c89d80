use crate::args::Cli;
use clap::CommandFactory;
use clap_complete::{generate, Shell};

pub(crate) fn cmd_completions(shell: Shell) {
    let mut command = Cli::command();
    generate(shell, &mut command, "lampctl", &mut std::io::stdout());
}
