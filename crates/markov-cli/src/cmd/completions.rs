use std::io::Write;

use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `markov completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the completion script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the `markov` completion script for `shell` to `out`.
///
/// # Errors
///
/// Returns an error if flushing `out` fails.
pub fn run_completions(
    args: &CompletionsArgs,
    command: &mut clap::Command,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    generate(args.shell, command, "markov", out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_for(shell: Shell) -> String {
        let mut command = clap::Command::new("markov")
            .subcommand(clap::Command::new("check"))
            .subcommand(clap::Command::new("forecast"));
        let mut buf = Vec::new();
        run_completions(&CompletionsArgs { shell }, &mut command, &mut buf).expect("completions");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn bash_script_names_binary_and_subcommands() {
        let script = script_for(Shell::Bash);
        assert!(script.contains("_markov"));
        assert!(script.contains("forecast"));
    }

    #[test]
    fn zsh_script_is_a_compdef() {
        assert!(script_for(Shell::Zsh).starts_with("#compdef markov"));
    }
}
