use clap::Parser;
use lpt::cli::{Cli, Commands};
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    // Install miette's fancy error handler for readable diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => lpt::cli::commands::init::run(args),
        Commands::Model(cmd) => lpt::cli::commands::model::run(cmd, &global),
        Commands::Base(cmd) => lpt::cli::commands::base::run(cmd, &global),
        Commands::Variant(cmd) => lpt::cli::commands::variant::run(cmd, &global),
        Commands::Catalog(cmd) => lpt::cli::commands::catalog::run(cmd, &global),
        Commands::Report(cmd) => lpt::cli::commands::report::run(cmd, &global),
        Commands::Completions(args) => lpt::cli::commands::completions::run(args),
    }
}

/// Route recovered-error logging (malformed legacy data, catalog
/// mismatches) to stderr; `--verbose` opens up debug output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "lpt=debug" } else { "lpt=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
