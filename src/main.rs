use latower::cli::{self, Invocation};
use latower::init_logging;

fn main() {
    let code = match cli::parse_args(std::env::args_os()) {
        Invocation::Exit(code) => code,
        Invocation::Run(cli) => {
            if let Err(err) = init_logging(cli.verbose) {
                eprintln!("Failed to initialize logging: {err:#}");
            }
            tracing::debug!(version = latower::VERSION, built = latower::BUILD_DATE, "latower");
            cli::run(&cli)
        }
    };
    std::process::exit(code);
}
