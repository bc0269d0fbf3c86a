mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, replay, size};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg = commands.config();

    logging::init_logging(cfg.quiet);
    print::banner(cfg.quiet);

    match commands.command {
        Commands::Size { range } => {
            print::header("range size", cfg.quiet);
            size::size(range, &cfg);
            Ok(())
        }
        Commands::Discover(args) => {
            print::header("getting ready for discovery", cfg.quiet);
            discover::discover(args, &cfg).await
        }
        Commands::Replay { file, range } => {
            print::header("replaying status payloads", cfg.quiet);
            replay::replay(&file, range, &cfg).await
        }
    }
}
