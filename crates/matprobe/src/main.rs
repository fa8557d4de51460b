mod cli;
mod manifest;
mod report;
mod run;
mod scan;

use anyhow::Result;

fn main() -> Result<()> {
    let args = cli::parse();
    run::run(args)
}
