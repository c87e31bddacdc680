use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = dir_stash::cli::parse();
    app::run(args)
}
