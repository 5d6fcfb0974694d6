use std::io;

use anyhow::Result;
use bikeshare_explorer::app::BikeshareApp;
use bikeshare_explorer::config::Config;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load()?;
    let stdin = io::stdin();
    let mut app = BikeshareApp::new(config, stdin.lock(), io::stdout());
    app.run()
}
