/*
 *  main.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use netmons::config::{self, Cli};
use netmons::display::DisplayDriverFactory;
use netmons::identity::SystemIdentity;
use netmons::layout::{InfoRenderer, LayoutSpec};
use netmons::monitor::Monitor;
use netmons::typeface::{load_typeface, FontSearch};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", serde_yaml::to_string(&cfg).context("serializing configuration")?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_filter()))
        .format_timestamp_secs()
        .init();

    info!("This {} shows who you are", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);
    info!("interface {}, refresh {:?}", cfg.interface(), cfg.refresh());

    let face = FontSearch::new(cfg.font_path(), cfg.font_size())
        .resolve()
        .and_then(|source| load_typeface(&source))
        .context("loading font")?;

    let driver = DisplayDriverFactory::create_from_config(&cfg).context("opening display")?;

    let mut monitor = Monitor::new(
        driver,
        Box::new(SystemIdentity::new(cfg.interface())),
        InfoRenderer::new(face, LayoutSpec::from_config(&cfg)),
        cfg.placeholder(),
        cfg.refresh(),
    );

    if let Err(e) = monitor.run(cli.once) {
        error!("display loop stopped: {}", e);
        return Err(e).context("display loop");
    }
    Ok(())
}
