//! Converts a SUMO .net.xml file into a CityFlow roadnet JSON file.

#[macro_use]
extern crate log;

use anyhow::Result;
use structopt::StructOpt;

use sumo::Network;

#[derive(StructOpt)]
#[structopt(
    name = "cityflow",
    about = "Converts a SUMO network to the CityFlow roadnet format"
)]
struct Flags {
    /// The SUMO .net.xml file to read
    #[structopt(long)]
    net: String,
    /// The CityFlow roadnet JSON file to write
    #[structopt(long)]
    output: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let flags = Flags::from_args();

    let network = Network::load(&flags.net)?;
    let roadnet = cityflow::convert(&network)?;
    fs_err::write(&flags.output, serde_json::to_string_pretty(&roadnet)?)?;
    info!("Wrote {}", flags.output);
    Ok(())
}
