use mission_planner::output::Output;
use mission_planner::{script, MissionPlanner, PlannerConfig};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

#[derive(StructOpt, Debug)]
#[structopt(name = "mission_planner")]
struct Opt {
    /// Event script (JSON lines), read from stdin when omitted
    #[structopt(parse(from_os_str))]
    input: Option<PathBuf>,

    /// Write the mission as a GeoJSON feature collection
    #[structopt(short, long)]
    geojson: bool,

    /// Write mission rows as JSON lines
    #[structopt(short, long, conflicts_with = "geojson")]
    json: bool,

    /// Stage finished polygons until an import or discard event
    #[structopt(long)]
    confirm_import: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt().with_writer(io::stderr).try_init();
    let opt = Opt::from_args();

    let events = match &opt.input {
        Some(path) => script::parse(BufReader::new(File::open(path)?))?,
        None => script::parse(io::stdin().lock())?,
    };

    let config = PlannerConfig {
        confirm_polygon_import: opt.confirm_import,
    };
    let mut planner = MissionPlanner::new(config);
    let rejected = script::replay(&mut planner, &events);
    info!(events = events.len(), rejected, "script replayed");

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let route = planner.route();
    if opt.geojson {
        route.write_geojson(&mut writer)?;
    } else if opt.json {
        route.write_json_lines(&mut writer)?;
    } else {
        route.write_table(&mut writer)?;
    }
    Ok(())
}
