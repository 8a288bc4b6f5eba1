use foxglade::errors::Result;
use foxglade::{App, ResourceLoader};

const FOX_SOURCE: &str = "assets/Fox.glb";
const FLOOR_COLOR_SOURCE: &str = "assets/floor_color.jpg";
const FLOOR_NORMAL_SOURCE: &str = "assets/floor_normal.jpg";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("Fatal: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let loader = ResourceLoader::new()?;
    let resources = loader.load_blocking(FOX_SOURCE, FLOOR_COLOR_SOURCE, FLOOR_NORMAL_SOURCE)?;
    App::new(resources).run()
}
