use std::env;
use std::process;

use hello_triangle::prelude::*;
use hello_triangle::sys;
use hello_triangle::window::backends::glutin::GlutinSurface;

fn main() {
    let settings = match env::args().nth(1) {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    };

    let settings = settings.unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(2);
    });

    sys::init(settings.log_level().unwrap_or(log::LevelFilter::Info));

    if let Err(err) = run(&settings) {
        log::error!("{}", err);
        process::exit(1);
    }
}

fn run(settings: &Settings) -> Result<()> {
    let surface = GlutinSurface::new(&settings.surface)?;
    let frame = Launcher::new(settings.pipeline).launch(&surface)?;

    log::info!(
        "Drew a triangle into a {}x{} viewport.",
        frame.viewport.size.x,
        frame.viewport.size.y
    );

    surface.present()?;
    surface.wait_until_closed();
    Ok(())
}
