mod components;
mod display;
mod dom;
mod error;
mod format;
mod logging;
mod model;
mod refresh;

fn main() {
    logging::init();
    display::install_on_load();
}
