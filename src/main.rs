use tubeloop::app::App;
use tubeloop::config::DemoConfig;
use winit::event_loop::EventLoop;

fn main() {
    env_logger::init();

    let mut config = DemoConfig::load();

    // A bare positional argument overrides the configured palette.
    if let Some(key) = std::env::args().nth(1) {
        config.palette = key;
    }

    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("event loop error");
}
