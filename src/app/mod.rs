// Application wiring: store, controller and their background tasks.

mod app;

pub use app::App;
