mod root;
mod state;

pub use root::App;
