pub mod dispatcher;
pub mod store;
pub mod timer;
