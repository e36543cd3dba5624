pub mod add;
pub mod cancel;
pub mod conn;
pub mod display;
pub mod stop;
