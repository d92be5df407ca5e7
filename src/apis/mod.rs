pub mod base;
pub mod factory;
pub mod html;
pub mod pave;
pub mod syndio;
pub mod worldatwork;
