pub mod bootstrap;
pub mod modules;
pub mod shared;
