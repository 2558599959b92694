pub(crate) mod config;
pub(crate) mod geometry;
pub(crate) mod host;
pub(crate) mod observer;
pub(crate) mod sim;
