//! Flutter-facing bindings for the command post core.

pub mod api;
