//! Core, DOM-free primitives and the page controller.
pub mod controller;
pub mod dom;
pub mod events;
pub mod memory;
pub mod schedule;
pub mod storage;
pub mod theme;
