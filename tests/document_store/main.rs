//! End-to-end tests over the public flowstore surface.

mod common;

mod concurrency;
mod lifecycle;
mod schedules;
