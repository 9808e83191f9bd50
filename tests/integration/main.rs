//! End-to-end tests: a live server on an ephemeral port, driven over HTTP.

mod events_test;
mod helpers;
mod reminders_test;
mod sync_test;
