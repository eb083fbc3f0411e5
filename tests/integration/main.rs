//! End-to-end tests for the hook engine through the public `HookManager` API.

mod helpers;

mod dispatch_test;
mod history_test;
mod registry_test;
mod scenario_test;
