//! Test suites for the gridwire sidecar.

mod support;
