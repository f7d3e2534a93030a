//! Shared helpers for the integration tests.

use glrelay::{DeviceCaps, QueueRunner, Resources, TraceDevice};

/// Routes `tracing` output into the test harness capture. Safe to call from
/// every test; only the first call installs a subscriber.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A runner with device objects created against a fresh recording device and
/// a 1280x720 default target. The device's call log starts empty.
#[allow(dead_code)]
pub fn ready_runner(caps: DeviceCaps) -> (QueueRunner, TraceDevice, Resources) {
    init_tracing();
    let mut runner = QueueRunner::new(caps);
    let mut dev = TraceDevice::new();
    runner.set_target_size(1280, 720);
    runner.create_device_objects(&mut dev);
    dev.clear_calls();
    (runner, dev, Resources::new())
}
