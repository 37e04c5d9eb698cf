use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use axbutton::{
    ButtonDevice, ButtonSetConfig, CancelToken, IrqController, LineHandler, LineId, TriggerMode,
    wire,
};
use axerrno::{AxError, AxResult};

/// Test double for the platform interrupt controller. Firing a line invokes
/// the registered handler on the calling thread, which plays the role of the
/// interrupt context.
#[derive(Default)]
struct TestController {
    handlers: Mutex<HashMap<u32, Arc<dyn LineHandler>>>,
}

impl TestController {
    fn fire(&self, line: u32) {
        let handler = self.handlers.lock().unwrap().get(&line).cloned();
        if let Some(handler) = handler {
            handler.line_asserted(LineId(line));
        }
    }
}

impl IrqController for TestController {
    fn register_line(
        &self,
        line: LineId,
        _trigger: TriggerMode,
        handler: Arc<dyn LineHandler>,
    ) -> AxResult {
        self.handlers.lock().unwrap().insert(line.0, handler);
        Ok(())
    }

    fn unregister_line(&self, line: LineId) {
        self.handlers.lock().unwrap().remove(&line.0);
    }
}

fn setup() -> (Arc<ButtonDevice>, Arc<TestController>) {
    let controller = Arc::new(TestController::default());
    let device = ButtonDevice::new(ButtonSetConfig::s3c2440_keys(), controller.clone());
    (device, controller)
}

// KEY1..KEY4 line numbers from the default table.
const K1: u32 = 19;
const K2: u32 = 11;
const K3: u32 = 2;
const K4: u32 = 0;

#[test]
fn test_scenario_one_press_k2_five_presses_k4() {
    let (device, controller) = setup();
    let session = device.open().expect("open failed");

    controller.fire(K2);
    for _ in 0..5 {
        controller.fire(K4);
    }

    let mut buf = [0i32; 4];
    let n = session.read(&mut buf[..], &CancelToken::new()).unwrap();
    assert_eq!(n, 4);
    assert_eq!(buf, [0, 1, 0, 5]);

    // No new presses: the next read must block, not return stale data.
    let cancel = CancelToken::new();
    cancel.cancel();
    assert_eq!(session.read_report(&cancel).err(), Some(AxError::WouldBlock));
}

#[test]
fn test_blocked_reader_is_woken_by_press() {
    let (device, controller) = setup();
    let session = device.open().expect("open failed");

    let reader = thread::spawn(move || {
        let start = Instant::now();
        let report = session.read_report(&CancelToken::new()).unwrap();
        (report, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    controller.fire(K1);

    let (report, blocked_for) = reader.join().unwrap();
    assert_eq!(report.counts(), &[1, 0, 0, 0]);
    // The read must have actually waited for the press.
    assert!(blocked_for >= Duration::from_millis(40));
}

#[test]
fn test_cancel_unblocks_reader_without_corrupting_state() {
    let (device, controller) = setup();
    let session = Arc::new(device.open().expect("open failed"));
    let cancel = CancelToken::new();

    let reader = {
        let session = Arc::clone(&session);
        let cancel = cancel.clone();
        thread::spawn(move || session.read_report(&cancel))
    };

    thread::sleep(Duration::from_millis(30));
    cancel.cancel();
    assert_eq!(reader.join().unwrap().err(), Some(AxError::WouldBlock));

    // The session is still usable and nothing was invented or lost.
    assert!(!session.has_pending());
    controller.fire(K3);
    let report = session.read_report(&CancelToken::new()).unwrap();
    assert_eq!(report.counts(), &[0, 0, 1, 0]);
}

#[test]
fn test_consecutive_reads_report_independent_batches() {
    let (device, controller) = setup();
    let session = device.open().expect("open failed");

    for _ in 0..3 {
        controller.fire(K1);
    }
    controller.fire(K3);
    controller.fire(K3);

    let report = session.read_report(&CancelToken::new()).unwrap();
    assert_eq!(report.counts(), &[3, 0, 2, 0]);

    controller.fire(K2);
    controller.fire(K2);

    let report = session.read_report(&CancelToken::new()).unwrap();
    assert_eq!(report.counts(), &[0, 2, 0, 0]);
}

#[test]
fn test_byte_read_round_trips_through_wire_format() {
    let (device, controller) = setup();
    let session = device.open().expect("open failed");

    controller.fire(K2);
    for _ in 0..5 {
        controller.fire(K4);
    }

    let mut buf = [0u8; 16];
    let n = session.read(&mut buf[..], &CancelToken::new()).unwrap();
    assert_eq!(n, 4);

    let counts = wire::decode_counts(&buf);
    assert_eq!(counts.as_slice(), &[0, 1, 0, 5]);
}

#[test]
fn test_report_prints_harness_lines() {
    let (device, controller) = setup();
    let session = device.open().expect("open failed");

    controller.fire(K1);
    controller.fire(K1);

    let report = session.read_report(&CancelToken::new()).unwrap();
    assert_eq!(report.to_string(), "K1 has been pressed 2 times!\n");
}

#[test]
fn test_concurrent_lines_accumulate_independently() {
    let (device, controller) = setup();
    let session = device.open().expect("open failed");

    let mut pressers = Vec::new();
    for (line, presses) in [(K1, 500), (K2, 300), (K4, 700)] {
        let controller = Arc::clone(&controller);
        pressers.push(thread::spawn(move || {
            for _ in 0..presses {
                controller.fire(line);
            }
        }));
    }
    for presser in pressers {
        presser.join().unwrap();
    }

    let report = session.read_report(&CancelToken::new()).unwrap();
    assert_eq!(report.counts(), &[500, 300, 0, 700]);
}

#[test]
fn test_no_press_lost_across_interleaved_reads() {
    const PRESSES: i32 = 2000;

    let (device, controller) = setup();
    let session = Arc::new(device.open().expect("open failed"));
    let cancel = CancelToken::new();

    let presser = {
        let controller = Arc::clone(&controller);
        let cancel = cancel.clone();
        thread::spawn(move || {
            for i in 0..PRESSES {
                controller.fire(if i % 2 == 0 { K1 } else { K3 });
                if i % 256 == 0 {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            cancel.cancel();
        })
    };

    // Consume in a loop, like the polling harness, until the presser is done
    // and everything is drained.
    let mut totals = [0i64; 4];
    loop {
        match session.read_report(&cancel) {
            Ok(report) => {
                for (slot, count) in report.pressed() {
                    totals[slot] += i64::from(count);
                }
            }
            Err(AxError::WouldBlock) => {
                if !session.has_pending() {
                    break;
                }
            }
            Err(e) => panic!("unexpected read error: {e:?}"),
        }
    }
    presser.join().unwrap();

    // A final drain in case the last presses landed after the cancel.
    if session.has_pending() {
        let report = session.read_report(&CancelToken::new()).unwrap();
        for (slot, count) in report.pressed() {
            totals[slot] += i64::from(count);
        }
    }

    assert_eq!(totals, [i64::from(PRESSES / 2), 0, i64::from(PRESSES / 2), 0]);
}

#[test]
fn test_open_close_policy() {
    let (device, _controller) = setup();

    let session = device.open().expect("open failed");
    assert_eq!(device.open().err(), Some(AxError::ResourceBusy));

    session.close();
    session.close(); // idempotent

    let session = device.open().expect("reopen failed");
    drop(session); // drop closes
    assert!(device.open().is_ok());
}
