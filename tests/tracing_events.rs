//! Tests for the events emitted when a fallible operation fails.
//!
//! - `test_capacity_failure_emits_event`: A rejected inline payload is
//!   recorded at the `DEBUG` level, with its type name and layout
//! - `test_successful_operations_are_silent`: Construction, cloning and
//!   dispatch emit nothing

use std::{
    fmt, io,
    sync::{Arc, Mutex, PoisonError},
};

use polymorph::{Error, geometry::Circle, prelude::*, space::S2};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;

/// Collects everything the subscriber writes.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        let buffer = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_events(f: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(move || writer.clone())
        .without_time()
        .finish();

    let guard = subscriber.set_default();
    f();
    drop(guard);
    capture.contents()
}

#[derive(Clone)]
struct Label([u64; 4]);

impl Draw for Label {
    fn draw(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "label: {:?}", self.0)
    }
}

#[test]
fn test_capacity_failure_emits_event() {
    let output = capture_events(|| {
        let result: Result<InlineShape<S2>, Error> = InlineShape::try_new(Label([1, 2, 3, 4]));
        assert!(matches!(result, Err(Error::Capacity { .. })));
    });

    assert!(output.contains("DEBUG"), "{output}");
    assert!(
        output.contains("payload does not fit into inline storage"),
        "{output}"
    );
    assert!(output.contains("Label"), "{output}");
    assert!(output.contains("size=32"), "{output}");
}

#[test]
fn test_successful_operations_are_silent() {
    let output = capture_events(|| {
        let shape: InlineShape = InlineShape::try_new(Circle::new(1.0)).unwrap();
        let copy = shape.try_clone().unwrap();
        let mut out = String::new();
        copy.draw(&mut out).unwrap();
        assert_eq!(out, "circle: radius=1\n");
    });

    assert_eq!(output, "");
}
