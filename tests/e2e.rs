use std::cell::RefCell;
use std::rc::Rc;

use pix2bez::{trace_bitmap, Bitmap, Color, FittingOptions, SplineDegree, TraceError, TraceHooks};

/// A white single-plane bitmap with a black axis-aligned rectangle.
fn black_rect(width: u32, height: u32, r0: u32, c0: u32, r1: u32, c1: u32) -> Bitmap {
    let mut data = vec![255u8; (width * height) as usize];
    for r in r0..=r1 {
        for c in c0..=c1 {
            data[(r * width + c) as usize] = 0;
        }
    }
    Bitmap::new(width, height, 1, data).unwrap()
}

fn white_background() -> FittingOptions {
    FittingOptions { background: Some(Color::WHITE), ..Default::default() }
}

#[test]
fn a_filled_square_traces_to_four_joined_lines() {
    let _ = env_logger::builder().is_test(true).try_init();
    let bitmap = black_rect(12, 12, 1, 1, 10, 10);
    let result =
        trace_bitmap(&bitmap, &white_background(), &mut TraceHooks::default()).unwrap();

    assert_eq!(result.lists.len(), 1);
    let list = &result.lists[0];
    assert!(!list.open);
    assert!(!list.clockwise);
    assert_eq!(list.len(), 4);
    assert!(list.splines.iter().all(|s| s.degree == SplineDegree::Linear));
    for (i, s) in list.splines.iter().enumerate() {
        let next = &list.splines[(i + 1) % list.len()];
        assert_eq!(s.end(), next.start(), "segments {i} and next are not joined");
    }
    for s in &list.splines {
        for p in s.points {
            assert!((0.0..=12.0).contains(&p.x) && (0.0..=12.0).contains(&p.y));
        }
    }
}

#[test]
fn a_ring_produces_an_outer_contour_and_a_hole() {
    let _ = env_logger::builder().is_test(true).try_init();
    // Black 10x10 square with a white 4x4 hole.
    let mut data = vec![255u8; 12 * 12];
    for r in 1..=10u32 {
        for c in 1..=10u32 {
            data[(r * 12 + c) as usize] = 0;
        }
    }
    for r in 4..=7u32 {
        for c in 4..=7u32 {
            data[(r * 12 + c) as usize] = 255;
        }
    }
    let bitmap = Bitmap::new(12, 12, 1, data).unwrap();
    let result =
        trace_bitmap(&bitmap, &white_background(), &mut TraceHooks::default()).unwrap();

    assert_eq!(result.lists.len(), 2);
    let windings: Vec<bool> = result.lists.iter().map(|l| l.clockwise).collect();
    assert!(windings.contains(&false), "missing the outer contour");
    assert!(windings.contains(&true), "missing the hole contour");
}

#[test]
fn an_all_background_bitmap_traces_to_nothing() {
    let bitmap = Bitmap::new(8, 8, 1, vec![255u8; 64]).unwrap();
    let result =
        trace_bitmap(&bitmap, &white_background(), &mut TraceHooks::default()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn cancellation_aborts_the_trace() {
    let bitmap = black_rect(12, 12, 1, 1, 10, 10);
    let mut hooks = TraceHooks::default();
    hooks.cancel = Some(Box::new(|| true));
    let result = trace_bitmap(&bitmap, &white_background(), &mut hooks);
    assert!(matches!(result, Err(TraceError::Cancelled)));
}

#[test]
fn progress_is_monotone_and_completes() {
    let bitmap = black_rect(12, 12, 1, 1, 10, 10);
    let seen: Rc<RefCell<Vec<f32>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let mut hooks = TraceHooks::default();
    hooks.progress = Some(Box::new(move |f| sink.borrow_mut().push(f)));

    trace_bitmap(&bitmap, &white_background(), &mut hooks).unwrap();
    let seen = seen.borrow();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backward: {seen:?}");
    assert!(seen.iter().all(|f| (0.0..=1.0).contains(f)));
    assert_eq!(*seen.last().unwrap(), 1.0);
}

#[test]
fn centerline_mode_traces_a_stroke_as_one_open_path() {
    let _ = env_logger::builder().is_test(true).try_init();
    let bitmap = black_rect(9, 5, 2, 1, 2, 7);
    let opts = FittingOptions {
        centerline: true,
        background: Some(Color::WHITE),
        ..Default::default()
    };
    let result = trace_bitmap(&bitmap, &opts, &mut TraceHooks::default()).unwrap();

    assert!(result.centerline);
    assert_eq!(result.lists.len(), 1);
    let list = &result.lists[0];
    assert!(list.open);
    assert!(list.splines.iter().all(|s| s.degree == SplineDegree::Linear));
    // The skeleton of a horizontal stroke stays on one row.
    let y = list.splines[0].start().y;
    for s in &list.splines {
        assert_eq!(s.start().y, y);
        assert_eq!(s.end().y, y);
    }
}

#[test]
fn isolated_pixels_trace_to_nothing_without_warnings() {
    // Two isolated pixels: single-point outlines are discarded during
    // tracing, so this stays warning-free and empty.
    let mut data = vec![255u8; 64];
    data[2 * 8 + 2] = 0;
    data[5 * 8 + 5] = 0;
    let bitmap = Bitmap::new(8, 8, 1, data).unwrap();

    let warnings: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&warnings);
    let mut hooks = TraceHooks::default();
    hooks.warning = Some(Box::new(move |m| sink.borrow_mut().push(m.to_string())));

    let result = trace_bitmap(&bitmap, &white_background(), &mut hooks).unwrap();
    assert!(result.is_empty());
    assert!(warnings.borrow().is_empty());
}
