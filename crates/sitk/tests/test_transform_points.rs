use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use approx::assert_relative_eq;
use sitk::process::{Command, EventKind, Process, ProcessError};
use sitk::transform::{Euler3DTransform, Transform, TransformError, TransformKind};
use sitk::{FilterError, TransformPointsFilter};

fn grid_points(n: usize) -> Vec<[f64; 2]> {
    (0..n).map(|i| [i as f64, -(i as f64)]).collect()
}

fn counter(count: &Rc<Cell<usize>>) -> Command {
    let count = count.clone();
    Command::from_fn(move || count.set(count.get() + 1))
}

#[test]
fn test_maps_points_in_order() -> Result<(), FilterError> {
    let mut tx = Transform::new(2, TransformKind::Scale)?;
    tx.set_parameters(&[2.0, 3.0])?;
    let filter = TransformPointsFilter::new(tx);

    let out = filter.execute(&grid_points(3))?;
    assert_eq!(
        out,
        vec![vec![0.0, -0.0], vec![2.0, -3.0], vec![4.0, -6.0]]
    );
    assert_eq!(filter.progress(), 1.0);
    Ok(())
}

#[test]
fn test_reports_events() -> Result<(), FilterError> {
    let filter = TransformPointsFilter::new(Transform::new(2, TransformKind::Identity)?);
    let iterations = Rc::new(Cell::new(0));
    let progress = Rc::new(Cell::new(0));
    let ends = Rc::new(Cell::new(0));
    let on_iteration = counter(&iterations);
    let on_progress = counter(&progress);
    let on_end = counter(&ends);
    filter.add_command(EventKind::Iteration, &on_iteration);
    filter.add_command(EventKind::Progress, &on_progress);
    filter.add_command(EventKind::End, &on_end);

    filter.execute(&grid_points(10))?;
    assert_eq!(iterations.get(), 10);
    // one per point plus the final report
    assert_eq!(progress.get(), 11);
    assert_eq!(ends.get(), 1);

    filter.execute(&grid_points(4))?;
    assert_eq!(iterations.get(), 14);
    assert_eq!(ends.get(), 2);
    Ok(())
}

#[test]
fn test_progress_seen_by_observer() -> Result<(), FilterError> {
    let filter = Rc::new(TransformPointsFilter::new(Transform::new(
        2,
        TransformKind::Identity,
    )?));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let weak: Weak<TransformPointsFilter> = Rc::downgrade(&filter);
    let sink = seen.clone();
    let command = Command::from_fn(move || {
        if let Some(filter) = weak.upgrade() {
            sink.borrow_mut().push(filter.progress());
        }
    });
    filter.add_command(EventKind::Iteration, &command);

    filter.execute(&grid_points(4))?;
    let seen = seen.borrow();
    assert_eq!(seen.len(), 4);
    // iteration fires before the progress update of the same point
    for (i, p) in seen.iter().enumerate() {
        assert_relative_eq!(*p, i as f32 / 4.0);
    }
    Ok(())
}

#[test]
fn test_abort_truncates_output() -> Result<(), FilterError> {
    let filter = Rc::new(TransformPointsFilter::new(Transform::new(
        2,
        TransformKind::Identity,
    )?));
    let aborted = Rc::new(Cell::new(0));
    let ended = Rc::new(Cell::new(0));

    let weak = Rc::downgrade(&filter);
    let stop_at_half = Command::from_fn(move || {
        if let Some(filter) = weak.upgrade() {
            if filter.progress() >= 0.5 {
                filter.abort();
            }
        }
    });
    let on_abort = counter(&aborted);
    let on_end = counter(&ended);
    filter.add_command(EventKind::Progress, &stop_at_half);
    filter.add_command(EventKind::Abort, &on_abort);
    filter.add_command(EventKind::End, &on_end);

    let out = filter.execute(&grid_points(10))?;
    assert_eq!(out.len(), 5);
    assert_eq!(out[4], vec![4.0, -4.0]);
    assert_eq!(filter.progress(), 1.0);
    assert_eq!(aborted.get(), 1);
    assert_eq!(ended.get(), 0);
    Ok(())
}

#[test]
fn test_wrong_dimension_ends_execution() -> Result<(), FilterError> {
    let filter = TransformPointsFilter::new(Euler3DTransform::new().into());
    let ends = Rc::new(Cell::new(0));
    let deletes = Rc::new(Cell::new(0));
    let on_end = counter(&ends);
    let on_delete = counter(&deletes);
    filter.add_command(EventKind::End, &on_end);
    filter.add_command(EventKind::Delete, &on_delete);

    let result = filter.execute(&[vec![1.0, 2.0, 3.0], vec![1.0, 2.0]]);
    assert_eq!(
        result,
        Err(FilterError::Transform(TransformError::DimensionMismatch {
            expected: 3,
            actual: 2
        }))
    );
    assert_eq!(ends.get(), 0);
    assert_eq!(deletes.get(), 1);
    assert!(!filter.process_object().is_executing());
    assert!(filter.has_command(EventKind::End));
    Ok(())
}

#[test]
fn test_reentrant_execute_is_rejected() -> Result<(), FilterError> {
    let filter = Rc::new(TransformPointsFilter::new(Transform::new(
        2,
        TransformKind::Identity,
    )?));
    let inner = Rc::new(RefCell::new(None));

    let weak = Rc::downgrade(&filter);
    let sink = inner.clone();
    let command = Command::from_fn(move || {
        if let Some(filter) = weak.upgrade() {
            *sink.borrow_mut() = Some(filter.execute(&grid_points(1)));
        }
    });
    filter.add_command(EventKind::Start, &command);

    filter.execute(&grid_points(2))?;
    assert!(matches!(
        inner.borrow_mut().take(),
        Some(Err(FilterError::Process(ProcessError::LifecycleViolation(_))))
    ));
    Ok(())
}

#[test]
fn test_command_outlives_filter() -> Result<(), FilterError> {
    let command = Command::new();
    {
        let filter = TransformPointsFilter::new(Transform::new(3, TransformKind::Identity)?);
        filter.add_command(EventKind::Any, &command);
        assert_eq!(command.process_count(), 1);
    }
    assert_eq!(command.process_count(), 0);
    command.execute();
    Ok(())
}

#[test]
fn test_detach_through_the_filter() -> Result<(), FilterError> {
    let filter = TransformPointsFilter::new(Transform::new(2, TransformKind::Identity)?);
    let count = Rc::new(Cell::new(0));
    let command = counter(&count);
    filter.add_command(EventKind::Iteration, &command);
    filter.detach_all(&command);
    assert!(!filter.has_command(EventKind::Iteration));
    assert_eq!(command.process_count(), 0);

    filter.execute(&grid_points(3))?;
    assert_eq!(count.get(), 0);
    Ok(())
}

#[test]
fn test_begin_execution_through_the_filter() -> Result<(), FilterError> {
    let filter = TransformPointsFilter::new(Transform::new(2, TransformKind::Identity)?);
    {
        let ctx = filter.begin_execution()?;
        ctx.update_progress(0.25);
        assert_eq!(filter.progress(), 0.25);
        assert!(matches!(
            filter.execute(&grid_points(1)),
            Err(FilterError::Process(ProcessError::LifecycleViolation(_)))
        ));
    }
    assert_eq!(filter.progress(), 0.25);
    Ok(())
}
