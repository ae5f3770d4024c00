use std::rc::Rc;

use argh::FromArgs;
use sitk::process::{settings, Command, EventKind, Process};
use sitk::transform::Euler3DTransform;
use sitk::TransformPointsFilter;

/// Maps random points through a rotation while observing the filter
#[derive(Debug, FromArgs)]
struct Args {
    /// number of points to map
    #[argh(option, short = 'n', default = "20")]
    num_points: usize,

    /// abort once the progress reaches this fraction
    #[argh(option, short = 'a')]
    abort_at: Option<f32>,

    /// rotation about z in degrees
    #[argh(option, short = 'z', default = "90.0")]
    angle_z: f64,

    /// enable debug output of the filter
    #[argh(switch, short = 'd')]
    debug: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.debug {
        settings::global_default_debug_on();
    }

    let mut rotation = Euler3DTransform::with_center(&[0.0, 0.0, 0.0])?;
    rotation.set_rotation(0.0, 0.0, args.angle_z.to_radians());
    let filter = Rc::new(TransformPointsFilter::new(rotation.into()));

    let observed = Rc::downgrade(&filter);
    let abort_at = args.abort_at;
    let on_progress = Command::from_fn(move || {
        let Some(filter) = observed.upgrade() else {
            return;
        };
        let progress = filter.progress();
        println!("progress: {:>5.1}%", progress * 100.0);
        if abort_at.is_some_and(|limit| progress >= limit) {
            filter.abort();
        }
    });
    on_progress.set_name("progress printer");

    let on_abort = Command::from_fn(|| println!("aborted"));
    let on_end = Command::from_fn(|| println!("done"));

    filter.add_command(EventKind::Progress, &on_progress);
    filter.add_command(EventKind::Abort, &on_abort);
    filter.add_command(EventKind::End, &on_end);

    let points: Vec<[f64; 3]> = (0..args.num_points)
        .map(|i| [i as f64, 1.0, 0.5 * i as f64])
        .collect();
    let mapped = filter.execute(&points)?;

    println!("{filter}");
    for (p, q) in points.iter().zip(&mapped) {
        println!("{p:?} -> {q:?}");
    }
    println!("mapped {} of {} points", mapped.len(), points.len());

    Ok(())
}
