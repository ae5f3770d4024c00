use sitk_process::{Command, EventKind, ProcessObject};

#[test]
fn test_stack_command_first() {
    let command = Command::new();
    let process = ProcessObject::new();
    process.add_command(EventKind::Any, &command);
    assert!(process.has_command(EventKind::Any));
}

#[test]
fn test_stack_process_first() {
    let process = ProcessObject::new();
    let command = Command::new();
    process.add_command(EventKind::Any, &command);
    assert!(process.has_command(EventKind::Any));
}

#[test]
fn test_command_dropped_first() {
    let process = ProcessObject::new();
    let command = Command::new();
    process.add_command(EventKind::Any, &command);
    assert!(process.has_command(EventKind::Any));

    drop(command);
    assert!(!process.has_command(EventKind::Any));
    assert!(process.registry().is_empty());
}

#[test]
fn test_process_dropped_first() {
    let process = ProcessObject::new();
    let command = Command::new();
    process.add_command(EventKind::Any, &command);
    assert_eq!(command.process_count(), 1);

    drop(process);
    assert_eq!(command.process_count(), 0);
    command.execute();
}

#[test]
fn test_single_command_many_processes_command_dropped() {
    let p1 = ProcessObject::new();
    let p2 = ProcessObject::new();
    let p3 = ProcessObject::new();

    let command = Command::new();
    p1.add_command(EventKind::Any, &command);
    p2.add_command(EventKind::Start, &command);
    p3.add_command(EventKind::End, &command);
    assert_eq!(command.process_count(), 3);

    drop(command);
    assert!(!p1.has_command(EventKind::Any));
    assert!(!p2.has_command(EventKind::Start));
    assert!(!p3.has_command(EventKind::End));
}

#[test]
fn test_single_command_many_processes_mostly_dropped_first() {
    let p1 = ProcessObject::new();
    let p2 = ProcessObject::new();
    let p3 = ProcessObject::new();

    let command = Command::new();
    p1.add_command(EventKind::Any, &command);
    p2.add_command(EventKind::Start, &command);
    p3.add_command(EventKind::End, &command);

    assert!(p1.has_command(EventKind::Any));
    assert!(p2.has_command(EventKind::Start));
    assert!(p3.has_command(EventKind::End));

    drop(p1);
    assert!(p2.has_command(EventKind::Start));
    assert!(p3.has_command(EventKind::End));
    assert_eq!(command.process_count(), 2);

    drop(p2);
    assert!(p3.has_command(EventKind::End));
    assert_eq!(command.process_count(), 1);

    drop(command);
    assert!(!p3.has_command(EventKind::End));
}

#[test]
fn test_many_commands_dropped_one_by_one() {
    let process = ProcessObject::new();
    let c1 = Command::new();
    let c2 = Command::new();
    let c3 = Command::new();
    process.add_command(EventKind::Any, &c1);
    process.add_command(EventKind::Start, &c2);
    process.add_command(EventKind::End, &c3);

    assert!(process.has_command(EventKind::Any));
    assert!(process.has_command(EventKind::Start));
    assert!(process.has_command(EventKind::End));

    // the wildcard registration answers for every kind until it goes away
    drop(c1);
    assert!(!process.has_command(EventKind::Any));
    assert!(process.has_command(EventKind::Start));
    assert!(process.has_command(EventKind::End));

    drop(c2);
    assert!(!process.has_command(EventKind::Any));
    assert!(!process.has_command(EventKind::Start));
    assert!(process.has_command(EventKind::End));

    drop(process);
    assert_eq!(c3.process_count(), 0);
}

#[test]
fn test_many_commands_process_dropped_first() {
    let process = ProcessObject::new();
    let c1 = Command::new();
    let c2 = Command::new();
    let c3 = Command::new();
    process.add_command(EventKind::Any, &c1);
    process.add_command(EventKind::Start, &c2);
    process.add_command(EventKind::End, &c3);

    drop(process);
    for command in [&c1, &c2, &c3] {
        assert_eq!(command.process_count(), 0);
    }
}

#[test]
fn test_both_destruction_orders_in_boxes() {
    // heap allocated owners released in both orders
    for command_first in [true, false] {
        let process = Box::new(ProcessObject::new());
        let command = Box::new(Command::new());
        process.add_command(EventKind::Progress, &command);
        {
            let _ctx = process.begin_execution().unwrap();
        }
        if command_first {
            drop(command);
            assert!(process.registry().is_empty());
            drop(process);
        } else {
            drop(process);
            assert_eq!(command.process_count(), 0);
            drop(command);
        }
    }
}

#[test]
fn test_command_add() {
    let process = ProcessObject::new();
    let command = Command::new();

    for event in EventKind::ALL {
        assert!(!process.has_command(event));
    }

    process.add_command(EventKind::Any, &command);
    for event in EventKind::ALL {
        assert!(process.has_command(event), "{event}");
    }

    process.remove_all_commands();
    for event in EventKind::ALL {
        assert!(!process.has_command(event));
    }

    process.add_command(EventKind::Start, &command);
    assert!(process.has_command(EventKind::Start));
    assert!(!process.has_command(EventKind::End));
    assert!(!process.has_command(EventKind::Any));

    for event in EventKind::ALL {
        process.add_command(event, &command);
    }
    for event in EventKind::ALL {
        assert!(process.has_command(event));
    }
}

#[test]
fn test_duplicate_registration() {
    let process = ProcessObject::new();
    let command = Command::new();
    process.add_command(EventKind::Start, &command);
    process.add_command(EventKind::Start, &command);
    assert_eq!(process.registry().len(), 2);

    {
        let ctx = process.begin_execution().unwrap();
        assert_eq!(ctx.observer_count(), 2);
    }

    drop(command);
    assert!(process.registry().is_empty());
}
