#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! Every executable operation owns a [`ProcessObject`]. Clients register
//! [`Command`]s on it for an [`EventKind`]; the two sides only know each other
//! through weak references and unlink themselves from the other when dropped,
//! so processes and commands may be created and destroyed in any order.
//!
//! Work is performed inside an [`ExecutionContext`] that exists only for the
//! duration of one execution. Registered commands are forwarded onto the
//! context when the execution begins and detached when it ends; progress and
//! abort requests resolve to the context while it exists.
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//! use sitk_process::{Command, EventKind, ProcessError, ProcessObject};
//!
//! let process = ProcessObject::new();
//! let seen = Rc::new(Cell::new(0.0f32));
//!
//! let sink = seen.clone();
//! let command = Command::from_fn(move || sink.set(sink.get() + 1.0));
//! process.add_command(EventKind::Progress, &command);
//!
//! let sum = process.execute(|ctx| {
//!     let mut sum = 0;
//!     for i in 0..4 {
//!         sum += i;
//!         ctx.update_progress((i + 1) as f32 / 4.0);
//!     }
//!     Ok::<_, ProcessError>(sum)
//! })?;
//!
//! assert_eq!(sum, 6);
//! assert_eq!(process.progress(), 1.0);
//! assert_eq!(seen.get(), 5.0);
//! # Ok::<(), ProcessError>(())
//! ```

/// Observer commands.
pub mod command;

/// The transient execution context.
pub mod context;

/// Error types for the process module.
pub mod error;

/// Event kinds.
pub mod event;

/// Process objects and the process capability.
pub mod process;

pub mod registry;

pub mod settings;

pub use crate::command::{Command, CommandId};
pub use crate::context::ExecutionContext;
pub use crate::error::ProcessError;
pub use crate::event::EventKind;
pub use crate::process::{ExecutionGuard, Process, ProcessObject};
pub use crate::registry::{EventCommand, EventObserverRegistry};
