//! # Events Module
//!
//! Progress reporting for the collect and crop pipelines.
//!
//! ## Design
//! The core library emits events through channels, so the CLI (or any
//! other front end) can render progress without the workers knowing about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Collect(CollectEvent::Progress(p)) = event {
//!             println!("Copied {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
