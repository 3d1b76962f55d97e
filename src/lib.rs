// SPDX-License-Identifier: MPL-2.0
//! `toast_cue` is a notification delivery engine for desktop-style toasts.
//!
//! It keeps a bounded, severity-ordered set of active notifications,
//! expires them on per-notification timers, plays short synthesized audio
//! cues matched to each notification's variant, and reports every change
//! to subscribed listeners. Rendering is out of scope; the crate supplies
//! the ordered snapshot a UI draws from.

#![doc(html_root_url = "https://docs.rs/toast_cue/0.3.0")]

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod notification;
pub mod queue;
pub mod timer;

#[cfg(test)]
mod test_utils;
