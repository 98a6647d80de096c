//! Input dispatch, focus scopes and mode-command plumbing for the microByte menu shell.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod catalog;
pub mod dispatch;
pub mod focus;
pub mod input;
pub mod settings;
pub mod toolkit;
