//! Board adapters for the microByte shell on ESP32-S3.

#![cfg_attr(not(test), no_std)]

pub mod input;
