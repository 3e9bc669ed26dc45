#![no_std]

// Measurement logic for the two-strip speed trap.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware access is expressed through small driver
// traits that the firmware and emulator implement.

pub mod capture;
pub mod clock;
pub mod config;
pub mod control;
pub mod display;
pub mod engine;
pub mod indicator;
pub mod sim;
pub mod speed;
pub mod trigger;
