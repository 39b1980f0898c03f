//! Domain entities for qrtag.
//!
//! This module contains pure logic with no device dependencies: the camera
//! [`frame::Frame`] and the rules deciding which decoded QR payloads are
//! acceptable URIs ([`pattern`]).
//!
//! # Why keep these out of the station crate? (for beginners)
//!
//! The station binary talks to a camera, a preview window and a PC/SC
//! reader.  None of that can run in CI.  Everything that *can* be reasoned
//! about without hardware lives here, so it compiles and tests on any
//! machine.  The infrastructure layer converts device data into these types
//! at the edge.

pub mod frame;
pub mod pattern;
