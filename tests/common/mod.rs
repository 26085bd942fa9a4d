#![allow(dead_code)]

pub mod headless;
pub mod synthetic_frame;
