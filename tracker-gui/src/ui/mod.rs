//! # UI Module
//!
//! This module contains all UI components for the pitch tracker.

pub mod confidence_bar;
pub mod main_display;
pub mod pitch_chart;
