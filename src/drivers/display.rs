//! Display Boundary
//!
//! Rendering lives behind this trait; the core only asks for redraws.

use crate::types::Screen;

/// LCD and status bar
pub trait Display {
    /// Redraw the whole screen now
    fn redraw(&mut self);

    /// Switch to `screen` on the next refresh
    fn show(&mut self, screen: Screen);

    /// Redraw the status bar
    fn draw_status(&mut self);

    /// Draw the battery indicator at `level` (0..=7)
    fn draw_battery(&mut self, level: u8, blink: bool);

    /// Pulse the controller reset line and reinitialise it
    fn hardware_reset(&mut self);
}

/// LCD backlight
pub trait Backlight {
    /// Light up (restarts the backlight timeout)
    fn turn_on(&mut self);

    /// Switch off
    fn turn_off(&mut self);
}
