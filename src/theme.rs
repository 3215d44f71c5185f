use eframe::egui::{self, Color32};

// Color Palette
pub const PRIMARY_BUTTON_BG: Color32 = Color32::from_rgb(76, 154, 255); // Vibrant blue for primary actions
pub const SECONDARY_BUTTON_BG: Color32 = Color32::from_rgb(235, 238, 243);

// Text Colors
pub const BUTTON_MAIN_TEXT: Color32 = Color32::from_rgb(255, 255, 255);
pub const BUTTON_SECONDARY_TEXT: Color32 = Color32::from_rgb(36, 36, 36);
pub const SECONDARY_TEXT: Color32 = Color32::from_rgb(138, 138, 143); // Medium gray for secondary text
pub const TEXT_ERROR: Color32 = Color32::from_rgb(200, 30, 30);

// Surfaces
pub const STATUS_BG: Color32 = Color32::from_rgb(248, 248, 248);
pub const BORDER_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 60, 67, 15); // Subtle border

// Sizing & Spacing
pub const ROUNDING_FRAME: f32 = 8.0;
pub const ROUNDING_BUTTON: f32 = 6.0;
pub const MIN_SIZE_BUTTON: egui::Vec2 = egui::Vec2::new(160.0, 40.0);

pub const TITLE_FONT_SIZE: f32 = 22.0;
pub const BUTTON_FONT_SIZE: f32 = 16.0;
