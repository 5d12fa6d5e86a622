pub mod app;
pub mod components;
pub mod dialogs;
pub mod tabs;
pub mod theme;
