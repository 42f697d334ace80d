//! Tiempo real
//!
//! Puente de notificaciones de cambios (LISTEN/NOTIFY en modo en vivo) y
//! vistas de lista que se mantienen frescas a partir de él.

pub mod change_bridge;
pub mod list_view;

pub use change_bridge::{ChangeBridge, ChangeEvent, Subscription, CHANGE_CHANNEL};
pub use list_view::{FleetViews, ListView};
