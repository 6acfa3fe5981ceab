//! External delivery channels for threshold notifications.

pub mod email;
