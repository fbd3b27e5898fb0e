//! Messaging transports
//!
//! The terminal loop lives in `commands`; this module holds the WhatsApp
//! webhook server and the outbound sender.

pub mod whatsapp;

pub use whatsapp::{router, MessageSender, WebhookPayload, WebhookState, WhapiClient};
