//! Authoring-side data model: polymorphic questions, the ordered question
//! collection, draft lifecycle, validation and the wire DTOs handed to the
//! persistence collaborator.

pub mod collection;
pub mod draft;
pub mod error;
pub mod question;
pub mod validate;
pub mod wire;
