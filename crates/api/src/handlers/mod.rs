pub mod annotations;
pub mod documents;
pub mod events;
pub mod hook;
