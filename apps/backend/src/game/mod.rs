//! Real-time game session management: the per-group coordinator task, the
//! group-to-session registry, and the collaborator seams.

pub mod collaborators;
pub mod coordinator;
pub mod events;
pub mod registry;

#[cfg(test)]
mod tests_registry;
