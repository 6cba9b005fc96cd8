use super::context::TickContext;

/// A pluggable simulation system that runs once per tick.
///
/// Object-safe so systems can be stored as `Box<dyn SimSystem>`. A system
/// mutates only the attributes it owns and reports domain failures as
/// events, so `tick` has no error channel.
pub trait SimSystem {
    fn name(&self) -> &str;
    fn tick(&mut self, ctx: &mut TickContext);
}
