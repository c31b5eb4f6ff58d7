/// Source of globally unique message ids.
///
/// Implementations must be safe to call concurrently and must never hand out
/// the same id twice during the life of the process.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}
