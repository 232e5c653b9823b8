use anyhow::Result;

/// The data set operations the elimination controller and the k-optimization
/// driver rely on.
///
/// Implementations own the instances and attributes; the controller only
/// mutates them through `remove_attribute` and `reset_neighbor_cache`.
pub trait AttributeUniverse {
    /// Attributes still under consideration.
    fn attribute_count(&self) -> usize;

    fn instance_count(&self) -> usize;

    /// Names of the attributes still under consideration, in data set order.
    fn attribute_names(&self) -> Vec<String>;

    /// Drop an attribute from consideration. Fails for unknown or already removed names.
    fn remove_attribute(&mut self, name: &str) -> Result<()>;

    /// Forget any neighbor sets computed for a previous neighborhood size.
    fn reset_neighbor_cache(&mut self);

    /// Transition and transversion counts over the remaining annotated attributes.
    fn transition_transversion_counts(&self) -> (usize, usize);

    /// Largest neighborhood size a neighbor search can satisfy.
    fn max_neighborhood_size(&self) -> usize;
}
