use fastbind_reflect::ReflectedValue;

/// Receives "this field changed" notifications from property destinations.
///
/// `field_id` is the dotted path that was written, such as
/// `stats.strength`, and `root` is the object the path started from.
pub trait FieldNotify {
    /// Called after a write that changed the stored value
    fn field_changed(&mut self, root: ReflectedValue<'_>, field_id: &str);
}

impl<F> FieldNotify for F
where
    F: FnMut(ReflectedValue<'_>, &str),
{
    fn field_changed(&mut self, root: ReflectedValue<'_>, field_id: &str) {
        self(root, field_id)
    }
}
