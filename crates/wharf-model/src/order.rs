//! Stable ordering by an optional numeric `order` field.
//!
//! Items without an order (absent or `null`) sort as if their order were `0`.
//! Items with equal effective order keep their input positions.

use std::cmp::Ordering;

use serde_json::Value;

/// Anything that may carry a numeric `order` attribute.
pub trait Ordered {
    /// Raw order value, `None` when absent or null.
    fn order(&self) -> Option<f64>;

    /// Order used for sorting: the raw value, or `0` when absent.
    ///
    /// `-0.0` is folded into `0.0` so it ties with absent orders, and a
    /// negative NaN loses its sign so every NaN sorts after finite values.
    #[inline]
    fn effective_order(&self) -> f64 {
        let key = self.order().unwrap_or(0.0);
        if key.is_nan() { key.abs() } else { key + 0.0 }
    }
}

impl<T: Ordered + ?Sized> Ordered for &T {
    #[inline]
    fn order(&self) -> Option<f64> {
        (**self).order()
    }
}

impl<T: Ordered + ?Sized> Ordered for Box<T> {
    #[inline]
    fn order(&self) -> Option<f64> {
        (**self).order()
    }
}

/// JSON objects expose their `order` key.
///
/// A missing key, `null` or a non-numeric value count as absent.
/// Non-object values never carry an order.
impl Ordered for Value {
    fn order(&self) -> Option<f64> {
        self.as_object()?.get("order")?.as_f64()
    }
}

/// Returns a new vector with `items` sorted ascending by effective order.
///
/// The sort is stable and the input slice is left untouched.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use wharf_model::sorted_by_order;
///
/// let items = vec![json!({"order": 2}), json!({"order": null}), json!({"order": 1}), json!({})];
/// let sorted = sorted_by_order(&items);
/// assert_eq!(sorted, vec![json!({"order": null}), json!({}), json!({"order": 1}), json!({"order": 2})]);
/// ```
pub fn sorted_by_order<T>(items: &[T]) -> Vec<T>
where
    T: Ordered + Clone,
{
    let mut out = items.to_vec();
    out.sort_by(compare);
    out
}

/// Like [`sorted_by_order`], but borrows the items instead of cloning them.
pub fn sorted_refs_by_order<T: Ordered>(items: &[T]) -> Vec<&T> {
    let mut out: Vec<&T> = items.iter().collect();
    out.sort_by(compare);
    out
}

// total_cmp keeps the comparator a total order even when NaN shows up.
fn compare<T: Ordered>(a: &T, b: &T) -> Ordering {
    a.effective_order().total_cmp(&b.effective_order())
}
