use crate::foundation::core::Rect;

/// Fraction of `element`'s area that lies inside `viewport`.
///
/// A zero-area element counts as fully visible when it touches the viewport, the
/// same way browser intersection observers treat empty boxes.
pub fn intersection_ratio(element: Rect, viewport: Rect) -> f64 {
    let element = element.abs();
    let viewport = viewport.abs();
    let area = element.area();
    if area <= 0.0 {
        let touches = element.x0 <= viewport.x1
            && element.x1 >= viewport.x0
            && element.y0 <= viewport.y1
            && element.y1 >= viewport.y0;
        return if touches { 1.0 } else { 0.0 };
    }
    let overlap = element.intersect(viewport);
    (overlap.area() / area).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/visibility/geometry.rs"]
mod tests;
